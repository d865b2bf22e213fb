use serde::Serialize;

use crate::model::{BudgetTree, ItemId};
use crate::sync::SaveReport;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ItemJson {
    pub code: String,
    pub name: String,
    pub level: u32,
    pub order: u32,
    /// True once the item has a store id.
    pub saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_frequency: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_target: Option<f64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub pending_delete: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ItemJson>,
}

#[derive(Serialize)]
pub struct TreeJson {
    pub items: Vec<ItemJson>,
}

#[derive(Serialize)]
pub struct SaveReportJson {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub missing_deletes: usize,
    pub warnings: Vec<String>,
}

pub fn tree_json(tree: &BudgetTree) -> TreeJson {
    TreeJson {
        items: tree.roots.iter().map(|r| item_json(tree, *r)).collect(),
    }
}

pub fn item_json(tree: &BudgetTree, id: ItemId) -> ItemJson {
    let node = &tree.nodes[&id];
    ItemJson {
        code: node.code.clone(),
        name: node.name.clone(),
        level: node.level,
        order: node.order,
        saved: !id.is_temp(),
        id: id.persisted(),
        description: node.description.clone(),
        target_frequency: node.target_frequency,
        frequency_unit: node.frequency_unit.map(|u| u.as_str().to_string()),
        unit_amount: node.unit_amount,
        total_target: node.total_target,
        pending_delete: node.deletion_marked,
        children: node
            .children
            .iter()
            .map(|c| item_json(tree, *c))
            .collect(),
    }
}

pub fn save_report_json(report: &SaveReport) -> SaveReportJson {
    SaveReportJson {
        created: report.created,
        updated: report.updated,
        deleted: report.deleted,
        missing_deletes: report.missing_deletes,
        warnings: report.warnings.iter().map(|w| w.to_string()).collect(),
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

/// One line per item, indented by level. Unsaved items get a `*` after the
/// code, pending deletions a trailing marker.
pub fn render_tree(tree: &BudgetTree) -> String {
    let mut out = String::new();
    for root in &tree.roots {
        render_item_line(tree, *root, &mut out);
    }
    out
}

fn render_item_line(tree: &BudgetTree, id: ItemId, out: &mut String) {
    let node = &tree.nodes[&id];
    let indent = "  ".repeat((node.level.max(1) - 1) as usize);
    out.push_str(&indent);
    out.push_str(&node.code);
    if id.is_temp() {
        out.push('*');
    }
    out.push_str("  ");
    out.push_str(&node.name);
    if let Some(total) = node.total_target {
        out.push_str("  [");
        out.push_str(&format_amount(total));
        out.push(']');
    }
    if node.deletion_marked {
        out.push_str("  (pending delete)");
    }
    out.push('\n');
    for child in &node.children {
        render_item_line(tree, *child, out);
    }
}

/// Multi-line detail view for one item.
pub fn render_item_detail(tree: &BudgetTree, id: ItemId) -> String {
    let node = &tree.nodes[&id];
    let mut out = String::new();
    out.push_str(&format!("{}  {}\n", node.code, node.name));
    out.push_str(&format!("  id: {}\n", id));
    out.push_str(&format!("  level: {}  order: {}\n", node.level, node.order));
    if !node.description.is_empty() {
        out.push_str(&format!("  description: {}\n", node.description));
    }
    if let Some(freq) = node.target_frequency {
        let unit = node
            .frequency_unit
            .map(|u| u.as_str())
            .unwrap_or("unspecified");
        out.push_str(&format!("  frequency: {} ({})\n", freq, unit));
    }
    if let Some(amount) = node.unit_amount {
        out.push_str(&format!("  unit amount: {}\n", format_amount(amount)));
    }
    if let Some(total) = node.total_target {
        out.push_str(&format!("  total: {}\n", format_amount(total)));
    }
    if node.deletion_marked {
        out.push_str("  pending delete: yes\n");
    }
    if !node.children.is_empty() {
        out.push_str(&format!("  children: {}\n", node.children.len()));
    }
    out
}

/// The aggregate one-liner printed after a save.
pub fn render_save_summary(report: &SaveReport) -> String {
    format!(
        "saved: {} created, {} updated, {} deleted{}",
        report.created,
        report.updated,
        report.deleted + report.missing_deletes,
        if report.warnings.is_empty() {
            String::new()
        } else {
            format!(" ({} warning(s), see stderr)", report.warnings.len())
        }
    )
}

/// Thousands-separated amount; two decimals only when needed. Rounds to
/// cents first so a fraction that rounds up carries into the whole part.
pub fn format_amount(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let negative = value < 0.0 && cents > 0;
    let whole = cents / 100;
    let rem = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if rem > 0 {
        out.push_str(&format!(".{:02}", rem));
    }
    out
}
