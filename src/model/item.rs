use serde::{Deserialize, Serialize};

use super::id::{FrequencyUnit, ItemId};

/// One node of the budget classification tree.
///
/// Nodes live in the tree's arena and reference each other by [`ItemId`]
/// only; there are no direct object back-pointers. `code` and `order` are
/// derived fields, rewritten by the code generator after every structural
/// change; they are never hand-edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetItem {
    pub id: ItemId,
    /// Parent node, `None` for a root.
    #[serde(default)]
    pub parent: Option<ItemId>,
    /// Ordered child ids.
    #[serde(default)]
    pub children: Vec<ItemId>,
    /// Depth in the hierarchy, root = 1.
    pub level: u32,
    /// Hierarchical code: `A`, `B`, … at level 1, `A.1`, `A.1.2`, … below.
    pub code: String,
    /// 1-based position among siblings.
    pub order: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// How many times the unit amount recurs (leaves only).
    #[serde(default)]
    pub target_frequency: Option<u32>,
    #[serde(default)]
    pub frequency_unit: Option<FrequencyUnit>,
    /// Amount per occurrence (leaves only).
    #[serde(default)]
    pub unit_amount: Option<f64>,
    /// Rolled-up or manually entered total for the period.
    #[serde(default)]
    pub total_target: Option<f64>,
    /// Soft-delete flag on a persisted node, resolved at next save.
    #[serde(default)]
    pub deletion_marked: bool,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl BudgetItem {
    /// Create a blank node at the given level. Code and order are
    /// placeholders until the next regeneration walk.
    pub fn new(id: ItemId, parent: Option<ItemId>, level: u32, name: String) -> Self {
        BudgetItem {
            id,
            parent,
            children: Vec::new(),
            level,
            code: String::new(),
            order: 0,
            name,
            description: String::new(),
            target_frequency: None,
            frequency_unit: None,
            unit_amount: None,
            total_target: None,
            deletion_marked: false,
            active: true,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether both inputs of the unit formula are present.
    pub fn has_unit_formula(&self) -> bool {
        self.target_frequency.is_some() && self.unit_amount.is_some()
    }
}
