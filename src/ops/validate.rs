use serde::Serialize;

use crate::model::{BudgetTree, ItemId};

/// Structured result of pre-save validation, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
}

/// Something that must be fixed before a save can run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ValidationIssue {
    /// A node that will be saved has an empty name.
    #[serde(rename = "empty_name")]
    EmptyName { code: String },
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationIssue::EmptyName { code } => {
                write!(f, "item {} has an empty name", code)
            }
        }
    }
}

/// Check the whole tree ahead of a save. Deletion-marked subtrees are never
/// written, so they are exempt.
pub fn validate(tree: &BudgetTree) -> ValidationResult {
    let mut result = ValidationResult::default();
    for root in &tree.roots {
        check_node(tree, *root, &mut result);
    }
    result.valid = result.issues.is_empty();
    result
}

fn check_node(tree: &BudgetTree, id: ItemId, result: &mut ValidationResult) {
    let node = &tree.nodes[&id];
    if node.deletion_marked {
        return;
    }
    if node.name.trim().is_empty() {
        result.issues.push(ValidationIssue::EmptyName {
            code: node.code.clone(),
        });
    }
    for child in &node.children {
        check_node(tree, *child, result);
    }
}
