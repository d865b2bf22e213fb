pub mod codes;
pub mod mutate;
pub mod rollup;
pub mod validate;

use crate::model::BudgetTree;

/// Rewrite all derived state (codes, orders, totals) from the tree's actual
/// structure. Run after building a tree from stored records.
pub fn normalize(tree: &mut BudgetTree) {
    codes::regenerate(tree);
    rollup::recompute_totals(tree);
}
