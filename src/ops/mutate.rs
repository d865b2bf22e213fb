use crate::model::{BudgetItem, BudgetTree, FrequencyUnit, ItemId};
use crate::ops::{codes, rollup};

/// Error type for tree mutation operations
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("budget item not found: {0}")]
    NotFound(String),
    #[error("cannot delete the last remaining top-level item")]
    LastRoot,
    #[error("cannot defer deletion of an unsaved item: {0}")]
    MarkTemp(String),
}

// ---------------------------------------------------------------------------
// Structural inserts
// ---------------------------------------------------------------------------

/// Append a new unsaved leaf under `parent`. Returns the new temp id.
pub fn add_child(tree: &mut BudgetTree, parent: ItemId, name: String) -> Result<ItemId, TreeError> {
    let level = tree
        .get(parent)
        .ok_or_else(|| TreeError::NotFound(parent.to_string()))?
        .level
        + 1;
    let id = tree.alloc_temp();
    tree.nodes.insert(id, BudgetItem::new(id, Some(parent), level, name));
    tree.nodes[&parent].children.push(id);
    refresh(tree);
    Ok(id)
}

/// Append a new unsaved level-1 item after the existing roots.
pub fn add_root(tree: &mut BudgetTree, name: String) -> ItemId {
    let id = tree.alloc_temp();
    tree.nodes.insert(id, BudgetItem::new(id, None, 1, name));
    tree.roots.push(id);
    refresh(tree);
    id
}

/// Insert a new unsaved node immediately after `after` among its siblings
/// (same parent, same level). Returns the new temp id.
pub fn add_sibling(tree: &mut BudgetTree, after: ItemId, name: String) -> Result<ItemId, TreeError> {
    let (parent, level) = {
        let node = tree
            .get(after)
            .ok_or_else(|| TreeError::NotFound(after.to_string()))?;
        (node.parent, node.level)
    };
    let id = tree.alloc_temp();
    tree.nodes.insert(id, BudgetItem::new(id, parent, level, name));

    let list = match parent {
        Some(p) => &mut tree.nodes[&p].children,
        None => &mut tree.roots,
    };
    let pos = list.iter().position(|c| *c == after).unwrap_or(list.len());
    list.insert(pos + 1, id);
    refresh(tree);
    Ok(id)
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

/// Remove a node and its whole subtree from the tree immediately.
///
/// Rejects removing the last remaining root. Returns the persisted ids that
/// were inside the removed subtree so the caller can issue remote deletes
/// ("delete now"); an all-temp subtree yields an empty list.
pub fn remove_subtree(tree: &mut BudgetTree, id: ItemId) -> Result<Vec<i64>, TreeError> {
    let node = tree
        .get(id)
        .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
    if node.parent.is_none() && tree.roots.len() == 1 {
        return Err(TreeError::LastRoot);
    }

    let doomed = tree.subtree_ids(id);
    let persisted: Vec<i64> = doomed.iter().filter_map(|d| d.persisted()).collect();
    tree.detach(id);
    for d in doomed {
        tree.nodes.shift_remove(&d);
    }
    refresh(tree);
    Ok(persisted)
}

/// Mark a persisted node and all its descendants for deletion at next save
/// ("delete later"). The subtree stays in the tree, visible but doomed.
///
/// At least one unmarked root must remain, so the save can never empty the
/// tree.
pub fn mark_deleted(tree: &mut BudgetTree, id: ItemId) -> Result<(), TreeError> {
    let node = tree
        .get(id)
        .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
    if node.parent.is_none()
        && !tree
            .roots
            .iter()
            .any(|r| *r != id && !tree.nodes[r].deletion_marked)
    {
        return Err(TreeError::LastRoot);
    }
    if id.is_temp() {
        // Temp nodes have nothing persisted to defer; remove them instead.
        return Err(TreeError::MarkTemp(id.to_string()));
    }
    for d in tree.subtree_ids(id) {
        tree.nodes[&d].deletion_marked = true;
    }
    Ok(())
}

/// Undo a deferred deletion: clears the mark on the node, every descendant,
/// and the ancestor chain. A restored node needs its parents to survive the
/// save, so restoring inside a marked subtree un-dooms the path above it
/// (marked siblings stay marked).
pub fn cancel_deletion(tree: &mut BudgetTree, id: ItemId) -> Result<(), TreeError> {
    if tree.get(id).is_none() {
        return Err(TreeError::NotFound(id.to_string()));
    }
    for d in tree.subtree_ids(id) {
        tree.nodes[&d].deletion_marked = false;
    }
    let mut cur = tree.nodes[&id].parent;
    while let Some(p) = cur {
        let node = &mut tree.nodes[&p];
        node.deletion_marked = false;
        cur = node.parent;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Field edits
// ---------------------------------------------------------------------------

pub fn set_name(tree: &mut BudgetTree, id: ItemId, name: String) -> Result<(), TreeError> {
    node_mut(tree, id)?.name = name;
    rollup::recompute_totals(tree);
    Ok(())
}

pub fn set_description(tree: &mut BudgetTree, id: ItemId, desc: String) -> Result<(), TreeError> {
    node_mut(tree, id)?.description = desc;
    rollup::recompute_totals(tree);
    Ok(())
}

/// Set how often the unit amount recurs. Both pieces travel together.
pub fn set_frequency(
    tree: &mut BudgetTree,
    id: ItemId,
    frequency: Option<u32>,
    unit: Option<FrequencyUnit>,
) -> Result<(), TreeError> {
    let node = node_mut(tree, id)?;
    node.target_frequency = frequency;
    node.frequency_unit = unit;
    rollup::recompute_totals(tree);
    Ok(())
}

pub fn set_unit_amount(tree: &mut BudgetTree, id: ItemId, amount: Option<f64>) -> Result<(), TreeError> {
    node_mut(tree, id)?.unit_amount = amount;
    rollup::recompute_totals(tree);
    Ok(())
}

/// Set a manual total on a leaf. Overwritten by the unit formula when both
/// frequency and unit amount are present, and by the child sum on parents.
pub fn set_total_target(tree: &mut BudgetTree, id: ItemId, total: Option<f64>) -> Result<(), TreeError> {
    node_mut(tree, id)?.total_target = total;
    rollup::recompute_totals(tree);
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn node_mut(tree: &mut BudgetTree, id: ItemId) -> Result<&mut BudgetItem, TreeError> {
    tree.get_mut(id)
        .ok_or_else(|| TreeError::NotFound(id.to_string()))
}

/// Codes, orders and totals all derive from structure; rewrite them after
/// every structural change.
fn refresh(tree: &mut BudgetTree) {
    codes::regenerate(tree);
    rollup::recompute_totals(tree);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn children_get_sequential_codes() {
        // Scenario: root A gains children A.1, A.2, then A.3.
        let mut tree = BudgetTree::new();
        let root = add_root(&mut tree, "Income".into());
        let c1 = add_child(&mut tree, root, "Offerings".into()).unwrap();
        let c2 = add_child(&mut tree, root, "Pledges".into()).unwrap();
        assert_eq!(tree.nodes[&c1].code, "A.1");
        assert_eq!(tree.nodes[&c2].code, "A.2");

        let c3 = add_child(&mut tree, root, "Grants".into()).unwrap();
        assert_eq!(tree.nodes[&c3].code, "A.3");
        assert_eq!(tree.nodes[&c3].level, 2);
        assert_eq!(tree.nodes[&c3].order, 3);
    }

    #[test]
    fn sibling_inserts_directly_after() {
        let mut tree = BudgetTree::new();
        let root = add_root(&mut tree, "Income".into());
        let first = add_child(&mut tree, root, "first".into()).unwrap();
        let _last = add_child(&mut tree, root, "last".into()).unwrap();

        let mid = add_sibling(&mut tree, first, "mid".into()).unwrap();
        assert_eq!(tree.nodes[&mid].code, "A.2");
        assert_eq!(tree.nodes[&root].children[1], mid);

        // Sibling of a root is a new root.
        let b = add_sibling(&mut tree, root, "Expenses".into()).unwrap();
        assert_eq!(tree.nodes[&b].code, "B");
        assert_eq!(tree.nodes[&b].level, 1);
    }

    #[test]
    fn removing_a_root_recodes_the_rest() {
        // Scenario: roots [A, B]; delete temp A; B becomes A.
        let mut tree = BudgetTree::new();
        let a = add_root(&mut tree, "Alpha".into());
        let b = add_root(&mut tree, "Beta".into());
        assert_eq!(tree.nodes[&b].code, "B");

        let persisted = remove_subtree(&mut tree, a).unwrap();
        assert!(persisted.is_empty());
        assert_eq!(tree.roots, vec![b]);
        assert_eq!(tree.nodes[&b].code, "A");
        assert_eq!(tree.nodes[&b].order, 1);
    }

    #[test]
    fn last_root_cannot_be_removed_or_marked() {
        let mut tree = BudgetTree::new();
        let only = add_root(&mut tree, "Everything".into());
        assert!(matches!(remove_subtree(&mut tree, only), Err(TreeError::LastRoot)));
        assert!(matches!(mark_deleted(&mut tree, only), Err(TreeError::LastRoot)));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn remove_returns_persisted_ids_of_subtree() {
        let mut tree = BudgetTree::new();
        let keep = add_root(&mut tree, "Keep".into());
        let root = ItemId::Persisted(10);
        tree.nodes.insert(root, BudgetItem::new(root, None, 1, "Doomed".into()));
        tree.roots.push(root);
        let child = ItemId::Persisted(11);
        tree.nodes.insert(child, BudgetItem::new(child, Some(root), 2, "c".into()));
        tree.nodes[&root].children.push(child);
        let temp_child = add_child(&mut tree, root, "t".into()).unwrap();
        assert!(temp_child.is_temp());

        let mut ids = remove_subtree(&mut tree, root).unwrap();
        ids.sort();
        assert_eq!(ids, vec![10, 11]);
        assert_eq!(tree.roots, vec![keep]);
        assert!(tree.get(temp_child).is_none());
    }

    #[test]
    fn mark_cascades_and_cancel_reverses() {
        let mut tree = BudgetTree::new();
        let _keep = add_root(&mut tree, "Keep".into());
        let root = ItemId::Persisted(1);
        tree.nodes.insert(root, BudgetItem::new(root, None, 1, "Ops".into()));
        tree.roots.push(root);
        let child = ItemId::Persisted(2);
        tree.nodes.insert(child, BudgetItem::new(child, Some(root), 2, "c".into()));
        tree.nodes[&root].children.push(child);

        mark_deleted(&mut tree, root).unwrap();
        assert!(tree.nodes[&root].deletion_marked);
        assert!(tree.nodes[&child].deletion_marked);

        cancel_deletion(&mut tree, root).unwrap();
        assert!(!tree.nodes[&root].deletion_marked);
        assert!(!tree.nodes[&child].deletion_marked);
    }

    #[test]
    fn marking_the_last_unmarked_root_is_rejected() {
        let mut tree = BudgetTree::new();
        let a = ItemId::Persisted(1);
        tree.nodes.insert(a, BudgetItem::new(a, None, 1, "Income".into()));
        tree.roots.push(a);
        let b = ItemId::Persisted(2);
        tree.nodes.insert(b, BudgetItem::new(b, None, 1, "Expenses".into()));
        tree.roots.push(b);

        mark_deleted(&mut tree, a).unwrap();
        assert!(matches!(mark_deleted(&mut tree, b), Err(TreeError::LastRoot)));

        // Restoring the first frees the second up again.
        cancel_deletion(&mut tree, a).unwrap();
        mark_deleted(&mut tree, b).unwrap();
    }

    #[test]
    fn restoring_a_descendant_unmarks_its_ancestors() {
        let mut tree = BudgetTree::new();
        let _keep = add_root(&mut tree, "Keep".into());
        let root = ItemId::Persisted(1);
        tree.nodes.insert(root, BudgetItem::new(root, None, 1, "Ops".into()));
        tree.roots.push(root);
        let kept = ItemId::Persisted(2);
        tree.nodes.insert(kept, BudgetItem::new(kept, Some(root), 2, "kept".into()));
        tree.nodes[&root].children.push(kept);
        let doomed = ItemId::Persisted(3);
        tree.nodes.insert(doomed, BudgetItem::new(doomed, Some(root), 2, "doomed".into()));
        tree.nodes[&root].children.push(doomed);

        mark_deleted(&mut tree, root).unwrap();
        cancel_deletion(&mut tree, kept).unwrap();

        assert!(!tree.nodes[&root].deletion_marked);
        assert!(!tree.nodes[&kept].deletion_marked);
        assert!(tree.nodes[&doomed].deletion_marked);
    }

    #[test]
    fn temp_nodes_cannot_be_deferred() {
        let mut tree = BudgetTree::new();
        let _a = add_root(&mut tree, "A".into());
        let b = add_root(&mut tree, "B".into());
        assert!(matches!(mark_deleted(&mut tree, b), Err(TreeError::MarkTemp(_))));
    }

    #[test]
    fn adding_a_child_turns_a_formula_leaf_into_a_sum() {
        // Scenario: leaf 12 x 1,000,000 = 12,000,000; a new child clears the
        // formula and the total becomes the (empty) child sum.
        let mut tree = BudgetTree::new();
        let leaf = add_root(&mut tree, "Offering".into());
        set_frequency(&mut tree, leaf, Some(12), Some(FrequencyUnit::Monthly)).unwrap();
        set_unit_amount(&mut tree, leaf, Some(1_000_000.0)).unwrap();
        assert_eq!(tree.nodes[&leaf].total_target, Some(12_000_000.0));

        add_child(&mut tree, leaf, "Sub".into()).unwrap();
        let node = &tree.nodes[&leaf];
        assert_eq!(node.target_frequency, None);
        assert_eq!(node.unit_amount, None);
        assert_eq!(node.total_target, Some(0.0));
    }

    #[test]
    fn missing_ids_are_reported() {
        let mut tree = BudgetTree::new();
        add_root(&mut tree, "A".into());
        let ghost = ItemId::Persisted(404);
        assert!(matches!(add_child(&mut tree, ghost, "x".into()), Err(TreeError::NotFound(_))));
        assert!(matches!(set_name(&mut tree, ghost, "x".into()), Err(TreeError::NotFound(_))));
        assert!(matches!(cancel_deletion(&mut tree, ghost), Err(TreeError::NotFound(_))));
    }
}
