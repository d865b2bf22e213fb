use crate::model::{BudgetTree, ItemId};

/// Recompute every `total_target` bottom-up.
///
/// Parents always show the sum of their children and carry no unit formula
/// of their own. Leaves with both frequency and unit amount get the product;
/// other leaves keep whatever manual total they have. Full-tree recompute:
/// correctness over incremental performance.
pub fn recompute_totals(tree: &mut BudgetTree) {
    let roots = tree.roots.clone();
    for root in roots {
        recompute_node(tree, root);
    }
}

fn recompute_node(tree: &mut BudgetTree, id: ItemId) -> Option<f64> {
    let children = tree.nodes[&id].children.clone();

    if children.is_empty() {
        let node = &mut tree.nodes[&id];
        if let (Some(freq), Some(unit)) = (node.target_frequency, node.unit_amount) {
            node.total_target = Some(freq as f64 * unit);
        }
        // A manual total on a formula-less leaf is preserved as-is.
        return tree.nodes[&id].total_target;
    }

    let mut sum = 0.0;
    for child in children {
        sum += recompute_node(tree, child).unwrap_or(0.0);
    }
    let node = &mut tree.nodes[&id];
    node.total_target = Some(sum);
    // The unit formula applies to leaves only.
    node.target_frequency = None;
    node.frequency_unit = None;
    node.unit_amount = None;
    Some(sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BudgetItem, FrequencyUnit};

    fn leaf(tree: &mut BudgetTree, parent: Option<ItemId>, name: &str) -> ItemId {
        let id = tree.alloc_temp();
        let level = parent.map(|p| tree.nodes[&p].level + 1).unwrap_or(1);
        tree.nodes.insert(id, BudgetItem::new(id, parent, level, name.into()));
        match parent {
            Some(p) => tree.nodes[&p].children.push(id),
            None => tree.roots.push(id),
        }
        id
    }

    #[test]
    fn leaf_total_is_frequency_times_unit() {
        let mut tree = BudgetTree::new();
        let id = leaf(&mut tree, None, "Weekly Offering");
        tree.nodes[&id].target_frequency = Some(12);
        tree.nodes[&id].frequency_unit = Some(FrequencyUnit::Monthly);
        tree.nodes[&id].unit_amount = Some(1_000_000.0);

        recompute_totals(&mut tree);
        assert_eq!(tree.nodes[&id].total_target, Some(12_000_000.0));
    }

    #[test]
    fn manual_total_preserved_without_formula() {
        let mut tree = BudgetTree::new();
        let id = leaf(&mut tree, None, "Misc");
        tree.nodes[&id].total_target = Some(250.0);
        recompute_totals(&mut tree);
        assert_eq!(tree.nodes[&id].total_target, Some(250.0));

        let blank = leaf(&mut tree, None, "Blank");
        recompute_totals(&mut tree);
        assert_eq!(tree.nodes[&blank].total_target, None);
    }

    #[test]
    fn parent_sums_children_and_clears_unit_fields() {
        let mut tree = BudgetTree::new();
        let parent = leaf(&mut tree, None, "Income");
        tree.nodes[&parent].target_frequency = Some(4);
        tree.nodes[&parent].unit_amount = Some(10.0);

        let a = leaf(&mut tree, Some(parent), "a");
        tree.nodes[&a].target_frequency = Some(2);
        tree.nodes[&a].unit_amount = Some(300.0);
        let b = leaf(&mut tree, Some(parent), "b");
        tree.nodes[&b].total_target = Some(100.0);

        recompute_totals(&mut tree);

        let p = &tree.nodes[&parent];
        assert_eq!(p.total_target, Some(700.0));
        assert_eq!(p.target_frequency, None);
        assert_eq!(p.frequency_unit, None);
        assert_eq!(p.unit_amount, None);
    }

    #[test]
    fn parent_of_blank_children_shows_zero() {
        let mut tree = BudgetTree::new();
        let parent = leaf(&mut tree, None, "Income");
        leaf(&mut tree, Some(parent), "unfilled");
        recompute_totals(&mut tree);
        assert_eq!(tree.nodes[&parent].total_target, Some(0.0));
    }
}
