use crate::model::{BudgetTree, ItemId};

/// The hierarchical code for a node at `sibling_index` (0-based):
/// level 1 → `A`, `B`, …, `Z`, `AA`, `AB`, …; deeper levels append
/// `.{index+1}` to the parent's code.
pub fn code_for(level: u32, sibling_index: usize, parent_code: &str) -> String {
    if level <= 1 {
        level_one_code(sibling_index)
    } else {
        format!("{}.{}", parent_code, sibling_index + 1)
    }
}

/// Bijective base-26 letter code: 0 → A, 25 → Z, 26 → AA, 27 → AB, …
pub fn level_one_code(index: usize) -> String {
    let mut n = index + 1;
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Rewrite `code` and `order` on every node from its actual position, in one
/// depth-first walk. Run after every structural change so the two derived
/// fields never drift.
pub fn regenerate(tree: &mut BudgetTree) {
    let roots = tree.roots.clone();
    for (i, root) in roots.iter().enumerate() {
        assign(tree, *root, i, 1, "");
    }
}

fn assign(tree: &mut BudgetTree, id: ItemId, index: usize, level: u32, parent_code: &str) {
    let code = code_for(level, index, parent_code);
    let children = {
        let node = &mut tree.nodes[&id];
        node.level = level;
        node.order = (index + 1) as u32;
        node.code = code.clone();
        node.children.clone()
    };
    for (i, child) in children.iter().enumerate() {
        assign(tree, *child, i, level + 1, &code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BudgetItem;

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
    fn letter_codes_overflow_like_spreadsheet_columns() {
        assert_eq!(level_one_code(0), "A");
        assert_eq!(level_one_code(25), "Z");
        assert_eq!(level_one_code(26), "AA");
        assert_eq!(level_one_code(27), "AB");
        assert_eq!(level_one_code(51), "AZ");
        assert_eq!(level_one_code(52), "BA");
        assert_eq!(level_one_code(701), "ZZ");
        assert_eq!(level_one_code(702), "AAA");
    }

    #[test]
    fn nested_codes_follow_parent() {
        assert_eq!(code_for(1, 1, ""), "B");
        assert_eq!(code_for(2, 0, "B"), "B.1");
        assert_eq!(code_for(3, 2, "B.1"), "B.1.3");
    }

    #[test]
    fn regenerate_walks_whole_tree() {
        let mut tree = BudgetTree::new();
        let income = leaf(&mut tree, None, "Income");
        let expenses = leaf(&mut tree, None, "Expenses");
        let offerings = leaf(&mut tree, Some(income), "Offerings");
        let weekly = leaf(&mut tree, Some(offerings), "Weekly");
        let rent = leaf(&mut tree, Some(expenses), "Rent");

        regenerate(&mut tree);

        assert_eq!(tree.nodes[&income].code, "A");
        assert_eq!(tree.nodes[&expenses].code, "B");
        assert_eq!(tree.nodes[&offerings].code, "A.1");
        assert_eq!(tree.nodes[&weekly].code, "A.1.1");
        assert_eq!(tree.nodes[&rent].code, "B.1");
        assert_eq!(tree.nodes[&expenses].order, 2);
        assert_eq!(tree.nodes[&weekly].level, 3);
    }

    #[test]
    fn regenerate_is_idempotent() {
        let mut tree = BudgetTree::new();
        let a = leaf(&mut tree, None, "A");
        let _b = leaf(&mut tree, Some(a), "child");
        regenerate(&mut tree);
        let first: Vec<(ItemId, String, u32)> = tree
            .preorder()
            .into_iter()
            .map(|id| (id, tree.nodes[&id].code.clone(), tree.nodes[&id].order))
            .collect();
        regenerate(&mut tree);
        let second: Vec<(ItemId, String, u32)> = tree
            .preorder()
            .into_iter()
            .map(|id| (id, tree.nodes[&id].code.clone(), tree.nodes[&id].order))
            .collect();
        assert_eq!(first, second);
    }
}
