use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use super::id::ItemId;
use super::item::BudgetItem;
use super::record::BudgetItemRecord;

/// The in-memory budget tree for one category/period pair.
///
/// Nodes live in an arena keyed by [`ItemId`]; structure is expressed through
/// each node's `parent` and ordered `children` lists plus the ordered `roots`
/// list. `loaded_ids` remembers which persisted ids existed when the session
/// started, which is the diff baseline for save-time reconciliation.
#[derive(Debug, Clone, Default)]
pub struct BudgetTree {
    pub nodes: IndexMap<ItemId, BudgetItem>,
    /// Ordered level-1 node ids.
    pub roots: Vec<ItemId>,
    /// Counter for session-local temp ids.
    pub next_temp: u64,
    /// Persisted ids present at session start.
    pub loaded_ids: HashSet<i64>,
}

impl BudgetTree {
    pub fn new() -> Self {
        BudgetTree::default()
    }

    /// Build a tree from the store's flat record list.
    ///
    /// Records are indexed by id and linked via `parent_id`; a record whose
    /// parent is not in the list becomes a root (orphan-tolerant). Siblings
    /// are sorted by stored `order` ascending. Codes and orders still carry
    /// whatever the store had; callers run [`crate::ops::normalize`] to
    /// rewrite them from actual positions.
    pub fn from_records(records: &[BudgetItemRecord]) -> Self {
        let mut tree = BudgetTree::new();
        let known: HashSet<i64> = records.iter().map(|r| r.id).collect();
        let mut stored_order: HashMap<ItemId, u32> = HashMap::new();

        for rec in records {
            let id = ItemId::Persisted(rec.id);
            let parent = rec
                .parent_id
                .filter(|p| known.contains(p))
                .map(ItemId::Persisted);
            let item = BudgetItem {
                id,
                parent,
                children: Vec::new(),
                level: rec.level.max(1),
                code: rec.code.clone(),
                order: rec.order,
                name: rec.name.clone(),
                description: rec.description.clone(),
                target_frequency: rec.target_frequency,
                frequency_unit: rec.frequency_unit,
                unit_amount: rec.unit_amount,
                total_target: rec.total_target,
                deletion_marked: false,
                active: rec.active,
            };
            stored_order.insert(id, rec.order);
            tree.nodes.insert(id, item);
            tree.loaded_ids.insert(rec.id);
        }

        // Link children and collect roots, then sort every sibling list.
        let ids: Vec<ItemId> = tree.nodes.keys().copied().collect();
        for id in &ids {
            let parent = tree.nodes[id].parent;
            match parent {
                Some(parent) => tree.nodes[&parent].children.push(*id),
                None => tree.roots.push(*id),
            }
        }
        let by_order = |a: &ItemId, b: &ItemId| {
            let oa = stored_order.get(a).copied().unwrap_or(0);
            let ob = stored_order.get(b).copied().unwrap_or(0);
            oa.cmp(&ob).then(a.cmp(b))
        };
        tree.roots.sort_by(by_order);
        for id in &ids {
            tree.nodes[id].children.sort_by(by_order);
        }
        tree
    }

    /// Allocate a fresh session-local id.
    pub fn alloc_temp(&mut self) -> ItemId {
        self.next_temp += 1;
        ItemId::Temp(self.next_temp)
    }

    pub fn get(&self, id: ItemId) -> Option<&BudgetItem> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut BudgetItem> {
        self.nodes.get_mut(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Look a node up by its display code (exact match).
    pub fn find_by_code(&self, code: &str) -> Option<ItemId> {
        self.preorder().into_iter().find(|id| self.nodes[id].code == code)
    }

    /// All node ids, depth-first in display order.
    pub fn preorder(&self) -> Vec<ItemId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            self.collect_subtree(*root, &mut out);
        }
        out
    }

    /// The node and all its descendants, depth-first.
    pub fn subtree_ids(&self, id: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        if self.nodes.contains_key(&id) {
            self.collect_subtree(id, &mut out);
        }
        out
    }

    fn collect_subtree(&self, id: ItemId, out: &mut Vec<ItemId>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        out.push(id);
        for child in node.children.clone() {
            self.collect_subtree(child, out);
        }
    }

    /// Every persisted id currently present in the tree.
    pub fn persisted_ids(&self) -> HashSet<i64> {
        self.nodes.keys().filter_map(|id| id.persisted()).collect()
    }

    /// Unlink a node from its parent's child list (or the roots list).
    /// The node itself stays in the arena.
    pub fn detach(&mut self, id: ItemId) {
        let parent = self.nodes.get(&id).and_then(|n| n.parent);
        let list = match parent {
            Some(p) => &mut self.nodes[&p].children,
            None => &mut self.roots,
        };
        list.retain(|c| *c != id);
    }

    /// Rewrite a just-created node's key from its temp id to the real id the
    /// store assigned, fixing the parent's child list, the children's parent
    /// references, and the roots list.
    pub fn promote(&mut self, temp: ItemId, real: i64) -> Option<ItemId> {
        debug_assert!(temp.is_temp());
        let mut node = self.nodes.shift_remove(&temp)?;
        let new_id = ItemId::Persisted(real);
        node.id = new_id;

        if let Some(parent) = node.parent {
            for child in &mut self.nodes[&parent].children {
                if *child == temp {
                    *child = new_id;
                }
            }
        } else {
            for root in &mut self.roots {
                if *root == temp {
                    *root = new_id;
                }
            }
        }
        for child in node.children.clone() {
            if let Some(c) = self.nodes.get_mut(&child) {
                c.parent = Some(new_id);
            }
        }
        self.nodes.insert(new_id, node);
        Some(new_id)
    }
}
