use std::collections::BTreeSet;

use crate::model::{BudgetItemPayload, BudgetTree, ItemId};
use crate::ops::mutate::{self, TreeError};
use crate::ops::validate::{self, ValidationIssue};
use crate::sync::gateway::{BudgetGateway, StoreError};

/// Which category/period slice of the store a save writes into.
#[derive(Debug, Clone, Copy)]
pub struct SaveScope {
    pub category_id: i64,
    pub period_id: i64,
}

/// Error type for save-time synchronization
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("cannot save: {} validation issue(s)", .0.len())]
    Validation(Vec<ValidationIssue>),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Per-item anomaly recorded during a save; logged, never fatal.
#[derive(Debug, Clone)]
pub enum SaveWarning {
    /// An update hit a record that no longer exists; the whole subtree was
    /// skipped rather than recreated under a missing parent.
    Vanished {
        id: i64,
        code: String,
        skipped: usize,
    },
}

impl std::fmt::Display for SaveWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveWarning::Vanished { id, code, skipped } => write!(
                f,
                "item {} (#{}) vanished from the store; skipped it and {} descendant(s)",
                code, id, skipped
            ),
        }
    }
}

/// Aggregate outcome of one save attempt.
#[derive(Debug, Default)]
pub struct SaveReport {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Deletes that found nothing; benign, the record was already gone.
    pub missing_deletes: usize,
    pub warnings: Vec<SaveWarning>,
}

/// The persisted ids a save must remove: everything loaded at session start
/// that is no longer in the tree, plus everything currently marked for
/// deletion. Temp ids never appear. Deduplicated and deterministic.
pub fn deletion_set(tree: &BudgetTree) -> BTreeSet<i64> {
    let present = tree.persisted_ids();
    let mut set: BTreeSet<i64> = tree
        .loaded_ids
        .iter()
        .filter(|id| !present.contains(id))
        .copied()
        .collect();
    for (id, node) in &tree.nodes {
        if node.deletion_marked
            && let Some(pid) = id.persisted()
        {
            set.insert(pid);
        }
    }
    set
}

/// Reconcile the edited tree against the store.
///
/// Validation runs first and aborts before any network-equivalent call. Then
/// a delete pass clears the deletion set, and a depth-first upsert pass
/// writes every surviving node strictly parent-before-child, resolving each
/// new node's real parent id from its just-persisted parent. On success the
/// store mirrors the tree minus deletion-marked/vanished subtrees, which are
/// then dropped from the tree, and `loaded_ids` is re-baselined.
///
/// A hard store failure aborts the remaining work; whatever was already
/// written stays written. The next save's diff pass reconciles the rest.
pub fn save(
    tree: &mut BudgetTree,
    gateway: &mut dyn BudgetGateway,
    scope: SaveScope,
) -> Result<SaveReport, SaveError> {
    let validation = validate::validate(tree);
    if !validation.valid {
        return Err(SaveError::Validation(validation.issues));
    }

    let mut report = SaveReport::default();

    // Delete pass. Not-found is success: the record is gone either way.
    for id in deletion_set(tree) {
        if gateway.delete(id)? {
            report.deleted += 1;
        } else {
            report.missing_deletes += 1;
        }
    }

    // Upsert pass, parent before child.
    let mut vanished: Vec<ItemId> = Vec::new();
    for root in tree.roots.clone() {
        upsert(tree, gateway, scope, root, None, &mut report, &mut vanished)?;
    }

    // The store now reflects everything that survived; drop what didn't.
    for id in tree.preorder() {
        if tree.get(id).is_some_and(|n| n.deletion_marked) {
            drop_subtree(tree, id);
        }
    }
    for id in vanished {
        if tree.get(id).is_some() {
            drop_subtree(tree, id);
        }
    }
    tree.loaded_ids = tree.persisted_ids();

    Ok(report)
}

fn upsert(
    tree: &mut BudgetTree,
    gateway: &mut dyn BudgetGateway,
    scope: SaveScope,
    id: ItemId,
    real_parent: Option<i64>,
    report: &mut SaveReport,
    vanished: &mut Vec<ItemId>,
) -> Result<(), SaveError> {
    let node = &tree.nodes[&id];
    if node.deletion_marked {
        return Ok(());
    }
    let payload = payload_for(tree, id, real_parent, scope);

    let (current, real_id) = match id {
        ItemId::Temp(_) => {
            let rec = gateway.create(&payload)?;
            report.created += 1;
            // The node's identity changes here; every later payload in this
            // branch sees the real id as its parent.
            let new_id = tree
                .promote(id, rec.id)
                .unwrap_or(ItemId::Persisted(rec.id));
            (new_id, rec.id)
        }
        ItemId::Persisted(pid) => match gateway.update(pid, &payload)? {
            Some(_) => {
                report.updated += 1;
                (id, pid)
            }
            None => {
                // Vanished from the store: never create orphans under a
                // missing parent; skip the branch and keep going.
                report.warnings.push(SaveWarning::Vanished {
                    id: pid,
                    code: payload.code.clone(),
                    skipped: tree.subtree_ids(id).len() - 1,
                });
                vanished.push(id);
                return Ok(());
            }
        },
    };

    for child in tree.nodes[&current].children.clone() {
        upsert(tree, gateway, scope, child, Some(real_id), report, vanished)?;
    }
    Ok(())
}

fn payload_for(
    tree: &BudgetTree,
    id: ItemId,
    real_parent: Option<i64>,
    scope: SaveScope,
) -> BudgetItemPayload {
    let node = &tree.nodes[&id];
    BudgetItemPayload {
        category_id: scope.category_id,
        period_id: scope.period_id,
        parent_id: real_parent,
        code: node.code.clone(),
        name: node.name.clone(),
        description: node.description.clone(),
        level: node.level,
        order: node.order,
        target_frequency: node.target_frequency,
        frequency_unit: node.frequency_unit,
        unit_amount: node.unit_amount,
        total_target: node.total_target,
        active: node.active,
    }
}

/// Remove a subtree from the arena without touching derived fields: the
/// remaining tree must keep mirroring what the save just wrote.
fn drop_subtree(tree: &mut BudgetTree, id: ItemId) {
    let doomed = tree.subtree_ids(id);
    tree.detach(id);
    for d in doomed {
        tree.nodes.shift_remove(&d);
    }
}

/// "Delete now" on a persisted node: remove the subtree in memory and issue
/// the remote deletes immediately. Not-found deletes are benign. Returns how
/// many records the store actually removed.
pub fn delete_now(
    tree: &mut BudgetTree,
    gateway: &mut dyn BudgetGateway,
    id: ItemId,
) -> Result<usize, SaveError> {
    let persisted = mutate::remove_subtree(tree, id)?;
    let mut deleted = 0;
    for pid in &persisted {
        if gateway.delete(*pid)? {
            deleted += 1;
        }
    }
    // Already-gone ids stay in loaded_ids harmlessly; the next save's diff
    // pass skips them because delete is idempotent.
    for pid in persisted {
        tree.loaded_ids.remove(&pid);
    }
    Ok(deleted)
}
