//! End-to-end library flows: build a tree, edit it across sessions, and
//! reconcile against a file store the way the CLI does.

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use budgetree::io::store::FileStore;
use budgetree::model::{BudgetTree, FrequencyUnit};
use budgetree::ops::{self, mutate};
use budgetree::sync::{self, BudgetGateway, SaveScope, SaveWarning};

const SCOPE: SaveScope = SaveScope {
    category_id: 1,
    period_id: 2026,
};

fn open_store(dir: &TempDir) -> FileStore {
    FileStore::open(&dir.path().join("items.json")).unwrap()
}

fn checkout(store: &FileStore) -> BudgetTree {
    let records = store.list(SCOPE.category_id, SCOPE.period_id).unwrap();
    let mut tree = BudgetTree::from_records(&records);
    ops::normalize(&mut tree);
    tree
}

#[test]
fn first_save_persists_a_fresh_tree_with_resolved_parents() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    let mut tree = BudgetTree::new();
    let income = mutate::add_root(&mut tree, "Income".into());
    let offerings = mutate::add_child(&mut tree, income, "Offerings".into()).unwrap();
    let weekly = mutate::add_child(&mut tree, offerings, "Weekly".into()).unwrap();
    mutate::set_frequency(&mut tree, weekly, Some(52), Some(FrequencyUnit::Weekly)).unwrap();
    mutate::set_unit_amount(&mut tree, weekly, Some(500.0)).unwrap();
    let expenses = mutate::add_root(&mut tree, "Expenses".into());
    mutate::set_total_target(&mut tree, expenses, Some(10_000.0)).unwrap();

    let report = sync::save(&mut tree, &mut store, SCOPE).unwrap();
    assert_eq!(report.created, 4);
    assert_eq!(report.updated, 0);

    // A second session sees the same shape, totals rolled up.
    let store = open_store(&dir);
    let tree = checkout(&store);
    assert_eq!(tree.len(), 4);
    let income = tree.find_by_code("A").unwrap();
    let weekly = tree.find_by_code("A.1.1").unwrap();
    assert_eq!(tree.nodes[&income].total_target, Some(26_000.0));
    assert_eq!(tree.nodes[&weekly].total_target, Some(26_000.0));
    assert_eq!(
        tree.nodes[&weekly].parent,
        Some(tree.find_by_code("A.1").unwrap())
    );
    assert_eq!(tree.loaded_ids.len(), 4);
}

#[test]
fn deferred_deletion_resolves_at_next_save() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    let mut tree = BudgetTree::new();
    let keep = mutate::add_root(&mut tree, "Keep".into());
    mutate::add_child(&mut tree, keep, "child".into()).unwrap();
    let doomed = mutate::add_root(&mut tree, "Doomed".into());
    mutate::add_child(&mut tree, doomed, "doomed child".into()).unwrap();
    sync::save(&mut tree, &mut store, SCOPE).unwrap();

    // Next session: mark the second root, then save.
    let mut store = open_store(&dir);
    let mut tree = checkout(&store);
    let doomed = tree.find_by_code("B").unwrap();
    mutate::mark_deleted(&mut tree, doomed).unwrap();

    let report = sync::save(&mut tree, &mut store, SCOPE).unwrap();
    assert_eq!(report.deleted, 2);
    assert_eq!(report.updated, 2);

    let store = open_store(&dir);
    let tree = checkout(&store);
    assert_eq!(tree.len(), 2);
    assert!(tree.find_by_code("B").is_none());
}

#[test]
fn restore_then_save_changes_nothing_structurally() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    let mut tree = BudgetTree::new();
    mutate::add_root(&mut tree, "Keep".into());
    let other = mutate::add_root(&mut tree, "Other".into());
    mutate::add_child(&mut tree, other, "child".into()).unwrap();
    sync::save(&mut tree, &mut store, SCOPE).unwrap();

    let mut store = open_store(&dir);
    let mut tree = checkout(&store);
    let other = tree.find_by_code("B").unwrap();
    mutate::mark_deleted(&mut tree, other).unwrap();
    mutate::cancel_deletion(&mut tree, other).unwrap();

    let report = sync::save(&mut tree, &mut store, SCOPE).unwrap();
    assert_eq!(report.deleted, 0);
    assert_eq!(report.updated, 3);
    assert_eq!(open_store(&dir).len(), 3);
}

#[test]
fn vanished_record_is_skipped_not_recreated() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    let mut tree = BudgetTree::new();
    mutate::add_root(&mut tree, "Solid".into());
    mutate::add_root(&mut tree, "Ghost".into());
    sync::save(&mut tree, &mut store, SCOPE).unwrap();
    let ghost_id = tree.find_by_code("B").unwrap().persisted().unwrap();

    // Another actor deletes the record between sessions.
    let mut store = open_store(&dir);
    let mut tree = checkout(&store);
    store.delete(ghost_id).unwrap();

    // This session keeps editing under the vanished node.
    let ghost = tree.find_by_code("B").unwrap();
    mutate::add_child(&mut tree, ghost, "orphan-to-be".into()).unwrap();

    let report = sync::save(&mut tree, &mut store, SCOPE).unwrap();
    assert_eq!(report.created, 0);
    assert_eq!(report.updated, 1);
    assert_eq!(report.warnings.len(), 1);
    let SaveWarning::Vanished { id, .. } = &report.warnings[0];
    assert_eq!(*id, ghost_id);

    // Store holds only the solid branch; the tree dropped the ghost.
    assert_eq!(open_store(&dir).len(), 1);
    assert_eq!(tree.len(), 1);
}

#[test]
fn interrupted_save_reconciles_on_retry() {
    // Deletes are idempotent: replaying a save after partial completion
    // converges to the same store state.
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    let mut tree = BudgetTree::new();
    mutate::add_root(&mut tree, "Keep".into());
    mutate::add_root(&mut tree, "Drop".into());
    sync::save(&mut tree, &mut store, SCOPE).unwrap();

    let mut store = open_store(&dir);
    let mut tree = checkout(&store);
    let doomed = tree.find_by_code("B").unwrap();

    // Simulate the first save dying right after its delete pass.
    store.delete(doomed.persisted().unwrap()).unwrap();

    // The session still holds the mark; the retry sees a benign miss.
    mutate::mark_deleted(&mut tree, doomed).unwrap();
    let report = sync::save(&mut tree, &mut store, SCOPE).unwrap();
    assert_eq!(report.deleted, 0);
    assert_eq!(report.missing_deletes, 1);
    assert_eq!(open_store(&dir).len(), 1);
}
