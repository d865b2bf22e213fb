use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::model::{BudgetTree, ItemId};

/// Error type for draft session I/O
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("no open session: run `bt checkout` first")]
    NoSession,
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed draft file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// On-disk shape of an editing session (draft.json in the book directory).
/// Items are stored flat in depth-first order; structure lives in each
/// item's parent/children ids and is relinked on load.
#[derive(Debug, Serialize, Deserialize)]
struct DraftFile {
    next_temp: u64,
    #[serde(default)]
    loaded_ids: Vec<i64>,
    #[serde(default)]
    items: Vec<crate::model::BudgetItem>,
}

fn draft_path(book_dir: &Path) -> PathBuf {
    book_dir.join("draft.json")
}

pub fn draft_exists(book_dir: &Path) -> bool {
    draft_path(book_dir).exists()
}

/// Load the current editing session. Errors if none is open.
pub fn read_draft(book_dir: &Path) -> Result<BudgetTree, DraftError> {
    let path = draft_path(book_dir);
    if !path.exists() {
        return Err(DraftError::NoSession);
    }
    let text = fs::read_to_string(&path).map_err(|e| DraftError::Read {
        path: path.clone(),
        source: e,
    })?;
    let file: DraftFile = serde_json::from_str(&text).map_err(|e| DraftError::Parse {
        path: path.clone(),
        source: e,
    })?;

    let mut tree = BudgetTree::new();
    tree.next_temp = file.next_temp;
    tree.loaded_ids = file.loaded_ids.into_iter().collect();
    for item in file.items {
        if item.parent.is_none() {
            tree.roots.push(item.id);
        }
        tree.nodes.insert(item.id, item);
    }
    // Relink tolerantly, same as building from store records: an item whose
    // parent is absent becomes a root, and child links that point at nothing
    // are dropped (hand-edited or truncated file).
    let ids: Vec<ItemId> = tree.nodes.keys().copied().collect();
    for id in &ids {
        if let Some(parent) = tree.nodes[id].parent
            && !tree.nodes.contains_key(&parent)
        {
            tree.nodes[id].parent = None;
            tree.roots.push(*id);
        }
        let keep: Vec<ItemId> = tree.nodes[id]
            .children
            .iter()
            .filter(|c| tree.nodes.contains_key(*c))
            .copied()
            .collect();
        tree.nodes[id].children = keep;
    }
    Ok(tree)
}

/// Write the session atomically (temp file + rename), depth-first order.
pub fn write_draft(book_dir: &Path, tree: &BudgetTree) -> Result<(), DraftError> {
    let path = draft_path(book_dir);
    let write_err = |e: std::io::Error| DraftError::Write {
        path: path.clone(),
        source: e,
    };
    let file = DraftFile {
        next_temp: tree.next_temp,
        loaded_ids: {
            let mut ids: Vec<i64> = tree.loaded_ids.iter().copied().collect();
            ids.sort_unstable();
            ids
        },
        items: tree
            .preorder()
            .into_iter()
            .map(|id| tree.nodes[&id].clone())
            .collect(),
    };
    let json = serde_json::to_string_pretty(&file).map_err(|e| DraftError::Parse {
        path: path.clone(),
        source: e,
    })?;
    let mut tmp = NamedTempFile::new_in(book_dir).map_err(write_err)?;
    tmp.write_all(json.as_bytes()).map_err(write_err)?;
    tmp.write_all(b"\n").map_err(write_err)?;
    tmp.persist(&path).map_err(|e| write_err(e.error))?;
    Ok(())
}
