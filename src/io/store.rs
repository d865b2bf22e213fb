use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::model::{BudgetItemPayload, BudgetItemRecord};
use crate::sync::gateway::{BudgetGateway, StoreError};

/// The flat budget item store, one JSON file of records.
///
/// This is the CLI's stand-in for the remote persistence service: every
/// mutation is flushed to disk immediately, so each call is as durable as a
/// server round-trip. Ids are assigned from a monotonic counter that never
/// reuses a deleted id.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    records: Vec<BudgetItemRecord>,
    next_id: i64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    next_id: i64,
    #[serde(default)]
    items: Vec<BudgetItemRecord>,
}

impl FileStore {
    /// Open a store file, creating an empty store if the file is missing.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(FileStore {
                path: path.to_path_buf(),
                records: Vec::new(),
                next_id: 1,
            });
        }
        let text = fs::read_to_string(path).map_err(|e| StoreError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file: StoreFile = serde_json::from_str(&text).map_err(|e| StoreError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        let max_id = file.items.iter().map(|r| r.id).max().unwrap_or(0);
        Ok(FileStore {
            path: path.to_path_buf(),
            records: file.items,
            next_id: file.next_id.max(max_id + 1),
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write the whole store atomically (temp file + rename).
    fn flush(&self) -> Result<(), StoreError> {
        let dir = self.path.parent().unwrap_or(Path::new("."));
        let write_err = |e: std::io::Error| StoreError::Write {
            path: self.path.clone(),
            source: e,
        };
        let file = StoreFile {
            next_id: self.next_id,
            items: self.records.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| StoreError::Parse {
            path: self.path.clone(),
            source: e,
        })?;
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

impl BudgetGateway for FileStore {
    fn create(&mut self, payload: &BudgetItemPayload) -> Result<BudgetItemRecord, StoreError> {
        let rec = BudgetItemRecord::from_payload(self.next_id, payload, Utc::now());
        self.next_id += 1;
        self.records.push(rec.clone());
        self.flush()?;
        Ok(rec)
    }

    fn update(
        &mut self,
        id: i64,
        payload: &BudgetItemPayload,
    ) -> Result<Option<BudgetItemRecord>, StoreError> {
        let Some(rec) = self.records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        rec.apply(payload, Utc::now());
        let out = rec.clone();
        self.flush()?;
        Ok(Some(out))
    }

    fn delete(&mut self, id: i64) -> Result<bool, StoreError> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        let removed = self.records.len() != before;
        if removed {
            self.flush()?;
        }
        Ok(removed)
    }

    fn list(&self, category_id: i64, period_id: i64) -> Result<Vec<BudgetItemRecord>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.category_id == category_id && r.period_id == period_id)
            .cloned()
            .collect())
    }
}
