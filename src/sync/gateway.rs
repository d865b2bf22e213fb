use std::path::PathBuf;

use crate::model::{BudgetItemPayload, BudgetItemRecord};

/// Error type for persistence gateway operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
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
    #[error("malformed store file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("store failure: {0}")]
    Backend(String),
}

/// Per-item CRUD against the persisted flat record store.
///
/// Not-found is not an error at this seam: `update` reports it as `None` and
/// `delete` as `false`, and the sync engine decides what each means. Only
/// real store failures surface as [`StoreError`].
pub trait BudgetGateway {
    /// Create a record, returning it with its store-assigned id.
    fn create(&mut self, payload: &BudgetItemPayload) -> Result<BudgetItemRecord, StoreError>;

    /// Update by id. `None` means the record no longer exists.
    fn update(
        &mut self,
        id: i64,
        payload: &BudgetItemPayload,
    ) -> Result<Option<BudgetItemRecord>, StoreError>;

    /// Delete by id. `false` means it was already gone.
    fn delete(&mut self, id: i64) -> Result<bool, StoreError>;

    /// All records for one category/period pair.
    fn list(&self, category_id: i64, period_id: i64) -> Result<Vec<BudgetItemRecord>, StoreError>;
}
