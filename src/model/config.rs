use serde::{Deserialize, Serialize};

/// Configuration from budget.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookConfig {
    pub book: BookInfo,
    #[serde(default)]
    pub scope: ScopeConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookInfo {
    pub name: String,
}

/// Which category/period slice of the store this book edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeConfig {
    #[serde(default = "default_scope_id")]
    pub category_id: i64,
    #[serde(default = "default_scope_id")]
    pub period_id: i64,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        ScopeConfig {
            category_id: 1,
            period_id: 1,
        }
    }
}

fn default_scope_id() -> i64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store file, relative to the budget/ directory.
    #[serde(default = "default_store_file")]
    pub file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            file: default_store_file(),
        }
    }
}

fn default_store_file() -> String {
    "items.json".to_string()
}
