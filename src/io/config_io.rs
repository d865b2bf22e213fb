use std::fs;
use std::path::{Path, PathBuf};

use crate::model::BookConfig;

/// Error type for book discovery and config I/O
#[derive(Debug, thiserror::Error)]
pub enum BookError {
    #[error("not a budget book: no budget/ directory found")]
    NotABook,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse budget.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Discover the budget book by walking up from the given directory, looking
/// for a `budget/` subdirectory holding a `budget.toml`.
pub fn discover_book(start: &Path) -> Result<PathBuf, BookError> {
    let mut current = start.to_path_buf();
    loop {
        let book_dir = current.join("budget");
        if book_dir.is_dir() && book_dir.join("budget.toml").exists() {
            return Ok(book_dir);
        }
        if !current.pop() {
            return Err(BookError::NotABook);
        }
    }
}

/// Read and parse budget.toml from the book directory.
pub fn read_config(book_dir: &Path) -> Result<BookConfig, BookError> {
    let config_path = book_dir.join("budget.toml");
    let text = fs::read_to_string(&config_path).map_err(|e| BookError::ReadError {
        path: config_path,
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}
