pub mod kv;
mod repository;

pub use kv::{KeyValueStore, MemoryKvStore, SqliteKvStore};
pub use repository::Repository;

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns `~/.config/ritual[-dev]/` based on RITUAL_ENV.
///
/// Set RITUAL_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the config directory cannot be created.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("RITUAL_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("ritual-dev")
    } else {
        base_dir.join("ritual")
    };

    std::fs::create_dir_all(&dir).map_err(|e| StorageError::OpenFailed {
        path: dir.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
