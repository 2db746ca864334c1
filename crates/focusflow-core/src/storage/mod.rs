mod backup;
mod config;
pub mod database;
mod documents;

pub use backup::{Backup, ImportSummary};
pub use config::{Config, GamificationConfig, LoggingConfig, NotificationsConfig};
pub use database::Database;
pub use documents::{keys, DocumentStore};

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns the data directory, creating it if needed.
///
/// `FOCUSFLOW_HOME` wins when set. Otherwise `~/.config/focusflow[-dev]/`
/// based on `FOCUSFLOW_ENV`; set `FOCUSFLOW_ENV=dev` to use the development
/// data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("FOCUSFLOW_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUSFLOW_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focusflow-dev")
            } else {
                base_dir.join("focusflow")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
