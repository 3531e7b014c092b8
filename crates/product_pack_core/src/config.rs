//! Environment-driven runtime configuration.
//!
//! # Responsibility
//! - Resolve database path and logging settings for binaries embedding core.
//!
//! # Invariants
//! - Blank or unset variables fall back to defaults; resolution never fails.
//! - Defaults live under the system temp directory.

use crate::logging::default_log_level;
use std::path::PathBuf;

/// Overrides the SQLite database file location.
pub const DB_PATH_ENV: &str = "PRODUCT_PACK_DB_PATH";
/// Overrides the log level (`trace|debug|info|warn|error`).
pub const LOG_LEVEL_ENV: &str = "PRODUCT_PACK_LOG_LEVEL";
/// Overrides the absolute log directory.
pub const LOG_DIR_ENV: &str = "PRODUCT_PACK_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "product_pack.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "product_pack_logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let temp_dir = std::env::temp_dir();
        Self {
            db_path: temp_dir.join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: temp_dir.join(DEFAULT_LOG_DIR_NAME),
        }
    }
}

impl CoreConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_blank = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: non_blank(DB_PATH_ENV).map_or(defaults.db_path, PathBuf::from),
            log_level: non_blank(LOG_LEVEL_ENV).unwrap_or(defaults.log_level),
            log_dir: non_blank(LOG_DIR_ENV).map_or(defaults.log_dir, PathBuf::from),
        }
    }
}
