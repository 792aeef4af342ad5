//! Storage Layer
//!
//! Durable existence markers backing the notification ledger. A marker is
//! identified by a stable string key; backends only need to answer "does it
//! exist" and "create it if missing".

pub mod database;
pub mod files;
pub mod ledger;
pub mod memory;

pub use database::SqliteMarkerStore;
pub use files::FileMarkerStore;
pub use ledger::{NotificationLedger, OutcomeType};
pub use memory::MemoryMarkerStore;

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::config::{AppConfig, MarkerBackend};

/// Key-value existence store
pub trait MarkerStore: Send + Sync {
    /// Whether a marker with this key exists. Missing storage means `false`.
    fn exists(&self, key: &str) -> crate::error::Result<bool>;

    /// Create the marker. Creating an existing marker is a no-op.
    fn create(&self, key: &str) -> crate::error::Result<()>;
}

/// Open the marker store selected by the configuration
pub fn open_store(config: &AppConfig) -> Result<Box<dyn MarkerStore>> {
    let store: Box<dyn MarkerStore> = match config.storage.backend {
        MarkerBackend::Files => {
            info!("Using marker files in {:?}", config.paths.marker_dir);
            Box::new(FileMarkerStore::new(config.paths.marker_dir.clone()))
        }
        MarkerBackend::Sqlite => {
            info!("Using marker database {:?}", config.storage.sqlite_path);
            if let Some(parent) = config.storage.sqlite_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Box::new(SqliteMarkerStore::open(&config.storage.sqlite_path)?)
        }
        MarkerBackend::Memory => {
            info!("Using in-memory markers; throttling resets on exit");
            Box::new(MemoryMarkerStore::new())
        }
    };
    Ok(store)
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "chargewatch", "ChargeWatch")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}
