/// Fjall-based local persistence for download history and edited settings
///
/// Two partitions:
///
/// - `history`: completed downloads, capped and purged by age
/// - `settings`: provider profiles and naming settings edited through the
///   service, which take precedence over the configuration file on restart
///
/// ## Usage
///
/// ```rust,ignore
/// use smartsave::store::LocalStore;
///
/// let store = LocalStore::open("data/smartsave")?;
/// store.append_history(&record, 100)?;
/// let recent = store.list_history(20)?;
/// ```
pub mod error;
pub mod history;
pub mod keys;
pub mod settings;

pub use error::{Result, StoreError};
pub use history::HistoryRecord;

use std::path::Path;

use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle};
use tracing::info;

#[derive(Clone)]
pub struct LocalStore {
    keyspace: Keyspace,
    history: PartitionHandle,
    settings: PartitionHandle,
}

impl LocalStore {
    /// Open or create a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening store at: {}", path.display());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let keyspace = Config::new(path).open()?;
        let history = keyspace.open_partition("history", PartitionCreateOptions::default())?;
        let settings = keyspace.open_partition("settings", PartitionCreateOptions::default())?;

        Ok(Self {
            keyspace,
            history,
            settings,
        })
    }

    /// Persist all pending writes to disk
    pub fn persist(&self) -> Result<()> {
        self.keyspace.persist(fjall::PersistMode::SyncAll)?;
        Ok(())
    }

    pub fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            history_count: self.history.len()?,
        })
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct StoreStats {
    pub history_count: usize,
}
