//! Key-value status store.
//!
//! The state machine only needs two operations from its backing table: a read
//! by key and an overwriting put. Anything that can offer those (a managed
//! document table, a local file, memory) can sit behind [`StatusStore`].
//!
//! # Examples
//!
//! ```rust
//! use ops_status::store::{InMemoryStatusStore, StatusRecord, StatusStore};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), ops_status::store::StoreBackendError> {
//! let store = InMemoryStatusStore::new();
//! store.put(StatusRecord::new("SC Emergency Mode", true)).await?;
//!
//! let record = store.get("SC Emergency Mode").await?;
//! assert_eq!(record.map(|r| r.status), Some(true));
//! # Ok(())
//! # }
//! ```

mod file;
mod memory;

pub use file::FileStatusStore;
pub use memory::InMemoryStatusStore;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[cfg(test)]
use mockall::automock;

use crate::config::{StoreBackend, StoreConfig};

/// One persisted flag. The field names match the table's item schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub id: String,
    #[serde(rename = "Status")]
    pub status: bool,
}

impl StatusRecord {
    pub fn new(id: impl Into<String>, status: bool) -> Self {
        Self {
            id: id.into(),
            status,
        }
    }
}

/// Failures raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreBackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Read/write contract required of the status table.
///
/// `put` is an upsert with last-write-wins semantics. No transactions or
/// concurrency tokens are expected.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait StatusStore: Send + Sync {
    /// Fetch the record stored under `key`, or `None` if it was never written.
    async fn get(&self, key: &str) -> Result<Option<StatusRecord>, StoreBackendError>;

    /// Create or overwrite the record under `record.id`.
    async fn put(&self, record: StatusRecord) -> Result<(), StoreBackendError>;
}

/// Construct the configured store backend.
pub fn build_store(config: &StoreConfig) -> Arc<dyn StatusStore> {
    match config.backend {
        StoreBackend::Memory => {
            info!(table = %config.table_name, "Using in-memory status store");
            Arc::new(InMemoryStatusStore::new())
        }
        StoreBackend::File => {
            let store = FileStatusStore::new(&config.data_dir, &config.table_name);
            info!(path = %store.path().display(), "Using file-backed status store");
            Arc::new(store)
        }
    }
}
