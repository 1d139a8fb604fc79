use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::{StatusRecord, StatusStore, StoreBackendError};

/// Volatile store used for tests and throwaway runs.
///
/// A failure can be scheduled for the n-th `put` (zero based) to reproduce a
/// backend dropping out halfway through a multi-key update.
#[derive(Debug, Default)]
pub struct InMemoryStatusStore {
    records: RwLock<HashMap<String, bool>>,
    puts: AtomicUsize,
    fail_put_at: Option<usize>,
}

impl InMemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records<I, K>(records: I) -> Self
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<String>,
    {
        Self {
            records: RwLock::new(records.into_iter().map(|(k, v)| (k.into(), v)).collect()),
            ..Self::default()
        }
    }

    pub fn failing_put_at(mut self, index: usize) -> Self {
        self.fail_put_at = Some(index);
        self
    }

    /// Number of `put` calls seen so far, including a failed one.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> HashMap<String, bool> {
        self.records.read().await.clone()
    }
}

#[async_trait::async_trait]
impl StatusStore for InMemoryStatusStore {
    async fn get(&self, key: &str) -> Result<Option<StatusRecord>, StoreBackendError> {
        let records = self.records.read().await;
        Ok(records.get(key).map(|status| StatusRecord::new(key, *status)))
    }

    async fn put(&self, record: StatusRecord) -> Result<(), StoreBackendError> {
        let index = self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_put_at == Some(index) {
            return Err(StoreBackendError::Unavailable(format!(
                "injected failure on put #{index}"
            )));
        }
        self.records.write().await.insert(record.id, record.status);
        Ok(())
    }
}
