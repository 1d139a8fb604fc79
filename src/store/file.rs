use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use super::{StatusRecord, StatusStore, StoreBackendError};

/// Durable status table kept in a single JSON document on disk.
///
/// The document maps each id to its item. Every `put` rewrites the whole
/// table through a temporary file and a rename. Writers in this process are
/// serialized by a lock. Writers in separate processes are last-write-wins
/// on the whole document.
#[derive(Debug)]
pub struct FileStatusStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStatusStore {
    pub fn new(data_dir: impl AsRef<Path>, table_name: &str) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{table_name}.json")),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load_table(&self) -> Result<BTreeMap<String, StatusRecord>, StoreBackendError> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait::async_trait]
impl StatusStore for FileStatusStore {
    async fn get(&self, key: &str) -> Result<Option<StatusRecord>, StoreBackendError> {
        let table = self.load_table().await?;
        Ok(table.get(key).cloned())
    }

    async fn put(&self, record: StatusRecord) -> Result<(), StoreBackendError> {
        let _guard = self.write_lock.lock().await;

        let mut table = self.load_table().await?;
        table.insert(record.id.clone(), record);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let serialized = serde_json::to_vec_pretty(&table)?;
        let temp_path = self
            .path
            .with_extension(format!("json.tmp-{}", uuid::Uuid::new_v4()));
        fs::write(&temp_path, serialized).await?;
        fs::rename(&temp_path, &self.path).await?;

        debug!(path = %self.path.display(), items = table.len(), "Status table written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_table_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStatusStore::new(dir.path(), "status");
        assert!(store.get("SC Emergency Mode").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn writes_survive_reopening_the_table() {
        let dir = TempDir::new().unwrap();
        {
            let store = FileStatusStore::new(dir.path(), "status");
            store
                .put(StatusRecord::new("SC Emergency Mode", true))
                .await
                .unwrap();
            store
                .put(StatusRecord::new("FES Meeting Mode", false))
                .await
                .unwrap();
        }

        let reopened = FileStatusStore::new(dir.path(), "status");
        let emergency = reopened.get("SC Emergency Mode").await.unwrap().unwrap();
        let meeting = reopened.get("FES Meeting Mode").await.unwrap().unwrap();
        assert!(emergency.status);
        assert!(!meeting.status);
    }

    #[tokio::test]
    async fn table_uses_item_field_names() {
        let dir = TempDir::new().unwrap();
        let store = FileStatusStore::new(dir.path(), "status");
        store
            .put(StatusRecord::new("FES Meeting Mode", true))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["FES Meeting Mode"]["id"], "FES Meeting Mode");
        assert_eq!(value["FES Meeting Mode"]["Status"], true);
    }

    #[tokio::test]
    async fn corrupt_table_is_a_serialization_error() {
        let dir = TempDir::new().unwrap();
        let store = FileStatusStore::new(dir.path(), "status");
        std::fs::write(store.path(), b"{not json").unwrap();

        let err = store.get("SC Emergency Mode").await.unwrap_err();
        assert!(matches!(err, StoreBackendError::Serialization(_)));
    }
}
