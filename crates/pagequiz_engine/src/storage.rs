use std::collections::HashMap;

use tokio::sync::Mutex;

/// Entry under which the provider credential is persisted.
pub const API_KEY_ENTRY: &str = "apiKey";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read {entry}: {message}")]
    Read { entry: String, message: String },
    #[error("failed to write {entry}: {message}")]
    Write { entry: String, message: String },
}

/// Durable string settings that outlive the process.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, entry: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, entry: &str, value: &str) -> Result<(), StorageError>;
}

/// Process-local store, used when nothing needs to survive a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(entry: &str, value: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(entry.to_string(), value.to_string());
        Self {
            entries: Mutex::new(entries),
        }
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, entry: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().await.get(entry).cloned())
    }

    async fn set(&self, entry: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .await
            .insert(entry.to_string(), value.to_string());
        Ok(())
    }
}
