use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use pagequiz_engine::{KeyValueStore, StorageError};
use pagequiz_logging::quiz_debug;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedState {
    entries: BTreeMap<String, String>,
}

/// Settings persisted as a RON file. Every write replaces the whole file
/// through a temp file so a crash never leaves it half written.
#[derive(Debug, Clone)]
pub struct RonKeyStore {
    path: PathBuf,
}

impl RonKeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl KeyValueStore for RonKeyStore {
    async fn get(&self, entry: &str) -> Result<Option<String>, StorageError> {
        let path = self.path.clone();
        let entry = entry.to_string();
        run_blocking(move || {
            let mut state = read_state(&path).map_err(|message| StorageError::Read {
                entry: entry.clone(),
                message,
            })?;
            Ok(state.entries.remove(&entry))
        })
        .await
    }

    async fn set(&self, entry: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path.clone();
        let entry = entry.to_string();
        let value = value.to_string();
        run_blocking(move || {
            let write_error = |message: String| StorageError::Write {
                entry: entry.clone(),
                message,
            };
            let mut state = read_state(&path).map_err(write_error)?;
            state.entries.insert(entry.clone(), value);
            write_state(&path, &state).map_err(write_error)?;
            quiz_debug!("Persisted {} to {:?}", entry, path);
            Ok(())
        })
        .await
    }
}

async fn run_blocking<T, F>(work: F) -> Result<T, StorageError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| StorageError::Read {
            entry: String::new(),
            message: format!("storage task failed: {err}"),
        })?
}

/// A missing file is an empty state.
fn read_state(path: &Path) -> Result<PersistedState, String> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok(PersistedState::default());
        }
        Err(err) => return Err(format!("reading {:?}: {}", path, err)),
    };
    ron::from_str(&content).map_err(|err| format!("parsing {:?}: {}", path, err))
}

fn write_state(path: &Path, state: &PersistedState) -> Result<(), String> {
    let content = ron::ser::to_string_pretty(state, ron::ser::PrettyConfig::new())
        .map_err(|err| format!("serializing state: {err}"))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    atomic_write(&dir, path, &content).map_err(|err| format!("writing {:?}: {}", path, err))
}

fn atomic_write(dir: &Path, target: &Path, content: &str) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(target).map_err(|err| err.error)?;
    Ok(())
}
