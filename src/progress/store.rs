//! Local persistence for the progression state
//!
//! The state lives as one JSON blob under one key of a key-value store.
//! Reading never fails the caller: a missing or broken blob yields defaults,
//! and write failures are logged while the in-memory state stays authoritative.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

use super::error::ProgressError;
use super::state::{ProgressionState, Salvaged};

/// Key the state blob is stored under
pub const DEFAULT_STATE_KEY: &str = "drp_gamification";

/// Minimal string key-value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, ProgressError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), ProgressError>;
}

/// In-process store (tests, sandboxed contexts)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), value.to_string());
        Self { entries }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ProgressError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ProgressError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ProgressError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ProgressError::StorageUnavailable(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ProgressError> {
        let path = self.path_for(key);
        write_atomic(&path, value).map_err(|e| {
            ProgressError::StorageUnavailable(format!("{}: {}", path.display(), e))
        })
    }
}

/// Write a file atomically (temp file + rename) under an exclusive lock file.
pub(crate) fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut lock_name = path.as_os_str().to_owned();
    lock_name.push(".lock");
    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(PathBuf::from(lock_name))?;
    lock_file.lock_exclusive()?;

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.sync_all()?;

    std::fs::rename(&temp_path, path)?;

    // Lock released when lock_file is dropped
    Ok(())
}

/// Reads and writes the state blob
pub struct StatePersistence {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl StatePersistence {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self::with_key(store, DEFAULT_STATE_KEY)
    }

    pub fn with_key(store: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Load the stored state, falling back to defaults on any problem
    pub fn load(&self) -> ProgressionState {
        match self.try_load() {
            Ok(Some(Salvaged { state, discarded })) => {
                if !discarded.is_empty() {
                    warn!(
                        "[progress:store] Discarded unreadable fields {:?} from '{}'",
                        discarded, self.key
                    );
                }
                state
            }
            Ok(None) => {
                debug!("[progress:store] No stored state under '{}'", self.key);
                ProgressionState::default()
            }
            Err(e) => {
                warn!("[progress:store] Starting from defaults: {}", e);
                ProgressionState::default()
            }
        }
    }

    /// Load without swallowing errors
    pub fn try_load(&self) -> Result<Option<Salvaged>, ProgressError> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(None);
        };
        ProgressionState::from_json(&raw).map(Some)
    }

    /// Persist the state; failures are logged only
    pub fn save(&mut self, state: &ProgressionState) {
        if let Err(e) = self.try_save(state) {
            warn!("[progress:store] Keeping state in memory only: {}", e);
        }
    }

    pub fn try_save(&mut self, state: &ProgressionState) -> Result<(), ProgressError> {
        let json = state.to_json()?;
        self.store.set(&self.key, &json)
    }
}
