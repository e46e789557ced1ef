//! Key-value persistence
//!
//! The core talks to storage only through [`KeyValueStore`], injected at
//! construction:
//! - [`MemoryStore`]: in-memory, for tests and as a fallback
//! - [`JsonFileStore`]: one JSON document on disk, rewritten on every put
//!
//! Absent keys read as the caller's default. Write failures are logged and
//! swallowed; losing progression is acceptable, crashing is not.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("store document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Platform key-value store. Each put is an independent durable write.
pub trait KeyValueStore {
    fn get_int(&self, key: &str, default: i32) -> i32;
    fn get_bool(&self, key: &str, default: bool) -> bool;
    fn put_int(&mut self, key: &str, value: i32);
    fn put_bool(&mut self, key: &str, value: bool);
}

/// Stored values, shared by both implementations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    ints: BTreeMap<String, i32>,
    #[serde(default)]
    bools: BTreeMap<String, bool>,
}

/// Volatile store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    doc: Document,
    /// Number of puts issued, for write-batching checks
    pub writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_int(&self, key: &str, default: i32) -> i32 {
        self.doc.ints.get(key).copied().unwrap_or(default)
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.doc.bools.get(key).copied().unwrap_or(default)
    }

    fn put_int(&mut self, key: &str, value: i32) {
        self.doc.ints.insert(key.to_owned(), value);
        self.writes += 1;
    }

    fn put_bool(&mut self, key: &str, value: bool) {
        self.doc.bools.insert(key.to_owned(), value);
        self.writes += 1;
    }
}

/// Store backed by a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    doc: Document,
}

impl JsonFileStore {
    /// Open `path`; a missing file is an empty store
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let doc = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Document::default(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self { path, doc })
    }

    /// Open `path`, starting empty if it is unreadable or corrupt
    pub fn open_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::open(path).unwrap_or_else(|e| {
            log::warn!("progression store unavailable, starting fresh: {e}");
            Self {
                path: path.to_path_buf(),
                doc: Document::default(),
            }
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the whole document via a temp file and rename
    fn write(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.doc)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn persist(&self, key: &str) {
        if let Err(e) = self.write() {
            log::warn!("failed to persist {key}: {e}");
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_int(&self, key: &str, default: i32) -> i32 {
        self.doc.ints.get(key).copied().unwrap_or(default)
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.doc.bools.get(key).copied().unwrap_or(default)
    }

    fn put_int(&mut self, key: &str, value: i32) {
        self.doc.ints.insert(key.to_owned(), value);
        self.persist(key);
    }

    fn put_bool(&mut self, key: &str, value: bool) {
        self.doc.bools.insert(key.to_owned(), value);
        self.persist(key);
    }
}
