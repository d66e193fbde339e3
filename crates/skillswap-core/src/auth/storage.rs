//! Durable key/value storage for session state.
//!
//! All backends keep every key in one document so a multi-key write either
//! lands completely or not at all.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use keyring::Entry;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// Keychain service name
const SERVICE_NAME: &str = "skillswap";

/// Keychain account holding the session document
const KEYRING_ACCOUNT: &str = "session";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt storage document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),
}

type Document = BTreeMap<String, String>;

/// String key/value storage that survives restarts.
pub trait DurableStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write every entry or none of them.
    fn put_all(&self, entries: &[(&str, String)]) -> Result<(), StorageError>;

    /// Remove the given keys. Missing keys are not an error.
    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError>;
}

// ============================================================================
// File
// ============================================================================

/// JSON document on disk, replaced by rename on every write.
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(SESSION_FILE),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read(&self) -> Result<Document, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Document::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::new()),
            Err(e) => Err(self.io_err(e)),
        }
    }

    fn write(&self, doc: &Document) -> Result<(), StorageError> {
        if doc.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(self.io_err(e)),
            };
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let contents = serde_json::to_string_pretty(doc)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).map_err(|e| self.io_err(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))?;
        debug!(path = ?self.path, keys = doc.len(), "Session document written");
        Ok(())
    }

    /// Current document for a write. A corrupt document is discarded so
    /// the write can replace it.
    fn read_for_update(&self) -> Result<(Document, bool), StorageError> {
        match self.read() {
            Ok(doc) => Ok((doc, false)),
            Err(StorageError::Parse(e)) => {
                warn!(path = ?self.path, error = %e, "Discarding corrupt session document");
                Ok((Document::new(), true))
            }
            Err(e) => Err(e),
        }
    }
}

impl DurableStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock();
        Ok(self.read()?.get(key).cloned())
    }

    fn put_all(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let (mut doc, _) = self.read_for_update()?;
        for (key, value) in entries {
            doc.insert((*key).to_string(), value.clone());
        }
        self.write(&doc)
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let (mut doc, corrupt) = self.read_for_update()?;
        let before = doc.len();
        for key in keys {
            doc.remove(*key);
        }
        if !corrupt && doc.len() == before {
            return Ok(());
        }
        self.write(&doc)
    }
}

// ============================================================================
// Keyring
// ============================================================================

/// The same document, kept as a single OS keychain secret.
pub struct KeyringStorage {
    account: String,
    lock: Mutex<()>,
}

impl KeyringStorage {
    pub fn new() -> Self {
        Self::with_account(KEYRING_ACCOUNT)
    }

    pub fn with_account(account: &str) -> Self {
        Self {
            account: account.to_string(),
            lock: Mutex::new(()),
        }
    }

    fn entry(&self) -> Result<Entry, StorageError> {
        Ok(Entry::new(SERVICE_NAME, &self.account)?)
    }

    fn read(&self) -> Result<Document, StorageError> {
        match self.entry()?.get_password() {
            Ok(secret) => Ok(serde_json::from_str(&secret)?),
            Err(keyring::Error::NoEntry) => Ok(Document::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn read_for_update(&self) -> Result<Document, StorageError> {
        match self.read() {
            Err(StorageError::Parse(e)) => {
                warn!(error = %e, "Discarding corrupt keychain session document");
                Ok(Document::new())
            }
            other => other,
        }
    }

    fn write(&self, doc: &Document) -> Result<(), StorageError> {
        let entry = self.entry()?;
        if doc.is_empty() {
            return match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(e.into()),
            };
        }
        entry.set_password(&serde_json::to_string(doc)?)?;
        Ok(())
    }
}

impl Default for KeyringStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl DurableStorage for KeyringStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock();
        Ok(self.read()?.get(key).cloned())
    }

    fn put_all(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut doc = self.read_for_update()?;
        for (key, value) in entries {
            doc.insert((*key).to_string(), value.clone());
        }
        self.write(&doc)
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut doc = self.read_for_update()?;
        for key in keys {
            doc.remove(*key);
        }
        self.write(&doc)
    }
}

// ============================================================================
// Memory
// ============================================================================

/// Process-local storage. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStorage {
    doc: Mutex<Document>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.doc.lock().get(key).cloned())
    }

    fn put_all(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        let mut doc = self.doc.lock();
        for (key, value) in entries {
            doc.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut doc = self.doc.lock();
        for key in keys {
            doc.remove(*key);
        }
        Ok(())
    }
}
