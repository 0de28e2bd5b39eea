//! Payment state persistence.
//!
//! The store holds at most one record: the last unlocked payment. Reads
//! never fail; a missing or corrupt file is the same as no record. Writes
//! only accept unlocked records, so a stored unlock is never reverted.
//!
//! Store calls block; async callers run them on the blocking pool.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

use crate::payments::types::PaymentState;

/// Errors raised when persisting payment state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write payment state to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize payment state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("refusing to persist a payment that is not unlocked (txid {0})")]
    NotUnlocked(String),

    #[error("payment state write timed out after {0} ms")]
    Timeout(u64),

    #[error("payment state task failed: {0}")]
    Task(String),
}

/// Durable record of the last unlocked payment.
pub trait PaymentStateStore: Send + Sync {
    /// The persisted record, or `None` if absent or unreadable.
    fn load(&self) -> Option<PaymentState>;

    /// Overwrite the persisted record.
    fn save(&self, state: &PaymentState) -> Result<(), StorageError>;
}

fn ensure_unlocked(state: &PaymentState) -> Result<(), StorageError> {
    if state.is_unlocked {
        Ok(())
    } else {
        Err(StorageError::NotUnlocked(state.txid.clone()))
    }
}

/// JSON file store with write-then-rename replacement.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "payment_state.json".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4().simple()))
    }
}

impl PaymentStateStore for JsonFileStore {
    fn load(&self) -> Option<PaymentState> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read payment state");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unparsable payment state");
                None
            }
        }
    }

    fn save(&self, state: &PaymentState) -> Result<(), StorageError> {
        ensure_unlocked(state)?;
        let json = serde_json::to_string_pretty(state)?;

        let tmp = self.temp_path();
        let write_err = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };

        if let Err(e) = fs::write(&tmp, json.as_bytes()) {
            let _ = fs::remove_file(&tmp);
            return Err(write_err(e));
        }
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(write_err(e));
        }

        tracing::debug!(path = %self.path.display(), txid = %state.txid, "Saved payment state");
        Ok(())
    }
}

/// In-process store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Option<PaymentState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PaymentState) -> Self {
        Self {
            inner: Mutex::new(Some(state)),
        }
    }
}

impl PaymentStateStore for MemoryStore {
    fn load(&self) -> Option<PaymentState> {
        self.inner.lock().ok().and_then(|guard| guard.clone())
    }

    fn save(&self, state: &PaymentState) -> Result<(), StorageError> {
        ensure_unlocked(state)?;
        match self.inner.lock() {
            Ok(mut guard) => *guard = Some(state.clone()),
            Err(poisoned) => *poisoned.into_inner() = Some(state.clone()),
        }
        Ok(())
    }
}
