//! Error types shared by the core modules

use thiserror::Error;

/// Failure of the key-value persistence medium
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for key `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage quota exceeded writing `{key}` ({needed} bytes needed, {available} available)")]
    QuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },

    #[error("invalid storage key `{0}`")]
    InvalidKey(String),
}

/// Failure of the document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("document collection is corrupted: {0}")]
    Corrupted(#[source] serde_json::Error),

    #[error("failed to serialize document collection: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl StoreError {
    /// Short message suitable for a toast
    pub fn user_message(&self) -> &'static str {
        match self {
            StoreError::Storage(StorageError::QuotaExceeded { .. }) => {
                "Depolama alanı dolu, belge kaydedilemedi."
            }
            StoreError::Storage(_) => "Depolama alanına erişilemedi.",
            StoreError::Corrupted(_) => "Kayıtlı belgeler okunamadı.",
            StoreError::Serialize(_) => "Belge kaydedilemedi.",
        }
    }
}

/// Outcome of an asynchronous task that did not produce a value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("task was cancelled")]
    Cancelled,

    #[error("task failed: {0}")]
    Failed(String),

    #[error("task runtime shut down before completion")]
    Dropped,
}
