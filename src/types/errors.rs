use serde::{Deserialize, Serialize};
use thiserror::Error;

// === NavigationError ===

/// Errors reported by the host when asked to navigate a tab.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// The tab no longer exists (closed before the redirect landed).
    #[error("Tab not found: {0}")]
    TabNotFound(i64),
    /// The host refused or failed the navigation.
    #[error("Navigation rejected: {0}")]
    Rejected(String),
}

// === StorageError ===

/// Coarse classification of a storage failure.
///
/// Travels on Stats Store Protocol responses so a requester can tell a
/// missing record apart from a failed read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageErrorKind {
    Read,
    Write,
    Corrupt,
}

/// Errors related to the persistent key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading a key failed.
    #[error("Storage read failed: {0}")]
    Read(String),
    /// Writing a key failed.
    #[error("Storage write failed: {0}")]
    Write(String),
    /// The stored value could not be decoded.
    #[error("Stored value is corrupt: {0}")]
    Corrupt(String),
}

impl StorageError {
    pub fn kind(&self) -> StorageErrorKind {
        match self {
            StorageError::Read(_) => StorageErrorKind::Read,
            StorageError::Write(_) => StorageErrorKind::Write,
            StorageError::Corrupt(_) => StorageErrorKind::Corrupt,
        }
    }
}

// === MessagingError ===

/// Errors on the foreground side of the Stats Store Protocol.
#[derive(Debug, Error)]
pub enum MessagingError {
    /// The background service is no longer accepting messages.
    #[error("Stats service is closed")]
    ServiceClosed,
    /// The service dropped the reply channel without answering.
    #[error("Stats service dropped the reply")]
    ReplyDropped,
    /// The reply did not match the request kind.
    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),
}

// === SettingsError ===

/// Errors related to loading, saving, or editing extension settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// File system I/O failed.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// JSON (de)serialization failed.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The dot-path key does not name a setting.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The value does not fit the setting's type.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

// === AppError ===

/// Startup failures of the background process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("Failed to open database: {0}")]
    Database(String),
}
