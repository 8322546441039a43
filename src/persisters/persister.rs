use std::{error::Error, fmt};

use async_trait::async_trait;

/// Key-value storage the ticket collections are written to.
///
/// Values are opaque strings; the store keeps one serialized collection per key.
#[async_trait]
pub trait KeyValuePersister {
    /// Returns `None` when the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>, PersistError>;
    async fn set(&self, key: &str, value: String) -> Result<(), PersistError>;
    /// Writes every entry or none of them.
    async fn set_many(&self, entries: Vec<(String, String)>) -> Result<(), PersistError>;
}

#[derive(Debug)]
pub enum PersistError {
    Io(String, String),
    Serialization(serde_json::Error),
    Unavailable(String),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(e, operation) => write!(f, "Failed to persist: {operation} {e}"),
            Self::Serialization(e) => write!(f, "Failed to persist: Serialization {e}"),
            Self::Unavailable(key) => write!(f, "Failed to persist: Unavailable {key}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(value: serde_json::Error) -> Self {
        PersistError::Serialization(value)
    }
}
