//! Storage abstraction for persistence.
//!
//! The engine itself performs no I/O; documents cross this boundary in
//! their flat serialized form (node records plus root id) and child order
//! is rebuilt on load.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::document::MapDocument;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for document storage backends.
///
/// Implementations can keep documents in memory, on the filesystem, or
/// behind a remote service.
pub trait Storage: Send + Sync {
    /// Save a document.
    fn save(&self, id: &str, document: &MapDocument) -> StorageResult<()>;

    /// Load a document.
    fn load(&self, id: &str) -> StorageResult<MapDocument>;

    /// Delete a document.
    fn delete(&self, id: &str) -> StorageResult<()>;

    /// List all document IDs.
    fn list(&self) -> StorageResult<Vec<String>>;

    /// Check if a document exists.
    fn exists(&self, id: &str) -> StorageResult<bool>;
}
