//! In-memory storage implementation.

use super::{Storage, StorageError, StorageResult};
use crate::document::MapDocument;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, MapDocument>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, document: &MapDocument) -> StorageResult<()> {
        let mut docs = self
            .documents
            .write()
            .map_err(|e| StorageError::Other(format!("lock error: {e}")))?;
        docs.insert(id.to_string(), document.clone());
        Ok(())
    }

    fn load(&self, id: &str) -> StorageResult<MapDocument> {
        let docs = self
            .documents
            .read()
            .map_err(|e| StorageError::Other(format!("lock error: {e}")))?;
        docs.get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let mut docs = self
            .documents
            .write()
            .map_err(|e| StorageError::Other(format!("lock error: {e}")))?;
        docs.remove(id);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let docs = self
            .documents
            .read()
            .map_err(|e| StorageError::Other(format!("lock error: {e}")))?;
        Ok(docs.keys().cloned().collect())
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        let docs = self
            .documents
            .read()
            .map_err(|e| StorageError::Other(format!("lock error: {e}")))?;
        Ok(docs.contains_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let doc = MapDocument::new();

        storage.save("test", &doc).unwrap();
        let loaded = storage.load("test").unwrap();
        assert_eq!(doc.id, loaded.id);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = storage.load("nonexistent");
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_delete_and_exists() {
        let storage = MemoryStorage::new();
        let doc = MapDocument::new();

        assert!(!storage.exists("test").unwrap());
        storage.save("test", &doc).unwrap();
        assert!(storage.exists("test").unwrap());
        storage.delete("test").unwrap();
        assert!(!storage.exists("test").unwrap());
    }

    #[test]
    fn test_list() {
        let storage = MemoryStorage::new();
        let doc = MapDocument::new();

        storage.save("doc1", &doc).unwrap();
        storage.save("doc2", &doc).unwrap();

        let list = storage.list().unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&"doc1".to_string()));
        assert!(list.contains(&"doc2".to_string()));
    }
}
