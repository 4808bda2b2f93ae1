//! File-based storage: one JSON document per file.

use super::{Storage, StorageError, StorageResult};
use crate::document::MapDocument;
use std::fs;
use std::path::PathBuf;

/// Stores documents as JSON files in a directory.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at `base_path`, creating the directory
    /// if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("failed to create storage directory: {e}"))
            })?;
        }
        Ok(Self { base_path })
    }

    /// The directory documents are stored in.
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    /// Sanitized path for a document id.
    fn document_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{safe_id}.json"))
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, document: &MapDocument) -> StorageResult<()> {
        let path = self.document_path(id);
        let json = document
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&path, json)
            .map_err(|e| StorageError::Io(format!("failed to write {}: {e}", path.display())))
    }

    fn load(&self, id: &str) -> StorageResult<MapDocument> {
        let path = self.document_path(id);
        if !path.exists() {
            return Err(StorageError::NotFound(id.to_string()));
        }
        let json = fs::read_to_string(&path)
            .map_err(|e| StorageError::Io(format!("failed to read {}: {e}", path.display())))?;
        MapDocument::from_json(&json).map_err(|e| {
            StorageError::Serialization(format!("failed to parse {}: {e}", path.display()))
        })
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let path = self.document_path(id);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                StorageError::Io(format!("failed to delete {}: {e}", path.display()))
            })?;
        }
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }
        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("failed to read directory: {e}")))?;

        let mut ids = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                if let Some(name) = path.file_stem().and_then(|n| n.to_str()) {
                    ids.push(name.to_string());
                }
            }
        }
        Ok(ids)
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        Ok(self.document_path(id).exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Editor;
    use tempfile::tempdir;

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let mut editor = Editor::new();
        let root = editor.create_node(None, "Root", None).unwrap();
        let a = editor.create_node(Some(root), "A", None).unwrap();
        editor.create_node(Some(root), "B", None).unwrap();

        storage.save("map", editor.document()).unwrap();
        let loaded = storage.load("map").unwrap();

        assert_eq!(loaded.root(), Some(root));
        assert_eq!(loaded.children(root).len(), 2);
        assert_eq!(loaded.children(root)[0], a);
        assert!(loaded.is_consistent());
    }

    #[test]
    fn test_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let result = storage.load("nonexistent");
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_list_and_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let doc = MapDocument::new();

        storage.save("doc1", &doc).unwrap();
        storage.save("doc2", &doc).unwrap();
        let list = storage.list().unwrap();
        assert_eq!(list.len(), 2);

        storage.delete("doc1").unwrap();
        assert!(!storage.exists("doc1").unwrap());
        assert!(storage.exists("doc2").unwrap());
    }

    #[test]
    fn test_sanitizes_id() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let doc = MapDocument::new();
        storage.save("maps/2026:draft*1", &doc).unwrap();
        let loaded = storage.load("maps/2026:draft*1").unwrap();
        assert_eq!(loaded.id, doc.id);
    }
}
