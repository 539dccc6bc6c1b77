//! File-based document storage.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::canvas::CanvasDocument;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Stores each document as `<id>.json` in one directory.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Open storage in `base_path`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Directory used when none is configured, under the platform's local
    /// data directory (or the home directory).
    pub fn default_path() -> StorageResult<PathBuf> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Ok(base.join("ravelock").join("canvases"))
    }

    /// Open storage in [`FileStorage::default_path`].
    pub fn default_location() -> StorageResult<Self> {
        Self::new(Self::default_path()?)
    }

    fn document_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_id))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for FileStorage {
    fn save(&self, document: &CanvasDocument) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.document_path(&document.id);
        let json = document.to_json();
        Box::pin(async move {
            let json = json.map_err(|e| StorageError::Serialization(e.to_string()))?;
            // write beside the target and rename, so a failed save keeps the old file
            let tmp = path.with_extension("json.tmp");
            fs::write(&tmp, json)
                .and_then(|()| fs::rename(&tmp, &path))
                .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
            debug!("saved canvas to {}", path.display());
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<CanvasDocument>> {
        let path = self.document_path(id);
        let id = id.to_string();
        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(id));
            }
            let json = fs::read_to_string(&path)
                .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
            CanvasDocument::from_json(&json).map_err(|e| {
                StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
            })
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.document_path(id);
        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();
        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }
            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            let mut ids: Vec<String> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|e| e == "json"))
                .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
                .collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.document_path(id);
        Box::pin(async move { Ok(path.exists()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::{HandleLockInfo, LockPolicy};
    use crate::ravel::Ravel;
    use pollster::block_on;
    use tempfile::tempdir;

    fn locked_pair() -> CanvasDocument {
        let mut doc = CanvasDocument::new();
        let a = doc.add_ravel(Ravel::new().with_handle("time", ["t0", "t1"]).unwrap());
        let b = doc.add_ravel(Ravel::new().with_handle("time", ["t0", "t1"]).unwrap());
        doc.lock_ravels(&[a, b]).unwrap();
        doc
    }

    #[test]
    fn test_file_storage_save_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let mut doc = locked_pair();
        doc.name = "Quarterly".to_string();

        block_on(storage.save(&doc)).unwrap();
        let loaded = block_on(storage.load(&doc.id)).unwrap();
        assert_eq!(loaded.name, "Quarterly");
        assert_eq!(loaded.lock_groups, doc.lock_groups);
        assert!(!dir.path().join(format!("{}.json.tmp", doc.id)).exists());
    }

    #[test]
    fn test_file_storage_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_list_and_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested")).unwrap();
        let mut doc = CanvasDocument::new();
        for id in ["doc2", "doc1"] {
            doc.id = id.to_string();
            block_on(storage.save(&doc)).unwrap();
        }
        fs::write(storage.base_path().join("notes.txt"), "x").unwrap();

        assert_eq!(block_on(storage.list()).unwrap(), vec!["doc1", "doc2"]);
        block_on(storage.delete("doc1")).unwrap();
        assert!(!block_on(storage.exists("doc1")).unwrap());
        assert_eq!(block_on(storage.list()).unwrap(), vec!["doc2"]);
    }

    #[test]
    fn test_file_storage_sanitizes_id() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let mut doc = CanvasDocument::new();
        doc.id = "test/doc:with*special".to_string();

        block_on(storage.save(&doc)).unwrap();
        assert!(dir.path().join("test_doc_with_special.json").exists());
        let loaded = block_on(storage.load("test/doc:with*special")).unwrap();
        assert_eq!(loaded.id, doc.id);
    }

    #[test]
    fn test_inconsistent_lock_rows_still_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let mut doc = locked_pair();
        let gid = *doc.lock_groups.keys().next().unwrap();

        // a short row, as a hand-edited file might contain
        let mut json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        json["lock_groups"][gid.to_string()]["lock_info"] = serde_json::json!([
            { "handle_names": ["time"], "slicer": true, "orientation": true, "calipers": true, "order": true }
        ]);
        doc = serde_json::from_value(json).unwrap();
        block_on(storage.save(&doc)).unwrap();

        let mut loaded = block_on(storage.load(&doc.id)).unwrap();
        assert!(loaded.validate().is_err());
        loaded
            .set_lock_info(gid, vec![HandleLockInfo::from_names(["time", "time"], LockPolicy::ALL)])
            .unwrap();
        assert!(loaded.validate().is_ok());
    }
}
