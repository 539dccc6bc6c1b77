//! In-memory document storage.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::canvas::CanvasDocument;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Documents held in memory, serialized so that loading gives an
/// independent copy that went through the same checks as a file.
#[derive(Default)]
pub struct MemoryStorage {
    documents: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, document: &CanvasDocument) -> BoxFuture<'_, StorageResult<()>> {
        let id = document.id.clone();
        let json = document.to_json();
        Box::pin(async move {
            let json = json.map_err(|e| StorageError::Serialization(e.to_string()))?;
            self.documents.write().map_err(poisoned)?.insert(id, json);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<CanvasDocument>> {
        let id = id.to_string();
        Box::pin(async move {
            let docs = self.documents.read().map_err(poisoned)?;
            let json = docs.get(&id).ok_or_else(|| StorageError::NotFound(id.clone()))?;
            CanvasDocument::from_json(json).map_err(|e| StorageError::Serialization(e.to_string()))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.documents.write().map_err(poisoned)?.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let docs = self.documents.read().map_err(poisoned)?;
            Ok(docs.keys().cloned().collect())
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.documents.read().map_err(poisoned)?.contains_key(&id)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ravel::Ravel;
    use pollster::block_on;

    #[test]
    fn test_save_and_load_keeps_lock_groups() {
        let storage = MemoryStorage::new();
        let mut doc = CanvasDocument::new();
        let a = doc.add_ravel(Ravel::new().with_handle("time", ["t0", "t1"]).unwrap());
        let b = doc.add_ravel(Ravel::new().with_handle("time", ["t0", "t1"]).unwrap());
        let group = doc.lock_ravels(&[a, b]).unwrap();

        block_on(storage.save(&doc)).unwrap();
        let mut loaded = block_on(storage.load(&doc.id)).unwrap();
        assert_eq!(loaded.lock_group(group), doc.lock_group(group));

        // the stored copy is independent of the loaded one
        loaded.adjust_slicer(a, "time", 1).unwrap();
        let again = block_on(storage.load(&doc.id)).unwrap();
        assert_eq!(again.ravel(b).unwrap().handle_state("time").unwrap().slice_label, "t0");
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_exists_and_delete() {
        let storage = MemoryStorage::new();
        let doc = CanvasDocument::new();

        assert!(!block_on(storage.exists(&doc.id)).unwrap());
        block_on(storage.save(&doc)).unwrap();
        assert!(block_on(storage.exists(&doc.id)).unwrap());
        block_on(storage.delete(&doc.id)).unwrap();
        assert!(!block_on(storage.exists(&doc.id)).unwrap());
        block_on(storage.delete(&doc.id)).unwrap();
    }

    #[test]
    fn test_list_sorted() {
        let storage = MemoryStorage::new();
        let mut first = CanvasDocument::new();
        first.id = "b".to_string();
        let mut second = CanvasDocument::new();
        second.id = "a".to_string();

        block_on(storage.save(&first)).unwrap();
        block_on(storage.save(&second)).unwrap();
        assert_eq!(block_on(storage.list()).unwrap(), vec!["a", "b"]);
    }
}
