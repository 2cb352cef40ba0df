//! In-Memory Document Store
//!
//! A process-local stand-in for the search engine, following the engine's
//! observable behaviour: ids are unique per index whatever their mapping,
//! reads and deletes on an unknown index fail, writes create the index.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dao_domain::{Document, DocumentKey, DocumentStore, StoreError, WriteMode, WriteResult};

#[derive(Debug, Clone)]
struct StoredDocument {
    mapping: String,
    document: Document,
}

type Index = BTreeMap<DocumentKey, StoredDocument>;

/// In-memory Document Store
///
/// Thread-safe implementation using RwLock. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    indices: Arc<RwLock<HashMap<String, Index>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            indices: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Names of all existing indices, sorted
    pub fn index_names(&self) -> Result<Vec<String>, StoreError> {
        let indices = self.read()?;
        let mut names: Vec<String> = indices.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Index>>, StoreError> {
        self.indices.read().map_err(|_| StoreError::PersistenceError {
            message: "Failed to acquire read lock".to_string(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Index>>, StoreError> {
        self.indices.write().map_err(|_| StoreError::PersistenceError {
            message: "Failed to acquire write lock".to_string(),
        })
    }
}

fn index_not_found(index: &str) -> StoreError {
    StoreError::IndexNotFound {
        index: index.to_string(),
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn index_exists(&self, index: &str) -> Result<bool, StoreError> {
        Ok(self.read()?.contains_key(index))
    }

    fn create_index(&self, index: &str) -> Result<(), StoreError> {
        self.write()?.entry(index.to_string()).or_default();
        Ok(())
    }

    fn get(
        &self,
        index: &str,
        mapping: &str,
        key: &DocumentKey,
    ) -> Result<Option<Document>, StoreError> {
        let indices = self.read()?;
        let docs = indices.get(index).ok_or_else(|| index_not_found(index))?;
        Ok(docs
            .get(key)
            .filter(|stored| stored.mapping == mapping)
            .map(|stored| stored.document.clone()))
    }

    fn put(
        &self,
        index: &str,
        mapping: &str,
        key: &DocumentKey,
        document: &Document,
        mode: WriteMode,
    ) -> Result<WriteResult, StoreError> {
        let mut indices = self.write()?;
        let docs = indices.entry(index.to_string()).or_default();

        let existed = docs.contains_key(key);
        if existed && mode == WriteMode::CreateOnly {
            return Err(StoreError::Conflict {
                key: key.to_string(),
            });
        }

        docs.insert(
            key.clone(),
            StoredDocument {
                mapping: mapping.to_string(),
                document: document.clone(),
            },
        );
        Ok(if existed {
            WriteResult::Updated
        } else {
            WriteResult::Created
        })
    }

    fn update(
        &self,
        index: &str,
        mapping: &str,
        key: &DocumentKey,
        partial: &Document,
    ) -> Result<WriteResult, StoreError> {
        let mut indices = self.write()?;
        let docs = indices.get_mut(index).ok_or_else(|| index_not_found(index))?;

        match docs.get_mut(key) {
            Some(stored) => {
                stored.mapping = mapping.to_string();
                stored.document.merge(partial);
                Ok(WriteResult::Updated)
            }
            None => Ok(WriteResult::NotFound),
        }
    }

    fn delete(
        &self,
        index: &str,
        _mapping: &str,
        key: &DocumentKey,
    ) -> Result<WriteResult, StoreError> {
        let mut indices = self.write()?;
        let docs = indices.get_mut(index).ok_or_else(|| index_not_found(index))?;

        Ok(match docs.remove(key) {
            Some(_) => WriteResult::Deleted,
            None => WriteResult::NotFound,
        })
    }

    fn search(&self, index: &str, mapping: &str) -> Result<Vec<Document>, StoreError> {
        let indices = self.read()?;
        let docs = indices.get(index).ok_or_else(|| index_not_found(index))?;
        Ok(docs
            .values()
            .filter(|stored| stored.mapping == mapping)
            .map(|stored| stored.document.clone())
            .collect())
    }

    fn count(&self, index: &str, mapping: &str) -> Result<u64, StoreError> {
        let indices = self.read()?;
        let docs = indices.get(index).ok_or_else(|| index_not_found(index))?;
        Ok(docs.values().filter(|stored| stored.mapping == mapping).count() as u64)
    }
}
