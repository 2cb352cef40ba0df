//! Generic Repository - CRUD over a document store
//!
//! One repository serves one entity type in one index. The entity-specific
//! parts (name, mapping tag, key, document mapping) come from an
//! [`EntityMapper`]; everything else lives here.

use dao_domain::{
    DocumentKey, DocumentStore, EntityMapper, StoreError, WriteMode, WriteResult,
};
use tracing::{debug, info, warn};

use crate::error::{Operation, RepositoryError, Result};

/// Generic Repository
///
/// Holds the mapper, the index name and a store handle; none of them change
/// after construction. The index is guaranteed to exist once `new` returns.
#[derive(Debug)]
pub struct GenericRepository<M, S> {
    mapper: M,
    index: String,
    store: S,
}

impl<M, S> GenericRepository<M, S>
where
    M: EntityMapper,
    S: DocumentStore,
{
    /// Create a repository, creating `index` if it does not exist yet
    pub fn new(mapper: M, index: impl Into<String>, store: S) -> Result<Self> {
        let repository = Self {
            mapper,
            index: index.into(),
            store,
        };
        repository.ensure_index()?;
        Ok(repository)
    }

    fn ensure_index(&self) -> Result<()> {
        let provisioning = |source: StoreError| RepositoryError::IndexProvisioning {
            index: self.index.clone(),
            source,
        };

        let store = self.connection();
        if !store.index_exists(&self.index).map_err(provisioning)? {
            store.create_index(&self.index).map_err(provisioning)?;
            info!(index = %self.index, "Created index");
        }
        Ok(())
    }

    /// Store handle for the duration of one operation
    fn connection(&self) -> &S {
        &self.store
    }

    fn key(&self, bean: &M::Entity) -> DocumentKey {
        self.mapper.document_key(bean)
    }

    fn mapping(&self) -> &str {
        self.mapper.mapping()
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Load every entity stored in the index
    ///
    /// Documents written under another mapping tag are skipped, so one
    /// index can hold several entity types.
    pub fn select_all(&self) -> Result<Vec<M::Entity>> {
        debug!(index = %self.index, "select_all");
        let documents = self
            .connection()
            .search(&self.index, self.mapping())
            .map_err(RepositoryError::engine(Operation::SelectAll))?;

        documents
            .iter()
            .map(|document| {
                self.mapper
                    .from_document(document)
                    .map_err(|source| RepositoryError::Mapping {
                        location: format!("{}/_search", self.index),
                        source,
                    })
            })
            .collect()
    }

    /// Load the entity whose key fields are set in `bean`
    ///
    /// Returns `Ok(None)` when no document is stored under the key.
    pub fn select(&self, bean: &M::Entity) -> Result<Option<M::Entity>> {
        let key = self.key(bean);
        debug!(index = %self.index, key = %key, "select");

        let found = self
            .connection()
            .get(&self.index, self.mapping(), &key)
            .map_err(RepositoryError::engine(Operation::Select))?;

        match found {
            Some(document) => self
                .mapper
                .from_document(&document)
                .map(Some)
                .map_err(|source| RepositoryError::Mapping {
                    location: format!("{}/{}", self.index, key),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Store a new entity
    ///
    /// Fails with [`RepositoryError::DuplicateKey`] if the key is taken,
    /// whether that is seen by the existence check or by the engine's
    /// create-only write.
    pub fn insert(&self, bean: &M::Entity) -> Result<WriteResult> {
        let store = self.connection();
        let key = self.key(bean);
        debug!(index = %self.index, key = %key, "insert");

        if store
            .exists(&self.index, self.mapping(), &key)
            .map_err(RepositoryError::engine(Operation::Insert))?
        {
            warn!(index = %self.index, key = %key, "Rejected insert of existing key");
            return Err(RepositoryError::DuplicateKey {
                key: key.to_string(),
            });
        }

        let document = self.mapper.to_document(bean);
        match store.put(
            &self.index,
            self.mapping(),
            &key,
            &document,
            WriteMode::CreateOnly,
        ) {
            Ok(result) => Ok(result),
            Err(StoreError::Conflict { .. }) => {
                warn!(index = %self.index, key = %key, "Key created concurrently");
                Err(RepositoryError::DuplicateKey {
                    key: key.to_string(),
                })
            }
            Err(e) => Err(RepositoryError::engine(Operation::Insert)(e)),
        }
    }

    /// Merge the entity's fields into its stored document
    pub fn update(&self, bean: &M::Entity) -> Result<WriteResult> {
        let key = self.key(bean);
        debug!(index = %self.index, key = %key, "update");

        let partial = self.mapper.to_document(bean);
        self.connection()
            .update(&self.index, self.mapping(), &key, &partial)
            .map_err(RepositoryError::engine(Operation::Update))
    }

    /// Remove the entity's document
    pub fn delete(&self, bean: &M::Entity) -> Result<WriteResult> {
        let key = self.key(bean);
        debug!(index = %self.index, key = %key, "delete");

        self.connection()
            .delete(&self.index, self.mapping(), &key)
            .map_err(RepositoryError::engine(Operation::Delete))
    }

    pub fn exists(&self, bean: &M::Entity) -> Result<bool> {
        let key = self.key(bean);
        debug!(index = %self.index, key = %key, "exists");

        self.connection()
            .exists(&self.index, self.mapping(), &key)
            .map_err(RepositoryError::engine(Operation::Exists))
    }

    /// Number of documents of this entity type in the index
    pub fn count_all(&self) -> Result<u64> {
        debug!(index = %self.index, "count_all");

        self.connection()
            .count(&self.index, self.mapping())
            .map_err(RepositoryError::engine(Operation::CountAll))
    }
}
