//! Typed repository over a `DocumentStore`

use std::marker::PhantomData;

use super::{DocumentStore, Filter, StoreError, LIST_LIMIT};
use crate::models::Document;

/// Typed access to the collection holding `T`.
pub struct Repository<'a, T> {
    store: &'a dyn DocumentStore,
    _record: PhantomData<fn() -> T>,
}

impl<'a, T: Document> Repository<'a, T> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// Records matching `filter`, in insertion order, capped at `LIST_LIMIT`.
    pub async fn list(&self, filter: &Filter) -> Result<Vec<T>, StoreError> {
        let docs = self.store.find_many(T::COLLECTION, filter, LIST_LIMIT).await?;
        docs.into_iter().map(decode::<T>).collect()
    }

    /// Record by id, or `StoreError::NotFound`.
    pub async fn get(&self, id: &str) -> Result<T, StoreError> {
        self.find(id).await?.ok_or_else(|| StoreError::NotFound {
            resource: T::RESOURCE,
            id: id.to_owned(),
        })
    }

    pub async fn find(&self, id: &str) -> Result<Option<T>, StoreError> {
        self.store
            .find_one(T::COLLECTION, id)
            .await?
            .map(decode::<T>)
            .transpose()
    }

    /// Insert and hand the record back for the response body.
    pub async fn insert(&self, record: T) -> Result<T, StoreError> {
        let doc = serde_json::to_value(&record).map_err(|source| StoreError::Malformed {
            collection: T::COLLECTION,
            source,
        })?;
        self.store.insert_one(T::COLLECTION, doc).await?;
        tracing::debug!(collection = %T::COLLECTION, id = record.id(), "Inserted");
        Ok(record)
    }

    pub async fn count(&self) -> Result<u64, StoreError> {
        self.store.count(T::COLLECTION).await
    }
}

fn decode<T: Document>(doc: serde_json::Value) -> Result<T, StoreError> {
    serde_json::from_value(doc).map_err(|source| StoreError::Malformed {
        collection: T::COLLECTION,
        source,
    })
}
