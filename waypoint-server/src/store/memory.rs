//! In-process document store
//!
//! Ordered vectors per collection behind a `RwLock`. Used by tests and by
//! `waypoint serve --memory`; contents are lost on exit.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::bootstrap::CollectionSpec;
use super::{doc_id, Collection, DocumentStore, Filter, StoreError};

#[derive(Default)]
struct Inner {
    docs: HashMap<Collection, Vec<Value>>,
    validators: HashMap<Collection, CollectionSpec>,
    closed: bool,
}

/// Memory-backed `DocumentStore`
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_many(
        &self,
        collection: Collection,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<Value>, StoreError> {
        let inner = self.inner.read().await;
        if inner.closed {
            return Err(StoreError::Closed);
        }
        Ok(inner
            .docs
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter.matches(doc))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        let inner = self.inner.read().await;
        if inner.closed {
            return Err(StoreError::Closed);
        }
        Ok(inner
            .docs
            .get(&collection)
            .and_then(|docs| docs.iter().find(|doc| doc_id(doc) == Some(id)))
            .cloned())
    }

    async fn insert_one(&self, collection: Collection, doc: Value) -> Result<(), StoreError> {
        let id = doc_id(&doc).ok_or(StoreError::MissingId)?.to_owned();

        let mut inner = self.inner.write().await;
        if inner.closed {
            return Err(StoreError::Closed);
        }
        if let Some(reason) = inner.validators.get(&collection).and_then(|s| s.violation(&doc)) {
            return Err(StoreError::Rejected { collection, reason });
        }

        let docs = inner.docs.entry(collection).or_default();
        if docs.iter().any(|d| doc_id(d) == Some(id.as_str())) {
            return Err(StoreError::Duplicate { collection, id });
        }
        docs.push(doc);
        Ok(())
    }

    async fn count(&self, collection: Collection) -> Result<u64, StoreError> {
        let inner = self.inner.read().await;
        if inner.closed {
            return Err(StoreError::Closed);
        }
        Ok(inner.docs.get(&collection).map_or(0, |docs| docs.len() as u64))
    }

    async fn ensure_collection(&self, spec: &CollectionSpec) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.closed {
            return Err(StoreError::Closed);
        }
        inner.docs.entry(spec.collection).or_default();
        inner.validators.insert(spec.collection, *spec);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.inner.read().await.closed {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    async fn close(&self) {
        self.inner.write().await.closed = true;
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::bootstrap::spec_for;
    use serde_json::json;

    #[tokio::test]
    async fn insert_preserves_order_and_limit() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .insert_one(Collection::Countries, json!({"id": i.to_string(), "name": format!("C{i}")}))
                .await
                .unwrap();
        }
        let docs = store
            .find_many(Collection::Countries, &Filter::new(), 3)
            .await
            .unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["0", "1", "2"]);
    }

    #[tokio::test]
    async fn duplicate_id_rejected() {
        let store = MemoryStore::new();
        store
            .insert_one(Collection::Partners, json!({"id": "p1"}))
            .await
            .unwrap();
        let err = store
            .insert_one(Collection::Partners, json!({"id": "p1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { id, .. } if id == "p1"));
        // same id in another collection is fine
        store
            .insert_one(Collection::Countries, json!({"id": "p1"}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_id_rejected() {
        let store = MemoryStore::new();
        let err = store
            .insert_one(Collection::Countries, json!({"name": "x"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingId));
    }

    #[tokio::test]
    async fn validator_applies_after_ensure() {
        let store = MemoryStore::new();
        store
            .ensure_collection(spec_for(Collection::Countries))
            .await
            .unwrap();
        let err = store
            .insert_one(Collection::Countries, json!({"id": "c1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected { .. }));
        assert_eq!(store.count(Collection::Countries).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn find_one_by_id() {
        let store = MemoryStore::new();
        store
            .insert_one(Collection::BlogPosts, json!({"id": "b1", "title": "Hello"}))
            .await
            .unwrap();
        let doc = store.find_one(Collection::BlogPosts, "b1").await.unwrap();
        assert_eq!(doc.unwrap()["title"], "Hello");
        assert!(store.find_one(Collection::BlogPosts, "b2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn closed_store_is_unavailable() {
        let store = MemoryStore::new();
        store.close().await;
        let err = store.ping().await.unwrap_err();
        assert!(err.is_unavailable());
        assert!(store.count(Collection::Countries).await.is_err());
    }
}
