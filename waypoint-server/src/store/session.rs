//! Store session: the one owned handle to the document store
//!
//! Opened once at process start, shared through `AppState`, and closed on
//! shutdown. Opening never dials the database; the first query does.

use std::sync::Arc;

use waypoint_core::Settings;

use super::{DocumentStore, MemoryStore, PgDocumentStore, StoreError};

/// Cheaply cloneable handle to the process-wide store
#[derive(Clone)]
pub struct StoreSession {
    store: Arc<dyn DocumentStore>,
}

impl StoreSession {
    /// PostgreSQL session from settings.
    pub fn open(settings: &Settings) -> Result<Self, StoreError> {
        let store = PgDocumentStore::connect_lazy(&settings.store_url, &settings.store_db_name)?;
        tracing::info!(schema = %settings.store_db_name, "Store session opened (lazy connect)");
        Ok(Self::from_store(Arc::new(store)))
    }

    /// Session over a fresh in-memory store.
    pub fn in_memory() -> Self {
        tracing::info!("Store session opened (in-memory)");
        Self::from_store(Arc::new(MemoryStore::new()))
    }

    pub fn from_store(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Release pooled connections. Further calls fail as unavailable.
    pub async fn close(&self) {
        self.store.close().await;
        tracing::info!(backend = self.store.backend(), "Store session closed");
    }
}

impl std::fmt::Debug for StoreSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSession")
            .field("backend", &self.store.backend())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Collection;

    #[tokio::test]
    async fn open_does_not_connect() {
        let settings = Settings::from_lookup(|var| match var {
            "STORE_URL" => Some("postgres://nobody@127.0.0.1:1/none".to_owned()),
            _ => None,
        })
        .unwrap();
        let session = StoreSession::open(&settings).unwrap();
        assert_eq!(session.store().backend(), "postgres");
    }

    #[tokio::test]
    async fn clones_share_the_store() {
        let session = StoreSession::in_memory();
        let other = session.clone();
        other
            .store()
            .insert_one(Collection::Partners, serde_json::json!({"id": "p"}))
            .await
            .unwrap();
        assert_eq!(session.store().count(Collection::Partners).await.unwrap(), 1);

        session.close().await;
        assert!(other.store().ping().await.unwrap_err().is_unavailable());
    }
}
