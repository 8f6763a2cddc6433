//! Document store layer
//!
//! # Design Principles
//!
//! - One collection per resource, records keyed by their string `id` field
//! - Uniqueness is enforced by the store (unique index), never check-then-insert
//! - Backends are swappable behind `DocumentStore`; `Filter::matches` defines
//!   the query semantics every backend must agree with

pub mod bootstrap;
pub mod filter;
pub mod memory;
pub mod postgres;
pub mod repo;
pub mod session;

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

pub use bootstrap::{CollectionSpec, JsonType};
pub use filter::{Filter, TextSearch};
pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;
pub use repo::Repository;
pub use session::StoreSession;

/// Upper bound on records returned by any list operation.
pub const LIST_LIMIT: usize = 1000;

/// The six collections backing the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Countries,
    Opportunities,
    Applications,
    Testimonials,
    Partners,
    BlogPosts,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Self::Countries,
        Self::Opportunities,
        Self::Applications,
        Self::Testimonials,
        Self::Partners,
        Self::BlogPosts,
    ];

    /// Collection (table) name in the store
    pub fn name(&self) -> &'static str {
        match self {
            Self::Countries => "countries",
            Self::Opportunities => "opportunities",
            Self::Applications => "applications",
            Self::Testimonials => "testimonials",
            Self::Partners => "partners",
            Self::BlogPosts => "blog_posts",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Store error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("duplicate id '{id}' in {collection}")]
    Duplicate { collection: Collection, id: String },

    #[error("document rejected by {collection} validator: {reason}")]
    Rejected { collection: Collection, reason: String },

    #[error("malformed document in {collection}: {source}")]
    Malformed {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },

    #[error("document has no string 'id' field")]
    MissingId,

    #[error("store session is closed")]
    Closed,
}

impl StoreError {
    /// True when the store could not be reached at all, as opposed to
    /// a query that reached it and failed.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Closed => true,
            Self::Sqlx(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
            ),
            _ => false,
        }
    }
}

/// Minimal document-store surface used by the API.
///
/// Documents are plain JSON objects carrying a string `id`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents matching `filter`, in insertion order, at most `limit`.
    async fn find_many(
        &self,
        collection: Collection,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<Value>, StoreError>;

    async fn find_one(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError>;

    /// Insert a document. A repeated `id` is `StoreError::Duplicate`.
    async fn insert_one(&self, collection: Collection, doc: Value) -> Result<(), StoreError>;

    async fn count(&self, collection: Collection) -> Result<u64, StoreError>;

    /// Idempotently create the collection, its indexes and its validator.
    async fn ensure_collection(&self, spec: &CollectionSpec) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    async fn close(&self);

    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}

/// The `id` field of a document, if it is a string.
pub(crate) fn doc_id(doc: &Value) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_names_are_unique() {
        let mut names: Vec<_> = Collection::ALL.iter().map(|c| c.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Collection::ALL.len());
        assert_eq!(Collection::BlogPosts.to_string(), "blog_posts");
    }

    #[test]
    fn unavailable_classification() {
        assert!(StoreError::Closed.is_unavailable());
        assert!(StoreError::Sqlx(sqlx::Error::PoolTimedOut).is_unavailable());
        assert!(!StoreError::MissingId.is_unavailable());
        assert!(!StoreError::Sqlx(sqlx::Error::RowNotFound).is_unavailable());
    }
}
