//! PostgreSQL JSONB backend
//!
//! The configured database name selects a schema. Each collection is a table
//! `(seq BIGSERIAL, doc JSONB, inserted_at)`; `seq` gives insertion order and
//! the `id` lives inside `doc`, guarded by a unique expression index.
//!
//! The store bootstraps itself: the first operation that reaches the server
//! creates every collection, and a failed attempt is retried by the next
//! operation. A database that is down at startup serves normally once it
//! comes back.
//!
//! Text search uses `ILIKE`, which folds case according to the database's
//! `LC_CTYPE`. Non-ASCII terms only match case-insensitively under a UTF-8
//! locale; a C/POSIX database is reported with a warning at bootstrap.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;

use super::bootstrap::{CollectionSpec, SPECS};
use super::filter::like_pattern;
use super::{doc_id, Collection, DocumentStore, Filter, StoreError};

/// Default maximum connections for the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// How long a request waits for a pooled connection before the store is
/// treated as unavailable.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// `DocumentStore` over a PostgreSQL pool
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    schema: String,
    /// Set once every collection's DDL has been applied
    ready: Arc<OnceCell<()>>,
}

impl PgDocumentStore {
    /// Build a lazily-connecting pool. Nothing dials the server until the
    /// first query, so a down database does not block startup.
    ///
    /// `schema` must already be a safe identifier (see `Settings`).
    pub fn connect_lazy(database_url: &str, schema: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_lazy(database_url)?;
        Ok(Self::from_pool(pool, schema))
    }

    pub fn from_pool(pool: PgPool, schema: &str) -> Self {
        Self {
            pool,
            schema: schema.to_owned(),
            ready: Arc::new(OnceCell::new()),
        }
    }

    fn table(&self, collection: Collection) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(collection.name()))
    }

    /// Bootstrap on first use. Concurrent callers wait for one attempt; an
    /// error leaves the cell empty so the next operation tries again.
    async fn ready(&self) -> Result<(), StoreError> {
        self.ready.get_or_try_init(|| self.bootstrap()).await?;
        Ok(())
    }

    async fn bootstrap(&self) -> Result<(), StoreError> {
        for spec in &SPECS {
            self.apply_ddl(spec).await?;
        }
        self.check_locale().await;
        tracing::info!(schema = %self.schema, "Store schema ready");
        Ok(())
    }

    async fn apply_ddl(&self, spec: &CollectionSpec) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for statement in collection_ddl(&self.schema, spec) {
            sqlx::query(&statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn check_locale(&self) {
        let ctype = sqlx::query_scalar::<_, String>(
            "SELECT datctype FROM pg_database WHERE datname = current_database()",
        )
        .fetch_one(&self.pool)
        .await;

        match ctype {
            Ok(ctype) if !folds_unicode(&ctype) => tracing::warn!(
                lc_ctype = %ctype,
                "Database locale folds ASCII case only; non-ASCII search terms match case-sensitively"
            ),
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "Could not read database locale"),
        }
    }
}

/// Whether `ILIKE` under this `LC_CTYPE` folds case beyond ASCII.
fn folds_unicode(ctype: &str) -> bool {
    !matches!(ctype.trim().to_ascii_uppercase().as_str(), "C" | "POSIX" | "")
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// `SELECT` for `find_many`. Binds, in order: containment document, LIKE
/// pattern and field names (when searching), limit.
fn select_sql(table: &str, filter: &Filter) -> String {
    let mut sql = format!("SELECT doc FROM {} WHERE doc @> $1", table);
    let mut next = 2;
    if let Some(search) = &filter.search {
        let clauses: Vec<String> = (0..search.fields.len())
            .map(|i| format!("doc ->> ${} ILIKE $2 ESCAPE '\\'", i + 3))
            .collect();
        sql.push_str(&format!(" AND ({})", clauses.join(" OR ")));
        next = 3 + search.fields.len();
    }
    sql.push_str(&format!(" ORDER BY seq LIMIT ${}", next));
    sql
}

/// `CHECK` expression requiring each field with its JSON type.
fn shape_check(spec: &CollectionSpec) -> String {
    let mut terms = vec!["jsonb_typeof(doc) = 'object'".to_owned()];
    terms.extend(spec.required.iter().map(|(field, ty)| {
        format!(
            "jsonb_typeof(doc -> {}) IS NOT DISTINCT FROM {}",
            quote_literal(field),
            quote_literal(ty.name())
        )
    }));
    terms.join(" AND ")
}

/// DDL statements making the collection, in execution order.
fn collection_ddl(schema: &str, spec: &CollectionSpec) -> Vec<String> {
    let name = spec.collection.name();
    let table = format!("{}.{}", quote_ident(schema), quote_ident(name));
    let text_expr = |field: &&str| format!("(doc ->> {})", quote_literal(field));

    let mut ddl = vec![
        format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema)),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                seq BIGSERIAL PRIMARY KEY,
                doc JSONB NOT NULL,
                inserted_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
            table
        ),
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ((doc ->> 'id'))",
            quote_ident(&format!("{}_id_key", name)),
            table
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} USING GIN (doc jsonb_path_ops)",
            quote_ident(&format!("{}_doc_idx", name)),
            table
        ),
    ];

    if !spec.filter_fields.is_empty() {
        let columns: Vec<String> = spec.filter_fields.iter().map(text_expr).collect();
        ddl.push(format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
            quote_ident(&format!("{}_filter_idx", name)),
            table,
            columns.join(", ")
        ));
    }

    if !spec.text_fields.is_empty() {
        let document: Vec<String> = spec
            .text_fields
            .iter()
            .map(|f| format!("coalesce(doc ->> {}, '')", quote_literal(f)))
            .collect();
        ddl.push(format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} USING GIN (to_tsvector('simple'::regconfig, {}))",
            quote_ident(&format!("{}_text_idx", name)),
            table,
            document.join(" || ' ' || ")
        ));
    }

    // Replaced on every run so the validator tracks the current field set.
    // NOT VALID leaves rows written under an older shape alone.
    let constraint = quote_ident(&format!("{}_shape", name));
    ddl.push(format!("ALTER TABLE {} DROP CONSTRAINT IF EXISTS {}", table, constraint));
    ddl.push(format!(
        "ALTER TABLE {} ADD CONSTRAINT {} CHECK ({}) NOT VALID",
        table,
        constraint,
        shape_check(spec)
    ));

    ddl
}

fn map_insert_error(collection: Collection, id: String, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Duplicate { collection, id };
        }
        if db.is_check_violation() {
            return StoreError::Rejected {
                collection,
                reason: db.message().to_owned(),
            };
        }
    }
    StoreError::Sqlx(err)
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find_many(
        &self,
        collection: Collection,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<Value>, StoreError> {
        self.ready().await?;
        let sql = select_sql(&self.table(collection), filter);

        let mut query = sqlx::query_scalar::<_, Value>(&sql).bind(filter.containment());
        if let Some(search) = &filter.search {
            query = query.bind(like_pattern(&search.term));
            for field in search.fields {
                query = query.bind(*field);
            }
        }
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        Ok(query.bind(limit).fetch_all(&self.pool).await?)
    }

    async fn find_one(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        self.ready().await?;
        let sql = format!(
            "SELECT doc FROM {} WHERE doc ->> 'id' = $1 LIMIT 1",
            self.table(collection)
        );
        Ok(sqlx::query_scalar::<_, Value>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_one(&self, collection: Collection, doc: Value) -> Result<(), StoreError> {
        let id = doc_id(&doc).ok_or(StoreError::MissingId)?.to_owned();
        self.ready().await?;
        let sql = format!("INSERT INTO {} (doc) VALUES ($1)", self.table(collection));

        sqlx::query(&sql)
            .bind(&doc)
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_error(collection, id, e))?;
        Ok(())
    }

    async fn count(&self, collection: Collection) -> Result<u64, StoreError> {
        self.ready().await?;
        let sql = format!("SELECT COUNT(*) FROM {}", self.table(collection));
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn ensure_collection(&self, spec: &CollectionSpec) -> Result<(), StoreError> {
        self.apply_ddl(spec).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::bootstrap::{ensure_all, spec_for};
    use serde_json::json;

    const FIELDS: &[&str] = &["title", "description"];

    #[test]
    fn select_without_search() {
        let sql = select_sql("\"w\".\"countries\"", &Filter::new());
        assert_eq!(
            sql,
            "SELECT doc FROM \"w\".\"countries\" WHERE doc @> $1 ORDER BY seq LIMIT $2"
        );
    }

    #[test]
    fn select_with_search_numbers_params() {
        let filter = Filter::new().search(Some("nurse"), FIELDS);
        let sql = select_sql("t", &filter);
        assert!(sql.contains("doc ->> $3 ILIKE $2 ESCAPE '\\' OR doc ->> $4 ILIKE $2"));
        assert!(sql.ends_with("ORDER BY seq LIMIT $5"));
    }

    #[test]
    fn identifiers_and_literals_are_quoted() {
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
        assert_eq!(quote_literal("o'brien"), "'o''brien'");
    }

    #[test]
    fn ddl_is_idempotent_and_complete() {
        let ddl = collection_ddl("waypoint", spec_for(Collection::Opportunities));
        assert!(ddl.iter().all(|s| {
            s.contains("IF NOT EXISTS") || s.contains("DROP CONSTRAINT IF EXISTS") || s.contains("NOT VALID")
        }));
        assert!(ddl.iter().any(|s| s.contains("UNIQUE INDEX") && s.contains("(doc ->> 'id')")));
        assert!(ddl.iter().any(|s| s.contains("opportunities_filter_idx")
            && s.contains("(doc ->> 'country'), (doc ->> 'job_type'), (doc ->> 'status')")));
        assert!(ddl.iter().any(|s| s.contains("to_tsvector")));
    }

    #[test]
    fn countries_have_no_filter_index() {
        let ddl = collection_ddl("waypoint", spec_for(Collection::Countries));
        assert!(!ddl.iter().any(|s| s.contains("_filter_idx")));
    }

    #[test]
    fn shape_check_requires_types() {
        let check = shape_check(spec_for(Collection::Partners));
        assert!(check.contains("jsonb_typeof(doc -> 'name') IS NOT DISTINCT FROM 'string'"));
        assert!(check.contains("jsonb_typeof(doc -> 'active') IS NOT DISTINCT FROM 'boolean'"));
    }

    #[test]
    fn c_locale_does_not_fold_unicode() {
        assert!(!folds_unicode("C"));
        assert!(!folds_unicode("POSIX"));
        assert!(folds_unicode("en_US.UTF-8"));
        assert!(folds_unicode("C.UTF-8"));
    }

    // Integration tests require a real database
    // Run with: DATABASE_URL=postgres://... cargo test -p waypoint-server -- --ignored

    fn test_store() -> PgDocumentStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let schema = format!("waypoint_test_{}", uuid::Uuid::new_v4().simple());
        PgDocumentStore::connect_lazy(&url, &schema).expect("pool creation failed")
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn bootstrap_twice_then_filter() {
        let store = test_store();
        ensure_all(&store).await.expect("first bootstrap");
        ensure_all(&store).await.expect("second bootstrap");

        let base = json!({
            "job_type": "full-time",
            "description": "Aged care",
            "status": "open",
            "featured": false,
            "created_at": "2024-01-01T00:00:00Z"
        });
        for (id, title, country) in [("1", "Nurse", "Australia"), ("2", "Chef", "Canada")] {
            let mut doc = base.clone();
            doc["id"] = json!(id);
            doc["title"] = json!(title);
            doc["country"] = json!(country);
            store.insert_one(Collection::Opportunities, doc).await.unwrap();
        }

        let found = store
            .find_many(
                Collection::Opportunities,
                &Filter::new().eq("country", "Australia").search(Some("NUR"), FIELDS),
                10,
            )
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["id"], "1");

        let mut dup = base.clone();
        dup["id"] = json!("1");
        dup["title"] = json!("Again");
        dup["country"] = json!("Australia");
        let err = store.insert_one(Collection::Opportunities, dup).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));

        let err = store
            .insert_one(Collection::Opportunities, json!({"id": "3"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected { .. }));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn fresh_schema_bootstraps_on_first_use() {
        let store = test_store();

        let found = store
            .find_many(Collection::Countries, &Filter::new(), 10)
            .await
            .expect("query against an unbootstrapped schema");
        assert!(found.is_empty());

        store
            .insert_one(
                Collection::Partners,
                json!({
                    "id": "p1",
                    "name": "Maple College",
                    "active": true,
                    "created_at": "2024-01-01T00:00:00Z"
                }),
            )
            .await
            .expect("insert against an unbootstrapped schema");
        assert_eq!(store.count(Collection::Partners).await.unwrap(), 1);
        assert_eq!(store.count(Collection::Applications).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unreachable_store_is_unavailable_not_missing() {
        let store = PgDocumentStore::connect_lazy("postgres://nobody@127.0.0.1:1/none", "waypoint")
            .unwrap();
        let err = store
            .find_many(Collection::Countries, &Filter::new(), 10)
            .await
            .unwrap_err();
        assert!(err.is_unavailable(), "{err}");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    #[ignore = "requires database"]
    async fn concurrent_seeds_do_not_duplicate() {
        let store = std::sync::Arc::new(test_store());
        ensure_all(store.as_ref()).await.unwrap();

        let a = tokio::spawn({
            let store = std::sync::Arc::clone(&store);
            async move { crate::seed::seed_empty_collections(store.as_ref()).await }
        });
        let b = tokio::spawn({
            let store = std::sync::Arc::clone(&store);
            async move { crate::seed::seed_empty_collections(store.as_ref()).await }
        });
        let total = a.await.unwrap().unwrap().total() + b.await.unwrap().unwrap().total();

        assert_eq!(total, 17);
        assert_eq!(store.count(Collection::Opportunities).await.unwrap(), 4);
        assert_eq!(store.count(Collection::BlogPosts).await.unwrap(), 3);
    }
}
