//! Axum server setup
//!
//! Server skeleton with:
//! - CORS allow-list from settings (permissive only on request)
//! - Tracing middleware and request timeout
//! - Store bootstrap in the background, so `/healthz` answers from the start
//! - Graceful shutdown on SIGTERM/Ctrl+C, then the store session is closed

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use waypoint_core::{CorsOrigins, Settings};

use super::routes;
use crate::state::AppState;
use crate::store::{bootstrap, StoreSession};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:8000)
    pub bind_addr: SocketAddr,

    /// Allowed cross-origin hosts
    pub cors_origins: CorsOrigins,

    /// Allow any origin regardless of `cors_origins`.
    ///
    /// WARNING: only for development.
    pub cors_permissive: bool,

    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            cors_origins: CorsOrigins::List(Vec::new()),
            cors_permissive: false,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ServerConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            bind_addr: settings.bind_addr,
            cors_origins: settings.cors_origins.clone(),
            cors_permissive: false,
            request_timeout: settings.request_timeout,
        }
    }
}

fn cors_layer(config: &ServerConfig) -> Result<CorsLayer, ServerError> {
    if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return Ok(CorsLayer::permissive());
    }

    let origins = match &config.cors_origins {
        CorsOrigins::Any => {
            return Ok(CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any));
        }
        CorsOrigins::List(origins) => origins,
    };

    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| ServerError::InvalidOrigin(origin.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}

/// Build the full router: `/healthz` plus the API under `/api/v1`.
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Result<Router, ServerError> {
    let cors = cors_layer(config)?;

    Ok(Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_router())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Run the HTTP server until a shutdown signal, then close the session.
///
/// # Example
///
/// ```ignore
/// let settings = Settings::from_env()?;
/// let session = StoreSession::open(&settings)?;
/// run_server(session, ServerConfig::from_settings(&settings)).await?;
/// ```
pub async fn run_server(session: StoreSession, config: ServerConfig) -> Result<(), ServerError> {
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    serve(listener, session, &config, shutdown_signal()).await
}

/// Serve on a bound listener until `shutdown` resolves, then close the
/// session. Bootstrap runs concurrently with serving.
pub async fn serve<F>(
    listener: TcpListener,
    session: StoreSession,
    config: &ServerConfig,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = Arc::new(AppState::new(session.clone()));
    let app = build_router(state, config)?;
    let bootstrap = spawn_bootstrap(session.clone());

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    bootstrap.abort();
    session.close().await;
    served?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn spawn_bootstrap(session: StoreSession) -> JoinHandle<()> {
    tokio::spawn(async move {
        // A failure here is not fatal: the store retries its own setup on
        // the next request, and the API answers 503 until then.
        if let Err(e) = bootstrap::ensure_all(session.store()).await {
            tracing::warn!(error = %e, "Store bootstrap failed, serving anyway");
        }
    })
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid CORS origin '{0}'")]
    InvalidOrigin(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use crate::store::{Collection, CollectionSpec, DocumentStore, Filter, MemoryStore, StoreError};

    /// Memory store whose collection setup never finishes
    struct StalledBootstrap(MemoryStore);

    #[async_trait]
    impl DocumentStore for StalledBootstrap {
        async fn find_many(
            &self,
            collection: Collection,
            filter: &Filter,
            limit: usize,
        ) -> Result<Vec<Value>, StoreError> {
            self.0.find_many(collection, filter, limit).await
        }

        async fn find_one(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
            self.0.find_one(collection, id).await
        }

        async fn insert_one(&self, collection: Collection, doc: Value) -> Result<(), StoreError> {
            self.0.insert_one(collection, doc).await
        }

        async fn count(&self, collection: Collection) -> Result<u64, StoreError> {
            self.0.count(collection).await
        }

        async fn ensure_collection(&self, _spec: &CollectionSpec) -> Result<(), StoreError> {
            std::future::pending().await
        }

        async fn ping(&self) -> Result<(), StoreError> {
            self.0.ping().await
        }

        async fn close(&self) {
            self.0.close().await
        }

        fn backend(&self) -> &'static str {
            "memory"
        }
    }

    #[tokio::test]
    async fn healthz_answers_while_bootstrap_is_stuck() {
        let session = StoreSession::from_store(Arc::new(StalledBootstrap(MemoryStore::new())));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            serve(listener, session, &ServerConfig::default(), async {
                stopped.await.ok();
            })
            .await
        });

        let response = tokio::time::timeout(Duration::from_secs(2), async {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream
                .write_all(b"GET /healthz HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
                .await
                .unwrap();
            let mut response = String::new();
            stream.read_to_string(&mut response).await.unwrap();
            response
        })
        .await
        .expect("healthz did not answer");

        assert!(response.starts_with("HTTP/1.1 200"), "{response}");

        stop.send(()).unwrap();
        server.await.unwrap().unwrap();
    }

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8000);
        assert!(!config.cors_permissive);
    }

    #[test]
    fn config_from_settings() {
        let settings = Settings::from_lookup(|var| match var {
            "BIND_ADDR" => Some("127.0.0.1:9100".to_owned()),
            "CORS_ORIGINS" => Some("*".to_owned()),
            "REQUEST_TIMEOUT_SECONDS" => Some("5".to_owned()),
            _ => None,
        })
        .unwrap();
        let config = ServerConfig::from_settings(&settings);
        assert_eq!(config.bind_addr.port(), 9100);
        assert_eq!(config.cors_origins, CorsOrigins::Any);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_origin_is_rejected() {
        let config = ServerConfig {
            cors_origins: CorsOrigins::List(vec!["http://ok.example".into(), "bad\norigin".into()]),
            ..Default::default()
        };
        assert!(matches!(
            cors_layer(&config),
            Err(ServerError::InvalidOrigin(o)) if o == "bad\norigin"
        ));
    }
}
