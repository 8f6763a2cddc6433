//! Typed settings loaded from environment variables
//!
//! Variables (defaults in parentheses):
//! - `STORE_URL` / `DATABASE_URL` (postgres://localhost/waypoint)
//! - `STORE_DB_NAME` (waypoint)
//! - `CACHE_URL` (redis://localhost:6379)
//! - `SESSION_SECRET`, `TOKEN_SECRET`, `ENCRYPTION_MASTER_KEY` (unset)
//! - `SESSION_COOKIE_NAME` (waypoint_sid), `SESSION_TTL_SECONDS` (604800)
//! - `TOKEN_TTL_SECONDS` (900)
//! - `S3_ENDPOINT`, `S3_REGION` (us-east-1), `S3_BUCKET`, `S3_ACCESS_KEY_ID`,
//!   `S3_SECRET_ACCESS_KEY`
//! - `CORS_ORIGINS` (localhost dev origins; `*` allows any)
//! - `BIND_ADDR` (0.0.0.0:8000), `REQUEST_TIMEOUT_SECONDS` (30)

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::ConfigError;

const DEFAULT_STORE_URL: &str = "postgres://localhost/waypoint";
const DEFAULT_DB_NAME: &str = "waypoint";
const DEFAULT_CACHE_URL: &str = "redis://localhost:6379";
const DEFAULT_COOKIE_NAME: &str = "waypoint_sid";
const DEFAULT_SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;
const DEFAULT_TOKEN_TTL_SECS: u64 = 15 * 60;
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Origins allowed when `CORS_ORIGINS` is unset
const DEV_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "http://localhost:5173",
];

/// The database name doubles as a schema identifier, so keep it to a plain
/// lowercase identifier
static DB_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").expect("invalid db name regex"));

/// A configured secret. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the secret value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Cross-origin policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    /// `CORS_ORIGINS=*`
    Any,
    /// Explicit allow-list
    List(Vec<String>),
}

/// S3-compatible object storage settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStorageSettings {
    pub endpoint: Option<String>,
    pub region: String,
    pub bucket: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<Secret>,
}

/// Process-wide settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Document store connection URL
    pub store_url: String,
    /// Database (schema) holding the collections
    pub store_db_name: String,
    pub cache_url: String,
    pub session_secret: Option<Secret>,
    pub token_secret: Option<Secret>,
    pub session_cookie_name: String,
    pub session_ttl: Duration,
    /// Lifetime of short-lived tokens
    pub token_ttl: Duration,
    pub object_storage: ObjectStorageSettings,
    /// Secret the field-encryption key is derived from
    pub encryption_master_key: Option<Secret>,
    pub cors_origins: CorsOrigins,
    pub bind_addr: SocketAddr,
    pub request_timeout: Duration,
}

impl Settings {
    /// Load `.env` (if present) and read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded .env from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup function.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store_db_name = get("STORE_DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string());
        if !DB_NAME_RE.is_match(&store_db_name) {
            return Err(ConfigError::invalid(
                "STORE_DB_NAME",
                "must be lowercase letters, digits, or underscores, starting with a letter or underscore",
            ));
        }

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = SocketAddr::from_str(&bind_addr)
            .map_err(|e| ConfigError::invalid("BIND_ADDR", e.to_string()))?;

        Ok(Self {
            store_url: get("STORE_URL")
                .or_else(|| get("DATABASE_URL"))
                .unwrap_or_else(|| DEFAULT_STORE_URL.to_string()),
            store_db_name,
            cache_url: get("CACHE_URL").unwrap_or_else(|| DEFAULT_CACHE_URL.to_string()),
            session_secret: get("SESSION_SECRET").map(Secret::new),
            token_secret: get("TOKEN_SECRET").map(Secret::new),
            session_cookie_name: get("SESSION_COOKIE_NAME")
                .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string()),
            session_ttl: seconds(&get, "SESSION_TTL_SECONDS", DEFAULT_SESSION_TTL_SECS)?,
            token_ttl: seconds(&get, "TOKEN_TTL_SECONDS", DEFAULT_TOKEN_TTL_SECS)?,
            object_storage: ObjectStorageSettings {
                endpoint: get("S3_ENDPOINT"),
                region: get("S3_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
                bucket: get("S3_BUCKET"),
                access_key_id: get("S3_ACCESS_KEY_ID"),
                secret_access_key: get("S3_SECRET_ACCESS_KEY").map(Secret::new),
            },
            encryption_master_key: get("ENCRYPTION_MASTER_KEY").map(Secret::new),
            cors_origins: parse_origins(get("CORS_ORIGINS").as_deref()),
            bind_addr,
            request_timeout: seconds(&get, "REQUEST_TIMEOUT_SECONDS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
        })
    }
}

fn seconds<F>(get: &F, var: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match get(var) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::invalid(var, format!("expected whole seconds, got '{raw}'"))),
        None => Ok(Duration::from_secs(default)),
    }
}

fn parse_origins(raw: Option<&str>) -> CorsOrigins {
    match raw {
        Some(raw) if raw.trim() == "*" => CorsOrigins::Any,
        Some(raw) => CorsOrigins::List(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        None => CorsOrigins::List(DEV_ORIGINS.iter().map(|s| s.to_string()).collect()),
    }
}
