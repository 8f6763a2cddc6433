//! waypoint-core: shared building blocks for the Waypoint listing API
//!
//! - `config`: typed settings loaded from the environment
//! - `crypto`: AES-256-GCM envelopes for field-level encryption at rest
//! - `chat`: keyword-matching assistant replies

pub mod chat;
pub mod config;
pub mod crypto;
pub mod error;

pub use chat::{ChatBot, ChatReply};
pub use config::{CorsOrigins, ObjectStorageSettings, Secret, Settings};
pub use crypto::{derive_key, Envelope, FieldCipher, KEY_LEN, NONCE_LEN, TAG_LEN};
pub use error::{ConfigError, CryptoError};
