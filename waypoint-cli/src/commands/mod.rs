//! Command implementations for the waypoint CLI

pub mod bootstrap;
pub mod crypto;
pub mod serve;

pub use bootstrap::run_bootstrap;
pub use crypto::{run_seal, run_unseal};
pub use serve::run_serve;
