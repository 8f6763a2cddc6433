//! waypoint-server: HTTP API for an overseas study & work consultancy
//!
//! Countries, opportunities, applications, testimonials, partners and blog
//! posts over a document store, plus a keyword chatbot and sample-data
//! seeding.

pub mod http;
pub mod models;
pub mod seed;
pub mod state;
pub mod store;

pub use http::{build_router, run_server, ApiError, ServerConfig, ServerError};
pub use state::AppState;
pub use store::{DocumentStore, StoreError, StoreSession};
