//! Liveness check for load balancers. Reports which store backend the
//! process was started with but never queries it, so it answers even while
//! the database is down.

use std::sync::Arc;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// `postgres` or `memory`
    pub store: &'static str,
}

/// GET /healthz
async fn healthz(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "waypoint",
        version: env!("CARGO_PKG_VERSION"),
        store: state.store().backend(),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/healthz", get(healthz))
}
