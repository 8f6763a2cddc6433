//! Administrative endpoints

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};

use crate::http::error::ApiError;
use crate::seed::{seed_empty_collections, SeedReport};
use crate::state::AppState;

/// POST /admin/seed - fill empty collections with sample data
async fn seed(State(state): State<Arc<AppState>>) -> Result<Json<SeedReport>, ApiError> {
    let report = seed_empty_collections(state.store()).await?;
    Ok(Json(report))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/admin/seed", post(seed))
}
