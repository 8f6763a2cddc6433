//! Keyword chatbot endpoint

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use waypoint_core::ChatReply;

use crate::http::error::ApiError;
use crate::http::extractors::ValidJson;
use crate::models::validation::{self, MAX_LONG_LEN};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// POST /chat
async fn chat(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let message = validation::required("message", &req.message, MAX_LONG_LEN)?;
    let reply = state.chat.reply(&message);
    tracing::debug!(topic = reply.topic.unwrap_or("none"), "Chat reply");
    Ok(Json(reply))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}
