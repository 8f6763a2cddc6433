//! Route handlers organized by resource

pub mod admin;
pub mod applications;
pub mod blog;
pub mod chat;
pub mod countries;
pub mod health;
pub mod opportunities;
pub mod partners;
pub mod testimonials;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Everything mounted under `/api/v1`
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(countries::router())
        .merge(opportunities::router())
        .merge(applications::router())
        .merge(testimonials::router())
        .merge(partners::router())
        .merge(blog::router())
        .merge(chat::router())
        .merge(admin::router())
}
