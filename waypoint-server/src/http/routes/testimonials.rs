//! Testimonial endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::http::error::ApiError;
use crate::http::extractors::{ValidJson, ValidQuery};
use crate::models::{NewTestimonial, Testimonial, TestimonialQuery};
use crate::state::AppState;
use crate::store::Repository;

/// GET /testimonials - active only
async fn list_testimonials(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<TestimonialQuery>,
) -> Result<Json<Vec<Testimonial>>, ApiError> {
    let testimonials = Repository::<Testimonial>::new(state.store())
        .list(&query.to_filter())
        .await?;
    Ok(Json(testimonials))
}

/// POST /testimonials
async fn create_testimonial(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<NewTestimonial>,
) -> Result<(StatusCode, Json<Testimonial>), ApiError> {
    let testimonial = req.validate()?;
    let testimonial = Repository::new(state.store()).insert(testimonial).await?;
    Ok((StatusCode::CREATED, Json(testimonial)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/testimonials", get(list_testimonials).post(create_testimonial))
}
