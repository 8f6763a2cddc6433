//! Application endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::http::error::ApiError;
use crate::http::extractors::{ValidId, ValidJson, ValidQuery};
use crate::models::{Application, ApplicationQuery, Document, NewApplication, Opportunity};
use crate::state::AppState;
use crate::store::Repository;

/// GET /applications
async fn list_applications(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<ApplicationQuery>,
) -> Result<Json<Vec<Application>>, ApiError> {
    let applications = Repository::<Application>::new(state.store())
        .list(&query.to_filter())
        .await?;
    Ok(Json(applications))
}

/// POST /applications - the referenced opportunity must exist
async fn create_application(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<NewApplication>,
) -> Result<(StatusCode, Json<Application>), ApiError> {
    let application = req.validate()?;

    // Checked once here; later removal of the opportunity is not tracked
    let opportunity = Repository::<Opportunity>::new(state.store())
        .find(&application.opportunity_id)
        .await?;
    if opportunity.is_none() {
        return Err(ApiError::NotFound {
            resource: Opportunity::RESOURCE,
            id: application.opportunity_id,
        });
    }

    let application = Repository::new(state.store()).insert(application).await?;
    tracing::info!(
        application = %application.id,
        opportunity = %application.opportunity_id,
        "Application received"
    );
    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /applications/{id}
async fn get_application(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<Application>, ApiError> {
    let application = Repository::<Application>::new(state.store()).get(&id).await?;
    Ok(Json(application))
}

/// Application routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/applications", get(list_applications).post(create_application))
        .route("/applications/{id}", get(get_application))
}
