//! Opportunity endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::http::error::ApiError;
use crate::http::extractors::{ValidId, ValidJson, ValidQuery};
use crate::models::{NewOpportunity, Opportunity, OpportunityQuery};
use crate::state::AppState;
use crate::store::Repository;

/// GET /opportunities - exact filters on country, job_type, status, featured;
/// `q` searches title and description
async fn list_opportunities(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<OpportunityQuery>,
) -> Result<Json<Vec<Opportunity>>, ApiError> {
    let opportunities = Repository::<Opportunity>::new(state.store())
        .list(&query.to_filter())
        .await?;
    Ok(Json(opportunities))
}

/// POST /opportunities
async fn create_opportunity(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<NewOpportunity>,
) -> Result<(StatusCode, Json<Opportunity>), ApiError> {
    let opportunity = req.validate()?;
    let opportunity = Repository::new(state.store()).insert(opportunity).await?;
    Ok((StatusCode::CREATED, Json(opportunity)))
}

/// GET /opportunities/{id}
async fn get_opportunity(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<Opportunity>, ApiError> {
    let opportunity = Repository::<Opportunity>::new(state.store()).get(&id).await?;
    Ok(Json(opportunity))
}

/// Opportunity routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/opportunities", get(list_opportunities).post(create_opportunity))
        .route("/opportunities/{id}", get(get_opportunity))
}
