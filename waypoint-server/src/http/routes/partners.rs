//! Partner endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::http::error::ApiError;
use crate::http::extractors::{ValidJson, ValidQuery};
use crate::models::{NewPartner, Partner, PartnerQuery};
use crate::state::AppState;
use crate::store::Repository;

/// GET /partners - active only
async fn list_partners(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<PartnerQuery>,
) -> Result<Json<Vec<Partner>>, ApiError> {
    let partners = Repository::<Partner>::new(state.store())
        .list(&query.to_filter())
        .await?;
    Ok(Json(partners))
}

/// POST /partners
async fn create_partner(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<NewPartner>,
) -> Result<(StatusCode, Json<Partner>), ApiError> {
    let partner = req.validate()?;
    let partner = Repository::new(state.store()).insert(partner).await?;
    Ok((StatusCode::CREATED, Json(partner)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/partners", get(list_partners).post(create_partner))
}
