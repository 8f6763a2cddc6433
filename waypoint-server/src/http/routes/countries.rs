//! Country endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::http::error::ApiError;
use crate::http::extractors::{ValidId, ValidJson, ValidQuery};
use crate::models::{Country, CountryQuery, NewCountry};
use crate::state::AppState;
use crate::store::Repository;

/// GET /countries
async fn list_countries(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<CountryQuery>,
) -> Result<Json<Vec<Country>>, ApiError> {
    let countries = Repository::<Country>::new(state.store())
        .list(&query.to_filter())
        .await?;
    Ok(Json(countries))
}

/// POST /countries
async fn create_country(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<NewCountry>,
) -> Result<(StatusCode, Json<Country>), ApiError> {
    let country = req.validate()?;
    let country = Repository::new(state.store()).insert(country).await?;
    Ok((StatusCode::CREATED, Json(country)))
}

/// GET /countries/{id}
async fn get_country(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<Country>, ApiError> {
    let country = Repository::<Country>::new(state.store()).get(&id).await?;
    Ok(Json(country))
}

/// Country routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/countries", get(list_countries).post(create_country))
        .route("/countries/{id}", get(get_country))
}
