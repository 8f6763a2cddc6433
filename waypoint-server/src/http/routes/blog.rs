//! Blog endpoints. Drafts are invisible to every read.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::http::error::ApiError;
use crate::http::extractors::{ValidId, ValidJson, ValidQuery};
use crate::models::{BlogPost, BlogQuery, Document, NewBlogPost};
use crate::state::AppState;
use crate::store::Repository;

/// GET /blog - published only, optional `tag` and `q`
async fn list_posts(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<BlogQuery>,
) -> Result<Json<Vec<BlogPost>>, ApiError> {
    let posts = Repository::<BlogPost>::new(state.store())
        .list(&query.to_filter())
        .await?;
    Ok(Json(posts))
}

/// POST /blog
async fn create_post(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<NewBlogPost>,
) -> Result<(StatusCode, Json<BlogPost>), ApiError> {
    let post = req.validate()?;
    let post = Repository::new(state.store()).insert(post).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /blog/{id}
async fn get_post(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<BlogPost>, ApiError> {
    match Repository::<BlogPost>::new(state.store()).find(&id).await? {
        Some(post) if post.published => Ok(Json(post)),
        _ => Err(ApiError::NotFound {
            resource: BlogPost::RESOURCE,
            id,
        }),
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/blog", get(list_posts).post(create_post))
        .route("/blog/{id}", get(get_post))
}
