//! Handlers for the `/posts` resource. Posts live only in the document store.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use multiverse_core::error::CoreError;
use multiverse_core::post::{NewPost, Post, PostPatch};
use multiverse_db::repositories::PostRepo;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/posts
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Post>>> {
    Ok(Json(PostRepo::list_active(&state.store).await))
}

/// GET /api/posts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Post>> {
    let post = PostRepo::find_active(&state.store, &id)
        .await
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(post))
}

/// POST /api/posts
///
/// Requires a JSON object with a non-empty `title`. The server assigns `id`
/// and `isDeleted`.
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Post>)> {
    let Json(payload) = payload?;
    let input = NewPost::from_payload(payload)?;
    let post = PostRepo::create(&state.store, input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/posts/{id}
///
/// Shallow-merges the payload; `id` and `isDeleted` are preserved.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Post>> {
    let Json(payload) = payload?;
    let patch = PostPatch::from_payload(payload)?;
    let post = PostRepo::update(&state.store, &id, patch)
        .await?
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(post))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if PostRepo::soft_delete(&state.store, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(&id))
    }
}

fn not_found(id: &str) -> AppError {
    AppError::Core(CoreError::not_found("Post", id))
}
