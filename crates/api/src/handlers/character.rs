//! Handlers for the `/characters` resource.
//!
//! Reads go to the upstream catalog and are overlaid with local overrides
//! from the document store. Writes only ever touch the overrides.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use multiverse_catalog::CatalogError;
use multiverse_core::character::{overlay_all, CharacterPage, CharacterRecord};
use multiverse_core::error::CoreError;
use multiverse_core::json::into_object;
use multiverse_core::selector::{parse_character_id, CharacterSelector};
use multiverse_core::types::DbId;
use multiverse_db::repositories::CharacterOverrideRepo;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::query::CharacterListParams;
use crate::state::AppState;

/// GET /api/characters?page=&name=
///
/// An upstream error status yields an empty page instead of an error.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<CharacterListParams>,
) -> AppResult<Json<CharacterPage>> {
    let mut listing = match state.catalog.list(params.page(), params.name()).await {
        Ok(listing) => listing,
        Err(CatalogError::ApiError { status, .. }) => {
            tracing::debug!(status, page = params.page(), "Catalog listing unavailable, serving empty page");
            return Ok(Json(CharacterPage::empty()));
        }
        Err(e) => return Err(e.into()),
    };

    let overrides = CharacterOverrideRepo::load_all(&state.store).await;
    listing.results = overlay_all(listing.results, &overrides);
    Ok(Json(listing))
}

/// GET /api/characters/{segment}
///
/// Dispatches on the shape of the segment: a single number is a lookup by
/// id, anything else is a batch lookup.
pub async fn get_by_selector(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> AppResult<Response> {
    match CharacterSelector::parse(&segment) {
        CharacterSelector::Single(raw_id) => {
            let character = get_by_id(&state, &raw_id).await?;
            Ok(Json(character).into_response())
        }
        CharacterSelector::Batch(ids) => {
            let characters = get_by_ids(&state, &ids).await?;
            Ok(Json(characters).into_response())
        }
    }
}

/// Batch lookup. An upstream error status yields an empty list.
pub async fn get_by_ids(state: &AppState, ids: &str) -> AppResult<Vec<CharacterRecord>> {
    let characters = match state.catalog.fetch_many(ids).await {
        Ok(characters) => characters,
        Err(CatalogError::ApiError { status, .. }) => {
            tracing::debug!(status, ids, "Catalog batch lookup missed, serving empty list");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let overrides = CharacterOverrideRepo::load_all(&state.store).await;
    Ok(overlay_all(characters, &overrides))
}

/// Single lookup. A live override is served without asking upstream.
pub async fn get_by_id(state: &AppState, raw_id: &str) -> AppResult<CharacterRecord> {
    let id = parse_character_id(raw_id)?;

    if let Some(local) = CharacterOverrideRepo::find_active(&state.store, id).await {
        return Ok(local);
    }
    fetch_upstream(state, id).await
}

/// PUT /api/characters/{id}
///
/// Merges the payload over the live override, else over the upstream
/// character, and stores the result as the override. A soft-deleted
/// character is 404.
pub async fn upsert_override(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<CharacterRecord>> {
    let id = parse_character_id(&raw_id)?;
    let Json(payload) = payload?;
    let patch = into_object(payload, "Character update")?;

    let base = upstream_base_if_absent(&state, id).await?;
    CharacterOverrideRepo::merge(&state.store, id, base, patch)
        .await?
        .map(Json)
        .ok_or_else(|| CoreError::not_found("Character", id).into())
}

/// DELETE /api/characters/{id}
///
/// Soft-deletes the override, snapshotting the upstream character first when
/// no override exists yet.
pub async fn delete_override(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_character_id(&raw_id)?;

    let snapshot = upstream_base_if_absent(&state, id).await?;
    if CharacterOverrideRepo::soft_delete(&state.store, id, snapshot).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::not_found("Character", id).into())
    }
}

/// Upstream record to fall back on when no override is stored for `id`.
///
/// Overrides are never removed, so a record seen here is still present once
/// the repository holds the store lock.
async fn upstream_base_if_absent(state: &AppState, id: DbId) -> AppResult<Option<CharacterRecord>> {
    if CharacterOverrideRepo::find(&state.store, id).await.is_some() {
        return Ok(None);
    }
    fetch_upstream(state, id).await.map(Some)
}

/// Fetch one upstream character, turning an upstream error status into 404.
async fn fetch_upstream(state: &AppState, id: DbId) -> AppResult<CharacterRecord> {
    state.catalog.fetch_one(id).await.map_err(|err| match err {
        CatalogError::ApiError { status, .. } => {
            tracing::debug!(status, character_id = id, "Character not found upstream");
            AppError::Core(CoreError::not_found("Character", id))
        }
        other => other.into(),
    })
}
