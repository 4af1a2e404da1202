pub mod character;
pub mod health;
pub mod post;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /characters                  list (upstream + overrides)
/// /characters/{segment}        single or batch lookup, override upsert/delete
///
/// /posts                       list, create
/// /posts/{id}                  get, update, soft-delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/characters", character::router())
        .nest("/posts", post::router())
}
