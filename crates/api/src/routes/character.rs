//! Route definitions for the `/characters` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::character;
use crate::state::AppState;

/// Routes mounted at `/characters`.
///
/// ```text
/// GET    /                   -> list
/// GET    /{segment}          -> get_by_selector (numeric id or batch list)
/// PUT    /{segment}          -> upsert_override
/// DELETE /{segment}          -> delete_override
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(character::list)).route(
        "/{segment}",
        get(character::get_by_selector)
            .put(character::upsert_override)
            .delete(character::delete_override),
    )
}
