use std::sync::Arc;

use multiverse_catalog::CharacterCatalog;
use multiverse_db::JsonStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// JSON document store for overrides and posts.
    pub store: Arc<JsonStore>,
    /// Upstream character catalog.
    pub catalog: Arc<dyn CharacterCatalog>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
