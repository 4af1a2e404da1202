#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use multiverse_catalog::{CatalogError, CharacterCatalog};
use multiverse_core::character::{CharacterPage, CharacterRecord};
use multiverse_core::types::DbId;
use multiverse_db::JsonStore;
use serde_json::{json, Value};
use tokio::sync::Notify;
use tower::ServiceExt;

use multiverse_api::config::ServerConfig;
use multiverse_api::router::build_app_router;
use multiverse_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config(data_file: std::path::PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        data_file,
        catalog_base_url: "http://upstream.invalid/api".to_string(),
        catalog_timeout_secs: 1,
    }
}

// ---------------------------------------------------------------------------
// Stub upstream catalog
// ---------------------------------------------------------------------------

/// Parks the first `fetch_one` call until the test releases it.
#[derive(Default)]
pub struct FetchGate {
    pub entered: Notify,
    pub release: Notify,
    used: AtomicBool,
}

/// In-memory stand-in for the upstream catalog that counts every call.
#[derive(Default)]
pub struct StubCatalog {
    characters: BTreeMap<DbId, CharacterRecord>,
    unavailable: bool,
    calls: AtomicUsize,
    gate: Option<Arc<FetchGate>>,
}

impl StubCatalog {
    /// A catalog holding the given `(id, name)` characters.
    pub fn with_characters(characters: &[(DbId, &str)]) -> Self {
        let characters = characters
            .iter()
            .map(|(id, name)| (*id, character(*id, name)))
            .collect();
        Self {
            characters,
            ..Self::default()
        }
    }

    /// A catalog that answers every request with 503.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Hold the first single-character fetch at `gate`.
    pub fn gated(mut self, gate: Arc<FetchGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) -> Result<(), CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(CatalogError::ApiError {
                status: 503,
                body: "upstream down".into(),
            });
        }
        Ok(())
    }

    fn miss() -> CatalogError {
        CatalogError::ApiError {
            status: 404,
            body: r#"{"error":"Character not found"}"#.into(),
        }
    }
}

#[async_trait]
impl CharacterCatalog for StubCatalog {
    async fn list(&self, page: u32, name: &str) -> Result<CharacterPage, CatalogError> {
        self.record_call()?;
        let needle = name.to_lowercase();
        let results: Vec<CharacterRecord> = self
            .characters
            .values()
            .filter(|c| {
                c.attributes["name"]
                    .as_str()
                    .is_some_and(|n| n.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        if results.is_empty() {
            return Err(Self::miss());
        }
        Ok(CharacterPage {
            info: json!({"count": results.len(), "pages": 1, "page": page, "next": null, "prev": null}),
            results,
            extra: Default::default(),
        })
    }

    async fn fetch_many(&self, ids: &str) -> Result<Vec<CharacterRecord>, CatalogError> {
        self.record_call()?;
        let found: Vec<CharacterRecord> = ids
            .split(',')
            .filter_map(|raw| raw.trim().parse::<DbId>().ok())
            .filter_map(|id| self.characters.get(&id).cloned())
            .collect();
        if found.is_empty() {
            return Err(Self::miss());
        }
        Ok(found)
    }

    async fn fetch_one(&self, id: DbId) -> Result<CharacterRecord, CatalogError> {
        self.record_call()?;
        if let Some(gate) = &self.gate {
            if !gate.used.swap(true, Ordering::SeqCst) {
                gate.entered.notify_one();
                gate.release.notified().await;
            }
        }
        self.characters.get(&id).cloned().ok_or_else(Self::miss)
    }
}

pub fn character(id: DbId, name: &str) -> CharacterRecord {
    serde_json::from_value(json!({"id": id, "name": name, "status": "Alive"})).unwrap()
}

/// Write `record` straight into the store as the override for its id.
pub async fn seed_override(app: &TestApp, record: CharacterRecord) {
    let id = record.id.expect("seeded override needs an id");
    let mut doc = app.store().read().await;
    doc.characters.insert(id.to_string(), record);
    app.store().write(&doc).await.unwrap();
}

// ---------------------------------------------------------------------------
// Test application
// ---------------------------------------------------------------------------

/// A router wired to a temp-file store and a stub catalog.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub catalog: Arc<StubCatalog>,
    _dir: tempfile::TempDir,
}

impl TestApp {
    pub fn store(&self) -> &JsonStore {
        &self.state.store
    }
}

/// Build the full application router with all middleware layers, backed by
/// `catalog` and a fresh store in a temporary directory.
pub fn build_test_app(catalog: StubCatalog) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path().join("database.json"));
    let catalog = Arc::new(catalog);

    let state = AppState {
        store: Arc::new(JsonStore::new(&config.data_file)),
        catalog: catalog.clone(),
        config: Arc::new(config.clone()),
    };
    let router = build_app_router(state.clone(), &config);

    TestApp {
        router,
        state,
        catalog,
        _dir: dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, json: Value) -> Response {
    send(app, Method::POST, uri, Some(json)).await
}

pub async fn put_json(app: Router, uri: &str, json: Value) -> Response {
    send(app, Method::PUT, uri, Some(json)).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn expect_json(response: Response, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
