//! HTTP-level integration tests for the `/api/characters` endpoints.
//!
//! The upstream catalog is replaced by `StubCatalog`; overrides are seeded
//! straight into the store and verified through the HTTP API.

mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use std::sync::Arc;

use common::{
    body_json, build_test_app, character, delete, expect_json, get, put_json, seed_override,
    FetchGate, StubCatalog,
};
use multiverse_api::error::AppError;
use multiverse_api::handlers;
use multiverse_core::character::CharacterRecord;
use multiverse_core::error::CoreError;
use multiverse_db::repositories::CharacterOverrideRepo;
use serde_json::json;

fn rick_and_family() -> StubCatalog {
    StubCatalog::with_characters(&[
        (1, "Rick Sanchez"),
        (2, "Morty Smith"),
        (3, "Summer Smith"),
    ])
}

fn deleted(id: i64) -> CharacterRecord {
    let mut record = character(id, "gone");
    record.is_deleted = Some(true);
    record
}

fn ids(json: &serde_json::Value) -> Vec<i64> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_merges_overrides_and_hides_deleted() {
    let app = build_test_app(rick_and_family());
    seed_override(&app, character(1, "Pickle Rick")).await;
    seed_override(&app, deleted(2)).await;

    let json = expect_json(get(app.router.clone(), "/api/characters").await, StatusCode::OK).await;

    assert_eq!(json["info"]["count"], 3);
    assert_eq!(ids(&json["results"]), vec![1, 3]);
    assert_eq!(json["results"][0]["name"], "Pickle Rick");
    assert_eq!(json["results"][1]["name"], "Summer Smith");
}

#[tokio::test]
async fn list_forwards_page_and_name_filter() {
    let app = build_test_app(rick_and_family());

    let json = expect_json(
        get(app.router.clone(), "/api/characters?page=2&name=smith").await,
        StatusCode::OK,
    )
    .await;

    assert_eq!(json["info"]["page"], 2);
    assert_eq!(ids(&json["results"]), vec![2, 3]);
}

#[tokio::test]
async fn list_returns_empty_envelope_when_upstream_fails() {
    let app = build_test_app(StubCatalog::unavailable());

    let json = expect_json(get(app.router.clone(), "/api/characters").await, StatusCode::OK).await;

    assert_eq!(json, json!({"info": {}, "results": []}));
}

// ---------------------------------------------------------------------------
// Batch lookup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn batch_lookup_applies_overlay() {
    let app = build_test_app(rick_and_family());
    seed_override(&app, deleted(3)).await;

    let json = expect_json(get(app.router.clone(), "/api/characters/1,2,3").await, StatusCode::OK)
        .await;

    assert_eq!(ids(&json), vec![1, 2]);
}

#[tokio::test]
async fn non_numeric_segment_is_a_batch_lookup() {
    let app = build_test_app(rick_and_family());

    let json = expect_json(get(app.router.clone(), "/api/characters/abc").await, StatusCode::OK)
        .await;

    assert_eq!(json, json!([]));
    assert_eq!(app.catalog.calls(), 1);
}

// ---------------------------------------------------------------------------
// Single lookup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn single_lookup_prefers_override_without_upstream_call() {
    let app = build_test_app(rick_and_family());
    seed_override(&app, character(1, "Local Rick")).await;

    let json = expect_json(get(app.router.clone(), "/api/characters/1").await, StatusCode::OK)
        .await;

    assert_eq!(json["name"], "Local Rick");
    assert_eq!(app.catalog.calls(), 0);
}

#[tokio::test]
async fn single_lookup_falls_back_to_upstream() {
    let app = build_test_app(rick_and_family());

    let json = expect_json(get(app.router.clone(), "/api/characters/2").await, StatusCode::OK)
        .await;

    assert_eq!(json["name"], "Morty Smith");
    assert_eq!(app.catalog.calls(), 1);
}

#[tokio::test]
async fn single_lookup_with_deleted_override_returns_upstream_record() {
    let app = build_test_app(rick_and_family());
    seed_override(&app, deleted(2)).await;

    let json = expect_json(get(app.router.clone(), "/api/characters/2").await, StatusCode::OK)
        .await;

    assert_eq!(json["name"], "Morty Smith");
    assert!(json.get("isDeleted").is_none());
}

#[tokio::test]
async fn single_lookup_upstream_miss_is_404() {
    let app = build_test_app(rick_and_family());

    let json = expect_json(
        get(app.router.clone(), "/api/characters/999999").await,
        StatusCode::NOT_FOUND,
    )
    .await;

    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn non_integer_number_is_rejected() {
    let app = build_test_app(rick_and_family());

    let json = expect_json(
        get(app.router.clone(), "/api/characters/1.5").await,
        StatusCode::BAD_REQUEST,
    )
    .await;

    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(app.catalog.calls(), 0);
}

#[tokio::test]
async fn get_by_id_rejects_non_numeric_id() {
    let app = build_test_app(rick_and_family());

    let result = handlers::character::get_by_id(&app.state, "abc").await;

    assert_matches!(result, Err(AppError::Core(CoreError::Validation(_))));
    assert_eq!(app.catalog.calls(), 0);
}

// ---------------------------------------------------------------------------
// Override editing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn put_creates_override_from_upstream_record() {
    let app = build_test_app(rick_and_family());

    let json = expect_json(
        put_json(
            app.router.clone(),
            "/api/characters/1",
            json!({"name": "Evil Rick", "id": 42, "isDeleted": true}),
        )
        .await,
        StatusCode::OK,
    )
    .await;

    assert_eq!(json["id"], 1);
    assert_eq!(json["name"], "Evil Rick");
    assert_eq!(json["status"], "Alive");
    assert!(json.get("isDeleted").is_none());

    let stored = CharacterOverrideRepo::find_active(app.store(), 1)
        .await
        .expect("override stored");
    assert_eq!(stored.attributes["name"], "Evil Rick");
}

#[tokio::test]
async fn put_rejects_non_object_payload() {
    let app = build_test_app(rick_and_family());

    let response = put_json(app.router.clone(), "/api/characters/1", json!(["nope"])).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.catalog.calls(), 0);
}

#[tokio::test]
async fn put_for_unknown_character_is_404() {
    let app = build_test_app(rick_and_family());

    let response = put_json(app.router.clone(), "/api/characters/404", json!({"name": "x"})).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(CharacterOverrideRepo::load_all(app.store()).await.is_empty());
}

#[tokio::test]
async fn put_on_deleted_character_is_404_and_keeps_it_deleted() {
    let app = build_test_app(rick_and_family());
    seed_override(&app, deleted(2)).await;

    let response = put_json(app.router.clone(), "/api/characters/2", json!({"name": "Back"})).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let stored = CharacterOverrideRepo::find(app.store(), 2).await.unwrap();
    assert!(stored.is_deleted());
    assert_eq!(stored.attributes["name"], "gone");
}

#[tokio::test]
async fn put_edits_existing_override_without_upstream_call() {
    let app = build_test_app(rick_and_family());
    seed_override(&app, character(1, "Local Rick")).await;

    let json = expect_json(
        put_json(app.router.clone(), "/api/characters/1", json!({"status": "Dead"})).await,
        StatusCode::OK,
    )
    .await;

    assert_eq!(json["name"], "Local Rick");
    assert_eq!(json["status"], "Dead");
    assert_eq!(app.catalog.calls(), 0);
}

#[tokio::test]
async fn delete_completing_during_put_is_not_undone() {
    let gate = Arc::new(FetchGate::default());
    let app = build_test_app(rick_and_family().gated(gate.clone()));

    // The edit parks while fetching its upstream base.
    let edit = tokio::spawn(put_json(
        app.router.clone(),
        "/api/characters/1",
        json!({"name": "Evil Rick"}),
    ));
    gate.entered.notified().await;

    let response = delete(app.router.clone(), "/api/characters/1").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    gate.release.notify_one();
    let response = edit.await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let stored = CharacterOverrideRepo::find(app.store(), 1).await.unwrap();
    assert!(stored.is_deleted());
    assert_eq!(stored.attributes["name"], "Rick Sanchez");
}

#[tokio::test]
async fn delete_hides_character_from_listing() {
    let app = build_test_app(rick_and_family());

    let response = delete(app.router.clone(), "/api/characters/2").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(get(app.router.clone(), "/api/characters").await).await;
    assert_eq!(ids(&json["results"]), vec![1, 3]);

    let stored = CharacterOverrideRepo::load_all(app.store()).await;
    assert_eq!(stored["2"].is_deleted, Some(true));
    assert_eq!(stored["2"].attributes["name"], "Morty Smith");
}

#[tokio::test]
async fn delete_unknown_character_is_404() {
    let app = build_test_app(rick_and_family());

    let response = delete(app.router.clone(), "/api/characters/999999").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
