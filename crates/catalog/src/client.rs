//! REST client for the Rick and Morty character API.
//!
//! Wraps the `/character` endpoints (paged listing, batch and single lookup)
//! using [`reqwest`].

use std::time::Duration;

use async_trait::async_trait;
use multiverse_core::character::{CharacterPage, CharacterRecord};
use multiverse_core::types::DbId;
use serde_json::Value;

use crate::CharacterCatalog;

/// Default upstream base URL.
pub const DEFAULT_API_URL: &str = "https://rickandmortyapi.com/api";

/// HTTP client for the upstream catalog.
pub struct RickAndMortyApi {
    client: reqwest::Client,
    api_url: String,
}

/// Errors from the catalog REST layer.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Upstream returned a non-2xx status code.
    #[error("Catalog API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The body was JSON but not shaped like a character.
    #[error("Unexpected catalog payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RickAndMortyApi {
    /// Create a client for the given base URL, e.g. `https://rickandmortyapi.com/api`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(client, api_url))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`CatalogError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, CatalogError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::debug!(status = status.as_u16(), "Catalog returned non-success status");
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CatalogError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl CharacterCatalog for RickAndMortyApi {
    /// `GET /character/?page={page}&name={name}`
    async fn list(&self, page: u32, name: &str) -> Result<CharacterPage, CatalogError> {
        let response = self
            .client
            .get(format!("{}/character/", self.api_url))
            .query(&[("page", page.to_string().as_str()), ("name", name)])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `GET /character/{ids}`
    async fn fetch_many(&self, ids: &str) -> Result<Vec<CharacterRecord>, CatalogError> {
        let response = self
            .client
            .get(format!("{}/character/{}", self.api_url, ids))
            .send()
            .await?;

        let body: Value = Self::parse_response(response).await?;
        normalize_batch(body)
    }

    /// `GET /character/{id}`
    async fn fetch_one(&self, id: DbId) -> Result<CharacterRecord, CatalogError> {
        let response = self
            .client
            .get(format!("{}/character/{}", self.api_url, id))
            .send()
            .await?;

        Self::parse_response(response).await
    }
}

/// The batch endpoint answers with an array, or with a bare object when only
/// one id was requested.
fn normalize_batch(body: Value) -> Result<Vec<CharacterRecord>, CatalogError> {
    let records = match body {
        Value::Array(_) => serde_json::from_value(body)?,
        single => vec![serde_json::from_value(single)?],
    };
    Ok(records)
}
