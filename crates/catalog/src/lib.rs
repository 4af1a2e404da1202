//! Client for the upstream character catalog.
//!
//! [`CharacterCatalog`] is the seam the HTTP handlers depend on; the
//! production implementation is [`client::RickAndMortyApi`].

pub mod client;

use async_trait::async_trait;
use multiverse_core::character::{CharacterPage, CharacterRecord};
use multiverse_core::types::DbId;

pub use client::{CatalogError, RickAndMortyApi};

/// Read-only access to upstream character data.
///
/// A non-2xx upstream response is reported as [`CatalogError::ApiError`] so
/// callers can decide per endpoint whether a miss is empty data or a 404.
#[async_trait]
pub trait CharacterCatalog: Send + Sync {
    /// One page of the listing, optionally filtered by name.
    async fn list(&self, page: u32, name: &str) -> Result<CharacterPage, CatalogError>;

    /// Several characters at once. `ids` is passed through verbatim, usually
    /// a comma-separated id list. A single-object response becomes a
    /// one-element list.
    async fn fetch_many(&self, ids: &str) -> Result<Vec<CharacterRecord>, CatalogError>;

    /// One character by id.
    async fn fetch_one(&self, id: DbId) -> Result<CharacterRecord, CatalogError>;
}
