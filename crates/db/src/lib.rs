//! Flat-file persistence for character overrides and posts.
//!
//! The whole store is one JSON document, read fresh for every operation and
//! rewritten in full after every mutation.

pub mod repositories;
pub mod store;

pub use store::{Document, JsonStore, StoreError};
