//! Character records and the local overlay applied on top of upstream data.
//!
//! Upstream characters and local overrides share one shape: a JSON object
//! with a numeric `id`, an optional `isDeleted` soft-delete marker, and any
//! number of other attributes that are passed through untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::json::strip_reserved;
use crate::types::DbId;

/// A character as returned by the upstream catalog or stored as an override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DbId>,
    #[serde(
        rename = "isDeleted",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_deleted: Option<bool>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl CharacterRecord {
    pub fn is_deleted(&self) -> bool {
        self.is_deleted.unwrap_or(false)
    }

    /// Shallow-merge `patch` over this record. `id` and `isDeleted` in the
    /// patch are ignored.
    pub fn merge_patch(&mut self, patch: Map<String, Value>) {
        self.attributes.extend(strip_reserved(patch));
    }
}

/// Local overrides keyed by the character id rendered as a string.
pub type Overrides = BTreeMap<String, CharacterRecord>;

/// Key under which the override for `id` is stored.
pub fn override_key(id: DbId) -> String {
    id.to_string()
}

/// One page of the upstream character listing.
///
/// Top-level keys other than `info` and `results` are preserved so the
/// envelope can be handed back to clients as upstream shaped it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterPage {
    #[serde(default = "empty_object")]
    pub info: Value,
    #[serde(default)]
    pub results: Vec<CharacterRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CharacterPage {
    /// The `{ "info": {}, "results": [] }` envelope served when upstream is
    /// unavailable.
    pub fn empty() -> Self {
        Self {
            info: empty_object(),
            results: Vec::new(),
            extra: Map::new(),
        }
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Resolve a single upstream character against the local overrides.
///
/// A present override replaces the upstream record wholesale. Returns `None`
/// when the resolved record is soft-deleted.
pub fn overlay(upstream: CharacterRecord, overrides: &Overrides) -> Option<CharacterRecord> {
    let resolved = match upstream
        .id
        .and_then(|id| overrides.get(&override_key(id)))
    {
        Some(local) => local.clone(),
        None => upstream,
    };
    (!resolved.is_deleted()).then_some(resolved)
}

/// [`overlay`] applied to a list, preserving upstream order.
pub fn overlay_all(upstream: Vec<CharacterRecord>, overrides: &Overrides) -> Vec<CharacterRecord> {
    upstream
        .into_iter()
        .filter_map(|character| overlay(character, overrides))
        .collect()
}
