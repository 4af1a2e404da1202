//! Post entity model and DTOs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::json::{into_object, is_truthy, strip_reserved};
use crate::types::DbId;

/// A post as persisted in the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: DbId,
    #[serde(rename = "isDeleted", default)]
    pub is_deleted: bool,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Post {
    pub fn title(&self) -> Option<&Value> {
        self.fields.get("title")
    }

    /// Shallow-merge a validated patch. `id` and `isDeleted` never change here.
    pub fn apply(&mut self, patch: PostPatch) {
        self.fields.extend(patch.fields);
    }
}

/// DTO for creating a new post. Requires a truthy `title`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub fields: Map<String, Value>,
}

impl NewPost {
    pub fn from_payload(payload: Value) -> Result<Self, CoreError> {
        let fields = strip_reserved(into_object(payload, "Post")?);
        if !fields.get("title").is_some_and(is_truthy) {
            return Err(CoreError::Validation("Post title is required".into()));
        }
        Ok(Self { fields })
    }

    /// Materialize the post under a server-assigned id.
    pub fn into_post(self, id: DbId) -> Post {
        Post {
            id,
            is_deleted: false,
            fields: self.fields,
        }
    }
}

/// DTO for a partial update. Any object is accepted; reserved keys are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct PostPatch {
    pub fields: Map<String, Value>,
}

impl PostPatch {
    pub fn from_payload(payload: Value) -> Result<Self, CoreError> {
        Ok(Self {
            fields: strip_reserved(into_object(payload, "Post update")?),
        })
    }
}
