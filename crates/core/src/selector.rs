//! Dispatch for the `/characters/{segment}` path segment.
//!
//! A single numeric segment is a lookup by id. Anything else (a comma list
//! such as `1,2,3`, or a non-numeric token) is forwarded to the upstream
//! batch endpoint as-is.

use crate::error::CoreError;
use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharacterSelector {
    Single(String),
    Batch(String),
}

impl CharacterSelector {
    pub fn parse(segment: &str) -> Self {
        if !segment.contains(',') && is_numeric(segment) {
            CharacterSelector::Single(segment.to_string())
        } else {
            CharacterSelector::Batch(segment.to_string())
        }
    }
}

/// Parse a character id, rejecting anything that is not an integer.
pub fn parse_character_id(raw: &str) -> Result<DbId, CoreError> {
    raw.trim()
        .parse::<DbId>()
        .map_err(|_| CoreError::Validation(format!("Invalid character id: {raw}")))
}

fn is_numeric(segment: &str) -> bool {
    let trimmed = segment.trim();
    !trimmed.is_empty()
        && trimmed
            .parse::<f64>()
            .is_ok_and(|n| n.is_finite())
}
