//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Query parameters for the character listing (`?page=&name=`).
///
/// Both are forwarded to the upstream catalog; `page` defaults to 1 and
/// `name` to the empty filter.
#[derive(Debug, Default, Deserialize)]
pub struct CharacterListParams {
    pub page: Option<u32>,
    pub name: Option<String>,
}

impl CharacterListParams {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1)
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}
