use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use multiverse_core::character::Overrides;
use multiverse_core::post::Post;
use serde::de::DeserializeOwned;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tokio::sync::{Mutex, MutexGuard};

/// The persisted document: `{ "characters": {...}, "posts": {...} }`.
///
/// Both maps are keyed by the record id rendered as a string. Records that do
/// not fit their typed shape are set aside on load and written back verbatim,
/// so a single hand-edited entry never costs the rest of the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub characters: Overrides,
    pub posts: BTreeMap<String, Post>,
    unrecognized: RawSections,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct RawSections {
    #[serde(default)]
    characters: Map<String, Value>,
    #[serde(default)]
    posts: Map<String, Value>,
}

impl Document {
    /// Whether `key` is already used in the `posts` section, malformed
    /// records included.
    pub fn contains_post(&self, key: &str) -> bool {
        self.posts.contains_key(key) || self.unrecognized.posts.contains_key(key)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawSections::deserialize(deserializer)?;
        let mut doc = Document::default();
        split_section(
            "characters",
            raw.characters,
            &mut doc.characters,
            &mut doc.unrecognized.characters,
        );
        split_section(
            "posts",
            raw.posts,
            &mut doc.posts,
            &mut doc.unrecognized.posts,
        );
        Ok(doc)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Document", 2)?;
        state.serialize_field(
            "characters",
            &Section {
                typed: &self.characters,
                raw: &self.unrecognized.characters,
            },
        )?;
        state.serialize_field(
            "posts",
            &Section {
                typed: &self.posts,
                raw: &self.unrecognized.posts,
            },
        )?;
        state.end()
    }
}

/// One section on its way back to disk. A typed record replaces a malformed
/// one stored under the same key.
struct Section<'a, T> {
    typed: &'a BTreeMap<String, T>,
    raw: &'a Map<String, Value>,
}

impl<T: Serialize> Serialize for Section<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in self.raw {
            if !self.typed.contains_key(key) {
                map.serialize_entry(key, value)?;
            }
        }
        for (key, record) in self.typed {
            map.serialize_entry(key, record)?;
        }
        map.end()
    }
}

fn split_section<T: DeserializeOwned>(
    section: &'static str,
    raw: Map<String, Value>,
    typed: &mut BTreeMap<String, T>,
    kept: &mut Map<String, Value>,
) {
    for (key, value) in raw {
        match T::deserialize(&value) {
            Ok(record) => {
                typed.insert(key, record);
            }
            Err(e) => {
                tracing::warn!(section, key = %key, error = %e, "Malformed record in store, keeping it verbatim");
                kept.insert(key, value);
            }
        }
    }
}

/// Errors surfaced by [`JsonStore::write`]. Reads never fail.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// JSON file accessor.
///
/// `read` swallows every failure and yields an empty [`Document`]; `write`
/// replaces the file contents wholesale. Writers should hold [`JsonStore::lock`]
/// across their read-modify-write cycle.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, falling back to an empty one if the file is
    /// missing or cannot be parsed.
    pub async fn read(&self) -> Document {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Store file not found, using empty document");
                return Document::default();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read store file, using empty document");
                return Document::default();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Store file is not a valid document, using empty document");
                Document::default()
            }
        }
    }

    /// Pretty-print `doc` and overwrite the backing file, creating parent
    /// directories on first write.
    pub async fn write(&self, doc: &Document) -> Result<(), StoreError> {
        let rendered = serde_json::to_string_pretty(doc)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, rendered).await?;
        Ok(())
    }

    /// Serialize writers within this process.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    /// Health probe: `true` when the file is absent or holds a valid document.
    pub async fn is_readable(&self) -> bool {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice::<Document>(&bytes).is_ok(),
            Err(e) => e.kind() == ErrorKind::NotFound,
        }
    }
}
