//! Repository for the `characters` section: local overrides of upstream
//! characters.
//!
//! Writers take the store lock and re-read the document before deciding what
//! to write. Callers may fetch an upstream base outside the lock; it is only
//! used when no override exists once the lock is held.

use multiverse_core::character::{override_key, CharacterRecord, Overrides};
use multiverse_core::types::DbId;
use serde_json::{Map, Value};

use crate::store::{JsonStore, StoreError};

pub struct CharacterOverrideRepo;

impl CharacterOverrideRepo {
    /// Every stored override, deleted ones included.
    pub async fn load_all(store: &JsonStore) -> Overrides {
        store.read().await.characters
    }

    /// The override for `id`, deleted or not.
    pub async fn find(store: &JsonStore, id: DbId) -> Option<CharacterRecord> {
        Self::load_all(store).await.remove(&override_key(id))
    }

    /// The override for `id`, unless it is soft-deleted.
    pub async fn find_active(store: &JsonStore, id: DbId) -> Option<CharacterRecord> {
        Self::find(store, id).await.filter(|c| !c.is_deleted())
    }

    /// Merge `patch` over the live override for `id`, or over `base_if_absent`
    /// when there is no override yet. The stored `id` is forced to match the
    /// key.
    ///
    /// Returns `None` without writing when the override is soft-deleted, or
    /// when none exists and no base was supplied.
    pub async fn merge(
        store: &JsonStore,
        id: DbId,
        base_if_absent: Option<CharacterRecord>,
        patch: Map<String, Value>,
    ) -> Result<Option<CharacterRecord>, StoreError> {
        let key = override_key(id);
        let _guard = store.lock().await;
        let mut doc = store.read().await;

        let mut record = match doc.characters.get(&key) {
            Some(existing) if existing.is_deleted() => return Ok(None),
            Some(existing) => existing.clone(),
            None => match base_if_absent {
                Some(base) => base,
                None => return Ok(None),
            },
        };
        record.merge_patch(patch);
        record.id = Some(id);

        doc.characters.insert(key, record.clone());
        store.write(&doc).await?;

        tracing::info!(character_id = id, "Character override saved");
        Ok(Some(record))
    }

    /// Mark the override for `id` deleted, storing `snapshot_if_absent` as a
    /// deleted override when none exists yet.
    ///
    /// Returns `false` without writing when there is neither an override nor a
    /// snapshot.
    pub async fn soft_delete(
        store: &JsonStore,
        id: DbId,
        snapshot_if_absent: Option<CharacterRecord>,
    ) -> Result<bool, StoreError> {
        let key = override_key(id);
        let _guard = store.lock().await;
        let mut doc = store.read().await;

        match doc.characters.get_mut(&key) {
            Some(record) => record.is_deleted = Some(true),
            None => {
                let Some(mut snapshot) = snapshot_if_absent else {
                    return Ok(false);
                };
                snapshot.id = Some(id);
                snapshot.is_deleted = Some(true);
                doc.characters.insert(key, snapshot);
            }
        }
        store.write(&doc).await?;

        tracing::info!(character_id = id, "Character override marked as deleted");
        Ok(true)
    }
}
