//! Repository for the `posts` section of the document.

use multiverse_core::post::{NewPost, Post, PostPatch};
use multiverse_core::types::DbId;

use crate::store::{Document, JsonStore, StoreError};

/// Provides CRUD operations for posts. Deletion is always soft.
pub struct PostRepo;

impl PostRepo {
    /// All posts not marked deleted, ordered by id ascending.
    pub async fn list_active(store: &JsonStore) -> Vec<Post> {
        let doc = store.read().await;
        let mut posts: Vec<Post> = doc.posts.into_values().filter(|p| !p.is_deleted).collect();
        posts.sort_by_key(|p| p.id);
        posts
    }

    /// Find a post by id. Excludes soft-deleted posts.
    pub async fn find_active(store: &JsonStore, id: &str) -> Option<Post> {
        store
            .read()
            .await
            .posts
            .remove(id)
            .filter(|p| !p.is_deleted)
    }

    /// Store a new post under a fresh timestamp id and return it.
    pub async fn create(store: &JsonStore, input: NewPost) -> Result<Post, StoreError> {
        let _guard = store.lock().await;
        let mut doc = store.read().await;

        let id = next_post_id(&doc, chrono::Utc::now().timestamp_millis());
        let post = input.into_post(id);
        doc.posts.insert(id.to_string(), post.clone());
        store.write(&doc).await?;

        tracing::info!(post_id = id, "Post created");
        Ok(post)
    }

    /// Merge `patch` into an existing, non-deleted post.
    ///
    /// Returns `None` if no such post exists.
    pub async fn update(
        store: &JsonStore,
        id: &str,
        patch: PostPatch,
    ) -> Result<Option<Post>, StoreError> {
        let _guard = store.lock().await;
        let mut doc = store.read().await;

        let Some(post) = doc.posts.get_mut(id).filter(|p| !p.is_deleted) else {
            return Ok(None);
        };
        post.apply(patch);
        let updated = post.clone();
        store.write(&doc).await?;

        tracing::info!(post_id = updated.id, "Post updated");
        Ok(Some(updated))
    }

    /// Mark a post deleted. Returns `true` if the post exists, whether or not
    /// it was already deleted.
    pub async fn soft_delete(store: &JsonStore, id: &str) -> Result<bool, StoreError> {
        let _guard = store.lock().await;
        let mut doc = store.read().await;

        let Some(post) = doc.posts.get_mut(id) else {
            return Ok(false);
        };
        post.is_deleted = true;
        store.write(&doc).await?;

        tracing::info!(post_id = %id, "Post marked as deleted");
        Ok(true)
    }
}

/// Timestamp-based id, bumped forward until it does not collide with an
/// existing post (malformed ones included).
fn next_post_id(doc: &Document, now_millis: DbId) -> DbId {
    let mut id = now_millis;
    while doc.contains_post(&id.to_string()) {
        id += 1;
    }
    id
}
