// ============================================
// Embedding Store
// ============================================
//
// Read-side contract against the wardrobe catalog. Items and their
// embeddings are produced by the external image analysis pipeline; this
// engine only ever reads them. Implement this trait to integrate with
// your existing catalog storage.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::models::WardrobeItem;

#[async_trait]
pub trait EmbeddingStore: Send + Sync {
    /// Fetch a single item by id.
    async fn get_item(&self, item_id: Uuid) -> Result<WardrobeItem>;

    /// Fetch all of a user's items that carry an embedding. Items still
    /// waiting on the analysis pipeline are not eligible and are excluded
    /// here, not downstream.
    async fn list_eligible(&self, user_id: Uuid) -> Result<Vec<WardrobeItem>>;
}

/// In-memory store used by tests and single-process deployments. The
/// mutation helpers live on the concrete type, not the trait: they stand
/// in for the tagging pipeline's writes.
#[derive(Default)]
pub struct InMemoryEmbeddingStore {
    items: DashMap<Uuid, WardrobeItem>,
}

impl InMemoryEmbeddingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_item(&self, item: WardrobeItem) {
        self.items.insert(item.id, item);
    }

    pub fn remove_item(&self, item_id: Uuid) -> Option<WardrobeItem> {
        self.items.remove(&item_id).map(|(_, item)| item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl EmbeddingStore for InMemoryEmbeddingStore {
    async fn get_item(&self, item_id: Uuid) -> Result<WardrobeItem> {
        self.items
            .get(&item_id)
            .map(|entry| entry.clone())
            .ok_or(EngineError::ItemNotFound(item_id))
    }

    async fn list_eligible(&self, user_id: Uuid) -> Result<Vec<WardrobeItem>> {
        Ok(self
            .items
            .iter()
            .filter(|entry| entry.owner_id == user_id && entry.has_embedding())
            .map(|entry| entry.clone())
            .collect())
    }
}
