use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;
use shared::{Error, Item, ItemSummary, Ledger, Result, VoteTally};

/// Storage handle for the product collection.
///
/// `record_votes` must perform the duplicate check and the write as one
/// atomic step: a user may never end up in an item's voter set twice, and a
/// rejected batch must leave every item untouched.
#[rocket::async_trait]
pub trait ItemStore: Send + Sync {
    async fn insert_item(&self, item: Item) -> Result<Item>;

    async fn get_item(&self, id: Uuid) -> Result<Option<Item>>;

    /// Deletes a voteable item. Catalog products are reported as `NotFound`.
    async fn remove_voteable_item(&self, id: Uuid) -> Result<Item>;

    async fn record_votes(&self, user_id: Uuid, item_ids: &[Uuid]) -> Result<VoteTally>;

    async fn voted_item_ids(&self, user_id: Uuid) -> Result<BTreeSet<Uuid>>;

    /// Voteable items ranked by vote count; `None` means no limit.
    async fn top_voted(&self, limit: Option<usize>) -> Result<Vec<ItemSummary>>;
}

pub type SharedStore = Arc<dyn ItemStore>;

/// Process-local store. The mutex is held across the whole of each
/// operation, which makes `record_votes` atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ledger: Mutex<Ledger>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Ledger>> {
        self.ledger.lock().map_err(|e| Error::storage(format!("ledger lock poisoned: {}", e)))
    }
}

#[rocket::async_trait]
impl ItemStore for MemoryStore {
    async fn insert_item(&self, item: Item) -> Result<Item> {
        self.lock()?.insert(item)
    }

    async fn get_item(&self, id: Uuid) -> Result<Option<Item>> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn remove_voteable_item(&self, id: Uuid) -> Result<Item> {
        self.lock()?.remove_voteable(&id)
    }

    async fn record_votes(&self, user_id: Uuid, item_ids: &[Uuid]) -> Result<VoteTally> {
        self.lock()?.cast_votes(user_id, item_ids)
    }

    async fn voted_item_ids(&self, user_id: Uuid) -> Result<BTreeSet<Uuid>> {
        Ok(self.lock()?.voted_by(&user_id))
    }

    async fn top_voted(&self, limit: Option<usize>) -> Result<Vec<ItemSummary>> {
        Ok(self.lock()?.top_voted(limit))
    }
}
