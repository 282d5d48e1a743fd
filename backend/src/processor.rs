use shared::{
    normalize_ballot, validate_item_name, ErrorCode, Item, ItemSummary, Result, VoteReceipt, VotedItems,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use crate::store::ItemStore;

/// Wishlist operations over an injected store. Callers are expected to have
/// authenticated (and, for item lifecycle, authorized) the user already.
pub struct VoteProcessor;

impl VoteProcessor {
    #[instrument(skip(store, selected), fields(user_id = %user_id, selected = selected.len()))]
    pub async fn submit_votes(store: &dyn ItemStore, user_id: Uuid, selected: &[Uuid]) -> Result<VoteReceipt> {
        let ballot = normalize_ballot(selected)?;

        match store.record_votes(user_id, &ballot).await {
            Ok(tally) => {
                info!("✓ User {} voted for {} items ({} skipped)", user_id, tally.updated.len(), tally.skipped.len());
                Ok(tally.into())
            }
            Err(e) if e.code == ErrorCode::AlreadyVoted => {
                debug!("Rejected repeat vote from {}: {}", user_id, e.message);
                Err(e)
            }
            Err(e) => {
                warn!("✗ Failed to record votes for {}: {}", user_id, e);
                Err(e)
            }
        }
    }

    pub async fn voted_items(store: &dyn ItemStore, user_id: Uuid) -> Result<VotedItems> {
        let ids = store.voted_item_ids(user_id).await?;
        Ok(VotedItems { success: true, product_ids: ids.into_iter().collect() })
    }

    pub async fn top_voted(store: &dyn ItemStore, limit: usize) -> Result<Vec<ItemSummary>> {
        store.top_voted(Some(limit)).await
    }

    pub async fn list_with_votes(store: &dyn ItemStore) -> Result<Vec<ItemSummary>> {
        store.top_voted(None).await
    }

    #[instrument(skip(store))]
    pub async fn add_voteable_item(store: &dyn ItemStore, name: &str) -> Result<Item> {
        let name = validate_item_name(name)?;
        let item = store.insert_item(Item::voteable(name)).await?;
        info!("✓ Added wishlist item {} ({})", item.name, item.id);
        Ok(item)
    }

    #[instrument(skip(store))]
    pub async fn remove_voteable_item(store: &dyn ItemStore, id: Uuid) -> Result<Item> {
        let item = store.remove_voteable_item(id).await?;
        info!("🗑️ Removed wishlist item {} with {} votes", item.name, item.vote_count());
        Ok(item)
    }
}
