use std::collections::{BTreeSet, HashMap};
use std::cmp::Ordering;
use uuid::Uuid;
use crate::error::{Error, Result, VoteConflict};
use crate::models::{Item, ItemSummary, VoteTally};

/// In-process vote ledger over the product collection.
///
/// Every method that reads or writes voteable state filters on
/// `Item::is_voteable`, so catalog products stored alongside wishlist items are
/// never counted, ranked or deleted by accident.
#[derive(Debug, Default)]
pub struct Ledger {
    items: HashMap<Uuid, Item>,
    next_seq: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an item with no votes, assigning its insertion sequence.
    /// Voteable items must have a unique (trimmed) name among voteable items.
    pub fn insert(&mut self, item: Item) -> Result<Item> {
        if item.is_voteable {
            let name = item.name.trim();
            if self.voteable().any(|existing| existing.name.trim() == name) {
                return Err(Error::duplicate_name(name));
            }
        }
        let item = Item::from_parts(item.id, item.name, item.is_voteable, Vec::<Uuid>::new(), item.created_at, self.next_seq);
        self.next_seq += 1;
        self.items.insert(item.id, item.clone());
        Ok(item)
    }

    pub fn get(&self, id: &Uuid) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn voteable(&self) -> impl Iterator<Item = &Item> {
        self.items.values().filter(|item| item.is_voteable)
    }

    pub fn remove_voteable(&mut self, id: &Uuid) -> Result<Item> {
        match self.items.get(id) {
            Some(item) if item.is_voteable => {}
            _ => return Err(Error::not_found("Wishlist item not found")),
        }
        self.items.remove(id).ok_or_else(|| Error::not_found("Wishlist item not found"))
    }

    /// Voteable items among `item_ids` that already list `user_id` as a voter.
    pub fn conflicts(&self, user_id: &Uuid, item_ids: &[Uuid]) -> Vec<VoteConflict> {
        item_ids.iter()
            .filter_map(|id| self.items.get(id))
            .filter(|item| item.is_voteable && item.has_voted(user_id))
            .map(|item| VoteConflict { id: item.id, name: item.name.clone() })
            .collect()
    }

    /// Records one vote from `user_id` for each id, all or nothing.
    ///
    /// Rejects the whole batch with `AlreadyVoted` if any target already holds
    /// the user's vote. Ids that are missing or not voteable are skipped.
    pub fn cast_votes(&mut self, user_id: Uuid, item_ids: &[Uuid]) -> Result<VoteTally> {
        if item_ids.is_empty() {
            return Err(Error::invalid("No products selected for voting"));
        }

        let conflicts = self.conflicts(&user_id, item_ids);
        if !conflicts.is_empty() {
            return Err(Error::already_voted(conflicts));
        }

        let mut tally = VoteTally::default();
        for id in item_ids {
            match self.items.get_mut(id) {
                Some(item) if item.is_voteable => {
                    if item.add_voter(user_id) {
                        tally.updated.push(*id);
                    } else {
                        tally.skipped.push(*id);
                    }
                }
                _ => tally.skipped.push(*id),
            }
        }
        Ok(tally)
    }

    pub fn voted_by(&self, user_id: &Uuid) -> BTreeSet<Uuid> {
        self.voteable()
            .filter(|item| item.has_voted(user_id))
            .map(|item| item.id)
            .collect()
    }

    /// Voteable items by vote count, highest first. `None` returns all of them.
    pub fn top_voted(&self, limit: Option<usize>) -> Vec<ItemSummary> {
        let mut ranked: Vec<&Item> = self.voteable().collect();
        ranked.sort_unstable_by(|a, b| leaderboard_order(a, b));
        ranked.into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(Item::summary)
            .collect()
    }
}

/// Descending count, then insertion order, then id.
pub fn leaderboard_order(a: &Item, b: &Item) -> Ordering {
    b.vote_count().cmp(&a.vote_count())
        .then_with(|| a.seq.cmp(&b.seq))
        .then_with(|| a.id.cmp(&b.id))
}
