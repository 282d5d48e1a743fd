use serde::{Serialize, Deserialize};
use std::collections::BTreeSet;
use time::OffsetDateTime;
use uuid::Uuid;

/// A record in the product collection. Wishlist candidates and regular catalog
/// products share the collection and are told apart by `is_voteable`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", from = "StoredItem")]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub is_voteable: bool,
    vote_count: u32,
    voters: BTreeSet<Uuid>,
    pub created_at: OffsetDateTime,
    #[serde(skip)]
    pub seq: u64,
}

impl Item {
    pub fn voteable(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    pub fn catalog(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    fn new(name: impl Into<String>, is_voteable: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            is_voteable,
            vote_count: 0,
            voters: BTreeSet::new(),
            created_at: OffsetDateTime::now_utc(),
            seq: 0,
        }
    }

    /// Rebuilds an item loaded from storage; the count is derived from `voters`.
    pub fn from_parts(
        id: Uuid,
        name: String,
        is_voteable: bool,
        voters: impl IntoIterator<Item = Uuid>,
        created_at: OffsetDateTime,
        seq: u64,
    ) -> Self {
        let voters: BTreeSet<Uuid> = voters.into_iter().collect();
        Self {
            id,
            name,
            is_voteable,
            vote_count: voters.len() as u32,
            voters,
            created_at,
            seq,
        }
    }

    pub fn vote_count(&self) -> u32 {
        self.vote_count
    }

    pub fn voters(&self) -> &BTreeSet<Uuid> {
        &self.voters
    }

    pub fn has_voted(&self, user_id: &Uuid) -> bool {
        self.voters.contains(user_id)
    }

    /// Adds `user_id` to the voter set. Returns false, leaving the count alone,
    /// when the user was already a member.
    pub fn add_voter(&mut self, user_id: Uuid) -> bool {
        if !self.voters.insert(user_id) {
            return false;
        }
        self.vote_count += 1;
        true
    }

    pub fn summary(&self) -> ItemSummary {
        ItemSummary {
            id: self.id,
            name: self.name.clone(),
            vote_count: self.vote_count,
        }
    }
}

/// Incoming form of `Item`. Any `voteCount` on the wire is ignored and rebuilt
/// from `voters`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredItem {
    id: Uuid,
    name: String,
    is_voteable: bool,
    #[serde(default)]
    voters: Vec<Uuid>,
    created_at: OffsetDateTime,
}

impl From<StoredItem> for Item {
    fn from(s: StoredItem) -> Self {
        Item::from_parts(s.id, s.name, s.is_voteable, s.voters, s.created_at, 0)
    }
}

/// Leaderboard row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub id: Uuid,
    pub name: String,
    pub vote_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub selected: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub name: String,
}

/// What a vote submission changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteTally {
    pub updated: Vec<Uuid>,
    pub skipped: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub success: bool,
    pub message: String,
    pub votes_updated: usize,
    pub updated: Vec<Uuid>,
    pub skipped: Vec<Uuid>,
}

impl From<VoteTally> for VoteReceipt {
    fn from(tally: VoteTally) -> Self {
        let n = tally.updated.len();
        Self {
            success: true,
            message: format!("Successfully voted for {} item{}", n, if n == 1 { "" } else { "s" }),
            votes_updated: n,
            updated: tally.updated,
            skipped: tally.skipped,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VotedItems {
    pub success: bool,
    pub product_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub success: bool,
    pub message: String,
    pub data: Item,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub success: bool,
    pub data: Vec<ItemSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}
