use std::collections::{BTreeSet, HashSet};
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;
use shared::{Error, Item, ItemSummary, Result, VoteConflict, VoteTally};
use crate::store::ItemStore;

const VOTEABLE_NAME_INDEX: &str = "items_voteable_name_key";

#[derive(sqlx::FromRow)]
struct ItemRecord {
    id: Uuid,
    name: String,
    is_voteable: bool,
    voters: Vec<Uuid>,
    created_at: OffsetDateTime,
    seq: i64,
}

impl From<ItemRecord> for Item {
    fn from(r: ItemRecord) -> Self {
        Item::from_parts(r.id, r.name, r.is_voteable, r.voters, r.created_at, r.seq as u64)
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRecord {
    id: Uuid,
    name: String,
    vote_count: i32,
}

impl From<SummaryRecord> for ItemSummary {
    fn from(r: SummaryRecord) -> Self {
        ItemSummary { id: r.id, name: r.name, vote_count: r.vote_count.max(0) as u32 }
    }
}

#[derive(sqlx::FromRow)]
struct TargetRecord {
    id: Uuid,
    name: String,
    voted: bool,
}

/// Postgres-backed store over `catalog.items`.
///
/// The schema keeps `vote_count = cardinality(voters)` as a CHECK constraint
/// and voteable names unique through a partial index.
pub struct PgItemStore {
    pool: PgPool,
}

impl PgItemStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_duplicate_name(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.constraint())
        .map_or(false, |c| c == VOTEABLE_NAME_INDEX)
}

#[rocket::async_trait]
impl ItemStore for PgItemStore {
    async fn insert_item(&self, item: Item) -> Result<Item> {
        sqlx::query_as::<_, ItemRecord>(
            "INSERT INTO catalog.items (id, name, is_voteable, vote_count, voters, created_at)
             VALUES ($1, $2, $3, 0, '{}', $4)
             RETURNING id, name, is_voteable, voters, created_at, seq"
        )
        .bind(item.id)
        .bind(&item.name)
        .bind(item.is_voteable)
        .bind(item.created_at)
        .fetch_one(&self.pool)
        .await
        .map(Item::from)
        .map_err(|e| if is_duplicate_name(&e) {
            Error::duplicate_name(item.name.trim())
        } else {
            Error::storage(e)
        })
    }

    async fn get_item(&self, id: Uuid) -> Result<Option<Item>> {
        sqlx::query_as::<_, ItemRecord>(
            "SELECT id, name, is_voteable, voters, created_at, seq
             FROM catalog.items WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map(|r| r.map(Item::from))
        .map_err(Error::storage)
    }

    async fn remove_voteable_item(&self, id: Uuid) -> Result<Item> {
        sqlx::query_as::<_, ItemRecord>(
            "DELETE FROM catalog.items WHERE id = $1 AND is_voteable
             RETURNING id, name, is_voteable, voters, created_at, seq"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::storage)?
        .map(Item::from)
        .ok_or_else(|| Error::not_found("Wishlist item not found"))
    }

    async fn record_votes(&self, user_id: Uuid, item_ids: &[Uuid]) -> Result<VoteTally> {
        if item_ids.is_empty() {
            return Err(Error::invalid("No products selected for voting"));
        }

        let mut tx = self.pool.begin().await.map_err(Error::storage)?;

        // Row locks in id order serialize overlapping submissions without deadlocking.
        let targets = sqlx::query_as::<_, TargetRecord>(
            "SELECT id, name, voters @> ARRAY[$2]::uuid[] AS voted
             FROM catalog.items
             WHERE id = ANY($1) AND is_voteable
             ORDER BY id
             FOR UPDATE"
        )
        .bind(item_ids)
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(Error::storage)?;

        let conflicts: Vec<VoteConflict> = item_ids.iter()
            .filter_map(|id| targets.iter().find(|t| t.id == *id && t.voted))
            .map(|t| VoteConflict { id: t.id, name: t.name.clone() })
            .collect();

        if !conflicts.is_empty() {
            tx.rollback().await.map_err(Error::storage)?;
            return Err(Error::already_voted(conflicts));
        }

        let appended: HashSet<Uuid> = sqlx::query_scalar::<_, Uuid>(
            "UPDATE catalog.items
             SET voters = array_append(voters, $2), vote_count = vote_count + 1
             WHERE id = ANY($1) AND is_voteable AND NOT (voters @> ARRAY[$2]::uuid[])
             RETURNING id"
        )
        .bind(item_ids)
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(Error::storage)?
        .into_iter()
        .collect();

        tx.commit().await.map_err(Error::storage)?;

        // A repeated id only counts at its first occurrence.
        let mut seen = HashSet::new();
        let (updated, skipped): (Vec<Uuid>, Vec<Uuid>) = item_ids.iter()
            .copied()
            .partition(|id| appended.contains(id) && seen.insert(*id));
        debug!("Recorded {} votes for user {}, skipped {}", updated.len(), user_id, skipped.len());
        Ok(VoteTally { updated, skipped })
    }

    async fn voted_item_ids(&self, user_id: Uuid) -> Result<BTreeSet<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM catalog.items WHERE is_voteable AND voters @> ARRAY[$1]::uuid[]"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map(|ids| ids.into_iter().collect())
        .map_err(Error::storage)
    }

    async fn top_voted(&self, limit: Option<usize>) -> Result<Vec<ItemSummary>> {
        sqlx::query_as::<_, SummaryRecord>(
            "SELECT id, name, vote_count FROM catalog.items
             WHERE is_voteable
             ORDER BY vote_count DESC, seq ASC, id ASC
             LIMIT $1"
        )
        .bind(limit.map(|n| n.min(i64::MAX as usize) as i64))
        .fetch_all(&self.pool)
        .await
        .map(|rows| rows.into_iter().map(ItemSummary::from).collect())
        .map_err(Error::storage)
    }
}
