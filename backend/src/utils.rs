use shared::Error;
use uuid::Uuid;

pub fn parse_item_id(id: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(id).map_err(|_| Error::invalid("Invalid item ID"))
}

pub fn parse_user_id(id: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(id).map_err(|_| Error::invalid("Invalid user ID"))
}

/// Requested leaderboard size, falling back to `default` and capped at `max`.
pub fn clamp_limit(requested: Option<usize>, default: usize, max: usize) -> usize {
    requested.unwrap_or(default).clamp(1, max.max(1))
}
