use std::collections::HashSet;
use uuid::Uuid;
use crate::error::Error;

pub const MAX_ITEM_NAME_LENGTH: usize = 80;
pub const MAX_ITEMS_PER_BALLOT: usize = 50;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Product name is required")]
    EmptyName,
    #[error("Product name exceeds maximum length of {MAX_ITEM_NAME_LENGTH}")]
    NameTooLong,
    #[error("No products selected for voting")]
    EmptyBallot,
    #[error("Too many products selected (maximum {MAX_ITEMS_PER_BALLOT})")]
    TooManyItems,
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::invalid(e.to_string())
    }
}

/// Returns the trimmed name of a new wishlist item.
pub fn validate_item_name(name: &str) -> Result<&str, ValidationError> {
    let name = name.trim();
    if name.is_empty() { return Err(ValidationError::EmptyName); }
    if name.chars().count() > MAX_ITEM_NAME_LENGTH { return Err(ValidationError::NameTooLong); }
    Ok(name)
}

/// Collapses repeated ids to their first occurrence and checks the ballot size.
pub fn normalize_ballot(selected: &[Uuid]) -> Result<Vec<Uuid>, ValidationError> {
    if selected.is_empty() { return Err(ValidationError::EmptyBallot); }

    let mut seen = HashSet::with_capacity(selected.len());
    let ballot: Vec<Uuid> = selected.iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    if ballot.len() > MAX_ITEMS_PER_BALLOT { return Err(ValidationError::TooManyItems); }
    Ok(ballot)
}
