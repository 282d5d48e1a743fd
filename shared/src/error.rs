use serde::{Serialize, Deserialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    #[error("Invalid request")]
    InvalidRequest,
    #[error("Authentication required")]
    Unauthorized,
    #[error("Operation not permitted")]
    Forbidden,
    #[error("Already voted")]
    AlreadyVoted,
    #[error("Duplicate name")]
    DuplicateName,
    #[error("Resource not found")]
    NotFound,
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Internal system error")]
    SystemError,
}

#[cfg(feature = "backend")]
impl ErrorCode {
    pub fn status(self) -> rocket::http::Status {
        use rocket::http::Status;
        match self {
            ErrorCode::InvalidRequest => Status::BadRequest,
            ErrorCode::Unauthorized => Status::Unauthorized,
            ErrorCode::Forbidden => Status::Forbidden,
            ErrorCode::AlreadyVoted | ErrorCode::DuplicateName => Status::Conflict,
            ErrorCode::NotFound => Status::NotFound,
            ErrorCode::RateLimited => Status::TooManyRequests,
            ErrorCode::SystemError => Status::InternalServerError,
        }
    }
}

/// An item the caller had already voted for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteConflict {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<VoteConflict>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(details) = &self.details {
            write!(f, "{}: {} ({})", self.code, self.message, details)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            conflicts: Vec::new(),
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Some(details.into()),
            conflicts: Vec::new(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn duplicate_name(name: &str) -> Self {
        Self::new(
            ErrorCode::DuplicateName,
            format!("Wishlist item \"{}\" already exists", name),
        )
    }

    pub fn already_voted(conflicts: Vec<VoteConflict>) -> Self {
        let names = conflicts.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", ");
        Self {
            code: ErrorCode::AlreadyVoted,
            message: format!("You have already voted for: {}", names),
            details: None,
            conflicts,
        }
    }

    /// Storage failure. The cause goes into `details`, which the HTTP layer logs but never returns.
    pub fn storage(details: impl fmt::Display) -> Self {
        Self::with_details(ErrorCode::SystemError, "Storage operation failed", details.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
