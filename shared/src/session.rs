use serde::{Serialize, Deserialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

/// Identity asserted by the authentication service and carried in the session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(sub: Uuid, role: Role, ttl: time::Duration) -> Self {
        Self {
            sub,
            role,
            exp: (OffsetDateTime::now_utc() + ttl).unix_timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc().unix_timestamp() >= self.exp
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
