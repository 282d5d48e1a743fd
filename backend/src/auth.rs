use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ring::hmac;
use rocket::http::Status;
use rocket::outcome::try_outcome;
use rocket::request::{FromRequest, Outcome};
use rocket::Request;
use shared::{Error, ErrorCode, Role, SessionClaims};
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;
use crate::catchers::GuardFailure;
use crate::routes::AppState;

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("No session token provided")]
    Missing,
    #[error("Malformed session token")]
    Malformed,
    #[error("Invalid session signature")]
    BadSignature,
    #[error("Session expired")]
    Expired,
}

/// Verifies session tokens issued by the authentication service.
///
/// A token is `base64url(claims json) "." base64url(HMAC-SHA256(payload))`,
/// where the MAC covers the encoded payload.
pub struct SessionKeys {
    key: hmac::Key,
}

impl SessionKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self { key: hmac::Key::new(hmac::HMAC_SHA256, secret) }
    }

    pub fn issue(&self, claims: &SessionClaims) -> Result<String, serde_json::Error> {
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
        let tag = hmac::sign(&self.key, payload.as_bytes());
        Ok(format!("{}.{}", payload, URL_SAFE_NO_PAD.encode(tag.as_ref())))
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let (payload, signature) = token.trim().split_once('.').ok_or(AuthError::Malformed)?;
        let signature = URL_SAFE_NO_PAD.decode(signature).map_err(|_| AuthError::Malformed)?;
        hmac::verify(&self.key, payload.as_bytes(), &signature).map_err(|_| AuthError::BadSignature)?;

        let json = URL_SAFE_NO_PAD.decode(payload).map_err(|_| AuthError::Malformed)?;
        let claims: SessionClaims = serde_json::from_slice(&json).map_err(|_| AuthError::Malformed)?;
        if claims.is_expired() {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }
}

fn session_token(req: &Request<'_>) -> Option<String> {
    req.headers()
        .get_one("Authorization")
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
        .or_else(|| req.cookies().get(SESSION_COOKIE).map(|c| c.value().to_string()))
}

fn reject<T>(req: &Request<'_>, status: Status, error: Error) -> Outcome<T, Error> {
    req.local_cache(|| GuardFailure(Some(error.clone())));
    Outcome::Error((status, error))
}

/// A caller with a verified session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthUser {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(state) = req.rocket().state::<AppState>() else {
            error!("AppState is not managed; cannot verify sessions");
            return reject(req, Status::InternalServerError, Error::new(ErrorCode::SystemError, "Server misconfigured"));
        };

        let verified = session_token(req)
            .ok_or(AuthError::Missing)
            .and_then(|token| state.sessions.verify(&token));

        match verified {
            Ok(claims) => Outcome::Success(AuthUser { id: claims.sub, role: claims.role }),
            Err(e) => {
                debug!("Rejected session on {}: {}", req.uri(), e);
                reject(req, Status::Unauthorized, Error::new(ErrorCode::Unauthorized, e.to_string()))
            }
        }
    }
}

/// A verified caller with the admin role.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub AuthUser);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let user = try_outcome!(req.guard::<AuthUser>().await);
        if !user.is_admin() {
            debug!("User {} denied admin access to {}", user.id, req.uri());
            return reject(req, Status::Forbidden, Error::new(ErrorCode::Forbidden, "Admin access required"));
        }
        Outcome::Success(AdminUser(user))
    }
}
