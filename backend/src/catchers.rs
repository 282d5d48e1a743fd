use rocket::{Request, catch, http::Status, serde::json::Json};
use serde::Serialize;
use shared::{Error, ErrorCode};

/// Set by request guards so catchers can report why a guard failed.
#[derive(Debug, Clone)]
pub struct GuardFailure(pub Option<Error>);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    success: bool,
    code: ErrorCode,
    message: String,
    status: u16,
}

fn respond(req: &Request, code: ErrorCode, fallback: &str, status: u16) -> Json<ErrorMessage> {
    let message = match &req.local_cache(|| GuardFailure(None)).0 {
        Some(error) if error.code == code => error.message.clone(),
        _ => fallback.into(),
    };

    Json(ErrorMessage { success: false, code, message, status })
}

#[catch(400)]
pub fn bad_request(req: &Request) -> Json<ErrorMessage> {
    respond(req, ErrorCode::InvalidRequest, "Invalid request parameters.", 400)
}

#[catch(401)]
pub fn unauthorized(req: &Request) -> Json<ErrorMessage> {
    respond(req, ErrorCode::Unauthorized, "Not authorized - please log in.", 401)
}

#[catch(403)]
pub fn forbidden(req: &Request) -> Json<ErrorMessage> {
    respond(req, ErrorCode::Forbidden, "Access forbidden.", 403)
}

#[catch(404)]
pub fn not_found(req: &Request) -> Json<ErrorMessage> {
    respond(req, ErrorCode::NotFound, "The requested resource was not found.", 404)
}

/// Bodies that parse as JSON but not as the expected shape are invalid
/// requests like any other.
#[catch(422)]
pub fn unprocessable(req: &Request) -> (Status, Json<ErrorMessage>) {
    (Status::BadRequest, respond(req, ErrorCode::InvalidRequest, "Malformed request body.", 400))
}

#[catch(429)]
pub fn too_many_requests(req: &Request) -> Json<ErrorMessage> {
    respond(req, ErrorCode::RateLimited, "Rate limit exceeded. Please wait before trying again.", 429)
}

#[catch(500)]
pub fn internal_error(req: &Request) -> Json<ErrorMessage> {
    respond(req, ErrorCode::SystemError, "An internal server error occurred.", 500)
}
