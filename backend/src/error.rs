use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use serde::Serialize;
use shared::{Error, ErrorCode, ValidationError};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl ApiError {
    pub fn status(&self) -> Status {
        self.0.code.status()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError(e.into())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    #[serde(flatten)]
    error: Error,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        let mut error = self.0;

        if error.code == ErrorCode::SystemError {
            error!("{} {} failed: {}", req.method(), req.uri(), error);
            error.details = None;
        }

        rocket::Response::build_from(Json(ErrorBody { success: false, error }).respond_to(req)?)
            .status(status)
            .ok()
    }
}
