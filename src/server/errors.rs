//! Errors returned to HTTP clients.
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use derive_more::Display;

/// Errors that can be returned by the server.
#[derive(Debug, Display)]
pub enum HTTPError {
    /// The request body could not be understood.
    #[display(fmt = "Malformed request: {reason}")]
    BadRequest {
        /// What was wrong with the request.
        reason: String,
    },
    /// No build record with the requested id.
    #[display(fmt = "Build not found")]
    BuildNotFound,
    /// Something went wrong on our side.
    #[display(fmt = "Internal server error")]
    InternalServerError,
}

impl ResponseError for HTTPError {
    fn status_code(&self) -> StatusCode {
        match *self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::BuildNotFound => StatusCode::NOT_FOUND,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}
