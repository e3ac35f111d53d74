//! JSON response encoding.
//!
//! # Responsibilities
//! - Set the JSON content type and status code
//! - Serialize the payload into the body
//! - Build the general / validation error bodies
//!
//! # Design Decisions
//! - Status and headers are set before the body is serialized. If
//!   serialization fails the body stays empty, the error is returned to the
//!   caller, and the headers already set are kept (no rollback)
//! - Error bodies share one shape: `{"Status":"Error","Error":"..."}`

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::students::Violations;

pub const STATUS_OK: &str = "OK";
pub const STATUS_ERROR: &str = "Error";

/// Body shape for error responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorBody {
    pub status: String,
    pub error: String,
}

/// Error body carrying any displayable error message.
pub fn general_error(err: impl std::fmt::Display) -> ErrorBody {
    ErrorBody {
        status: STATUS_ERROR.to_string(),
        error: err.to_string(),
    }
}

/// Error body carrying every violation, joined.
pub fn validation_error(violations: &Violations) -> ErrorBody {
    general_error(violations)
}

/// Serialization failed after status and headers were set.
#[derive(Debug, thiserror::Error)]
#[error("failed to encode response body: {source}")]
pub struct EncodeError {
    response: Response,
    source: serde_json::Error,
}

impl EncodeError {
    /// The headers-only response as it stood when encoding failed.
    pub fn into_response(self) -> Response {
        self.response
    }

    pub fn status(&self) -> StatusCode {
        self.response.status()
    }
}

/// Write `data` as JSON with `status`.
pub fn write_json<T>(status: StatusCode, data: &T) -> Result<Response, EncodeError>
where
    T: Serialize + ?Sized,
{
    let mut response = Response::new(Body::empty());
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    *response.status_mut() = status;

    match serde_json::to_vec(data) {
        Ok(bytes) => {
            *response.body_mut() = Body::from(bytes);
            Ok(response)
        }
        Err(source) => Err(EncodeError { response, source }),
    }
}

/// Like [`write_json`], but logs an encode failure and sends what was already written.
pub fn respond<T>(status: StatusCode, data: &T) -> Response
where
    T: Serialize + ?Sized,
{
    match write_json(status, data) {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(status = %err.status(), error = %err, "Response body not written");
            err.into_response()
        }
    }
}

impl IntoResponse for ErrorBody {
    fn into_response(self) -> Response {
        respond(StatusCode::BAD_REQUEST, &self)
    }
}
