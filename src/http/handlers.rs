//! Student endpoints.
//!
//! A create request runs decode → validate → persist → respond and stops at
//! the first failing step. Every path produces exactly one response.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::request::RequestIdExt;
use crate::http::response::{general_error, respond, validation_error};
use crate::http::server::AppState;
use crate::storage::{Storage, StorageError};
use crate::students::{validate, Created, NewStudent, StudentId, Violations};

/// Body of the liveness endpoint.
pub const READY_BODY: &str = "welcome to student service";

/// Message sent to clients when the store fails. Internal detail stays in the logs.
pub const INTERNAL_STORAGE_ERROR: &str = "internal storage error";

/// The request body could not be turned into a payload.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("request body is empty")]
    Empty,

    #[error("malformed request body: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Why a create request did not produce a student.
#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Invalid(#[from] Violations),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl IntoResponse for CreateError {
    fn into_response(self) -> Response {
        match self {
            CreateError::Decode(err) => general_error(err).into_response(),
            CreateError::Invalid(violations) => validation_error(&violations).into_response(),
            // Every store failure is a 500; the client only learns that the store failed.
            CreateError::Storage(_) => respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                &general_error(INTERNAL_STORAGE_ERROR),
            ),
        }
    }
}

/// Decode a create payload from raw body bytes.
pub fn decode(body: &[u8]) -> Result<NewStudent, DecodeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::Empty);
    }
    Ok(serde_json::from_slice(body)?)
}

/// Run one create request against `storage`.
///
/// The store is called at most once, and only with a validated record.
pub async fn create(storage: &dyn Storage, body: &[u8]) -> Result<StudentId, CreateError> {
    let payload = decode(body)?;
    let student = validate(payload)?;
    Ok(storage.create_student(&student).await?)
}

/// `POST /api/students`
pub async fn create_student(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request_id = headers.request_id();

    match create(state.storage.as_ref(), &body).await {
        Ok(id) => {
            tracing::info!(request_id = %request_id, student_id = %id, "Student created");
            respond(StatusCode::CREATED, &Created { id })
        }
        Err(err) => {
            match &err {
                CreateError::Storage(e) => tracing::error!(
                    request_id = %request_id,
                    kind = e.kind(),
                    error = %e,
                    "Failed to persist student"
                ),
                other => tracing::debug!(
                    request_id = %request_id,
                    error = %other,
                    "Rejected create request"
                ),
            }
            err.into_response()
        }
    }
}

/// `GET /api/students/{id}`
pub async fn get_student(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Response {
    let request_id = headers.request_id();

    let id = match raw_id.parse::<i64>() {
        Ok(id) => StudentId(id),
        Err(e) => return general_error(format!("invalid student id {raw_id:?}: {e}")).into_response(),
    };

    match state.storage.get_student(id).await {
        Ok(Some(student)) => respond(StatusCode::OK, &student),
        Ok(None) => respond(
            StatusCode::NOT_FOUND,
            &general_error(format!("student {id} not found")),
        ),
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                student_id = %id,
                kind = e.kind(),
                error = %e,
                "Failed to read student"
            );
            respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                &general_error(INTERNAL_STORAGE_ERROR),
            )
        }
    }
}

/// `GET /api/ready`
pub async fn ready() -> &'static str {
    READY_BODY
}
