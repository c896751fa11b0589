//! JSON envelope shared by every `/api/v1` response.
//!
//! Success: `{ "data": ..., "meta": ... }`. Failure:
//! `{ "error": { "code": "...", "message": "..." }, "meta": ... }` where
//! `code` is an [`ErrorCode`] clients can branch on. Optimizer failures map
//! onto codes through `From<&ClosureError>`.

use axum::extract::rejection::JsonRejection;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::optimization::{ClosureError, ValidationError};

/// Identifies this service in every response.
pub const SERVICE_NAME: &str = "well-closure";

/// Version of the `/api/v1` wire format.
pub const API_VERSION: &str = "1";

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub service: &'static str,
    pub api_version: &'static str,
    pub build: &'static str,
    pub timestamp: String,
}

impl ResponseMeta {
    pub fn now() -> Self {
        Self {
            service: SERVICE_NAME,
            api_version: API_VERSION,
            build: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DataBody<T> {
    data: T,
    meta: ResponseMeta,
}

/// `200 OK` with `data` wrapped in the envelope.
pub fn ok<T: Serialize>(data: T) -> Response {
    Json(DataBody {
        data,
        meta: ResponseMeta::now(),
    })
    .into_response()
}

// ============================================================================
// Errors
// ============================================================================

/// Machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Body is not a well-formed optimize request
    InvalidBody,
    PayloadTooLarge,
    /// Wells, target, horizon or cap rejected before searching
    ValidationFailed,
    /// Too many combinations to count
    SearchSpaceTooLarge,
    /// Neither inline wells nor a loaded table
    NoWellTable,
    /// The blocking search worker died
    SearchFailed,
    NotFound,
}

impl ErrorCode {
    pub const fn status(self) -> StatusCode {
        match self {
            Self::InvalidBody | Self::ValidationFailed | Self::SearchSpaceTooLarge => {
                StatusCode::BAD_REQUEST
            }
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NoWellTable => StatusCode::SERVICE_UNAVAILABLE,
            Self::SearchFailed => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

/// Handler failure, rendered as the error envelope.
#[derive(Debug)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<&ClosureError> for ApiError {
    fn from(err: &ClosureError) -> Self {
        match err {
            // The inner message reads better without the wrapper's prefix
            ClosureError::Validation(inner) => Self::from(inner),
            ClosureError::SearchSpaceTooLarge { .. } => {
                Self::new(ErrorCode::SearchSpaceTooLarge, err.to_string())
            }
        }
    }
}

impl From<&ValidationError> for ApiError {
    fn from(err: &ValidationError) -> Self {
        Self::new(ErrorCode::ValidationFailed, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let code = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ErrorCode::PayloadTooLarge
        } else {
            ErrorCode::InvalidBody
        };
        Self::new(code, rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ErrorDetail<'a> {
    code: ErrorCode,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
    meta: ResponseMeta,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: &self.message,
            },
            meta: ResponseMeta::now(),
        };
        (self.code.status(), Json(body)).into_response()
    }
}

/// Response mapper for the outer router.
///
/// The request body limit rejects on `Content-Length` before any handler
/// runs and answers with a plain-text 413; rewrap it so clients still get
/// the error envelope.
pub async fn envelope_rejections(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        return ApiError::new(ErrorCode::PayloadTooLarge, "request body exceeds the size limit")
            .into_response();
    }
    response
}
