//! Relay error types with HTTP status code mapping.
//!
//! [`RelayError`] is the central error type for the relay core. Every variant
//! is an expected, recoverable outcome of a single operation — none of them
//! ever terminates the process. The WebSocket path surfaces only
//! [`RelayError::NameTaken`] to the offending client (as `join_remote_fail`)
//! and silently absorbs the rest; the HTTP control surface maps every variant
//! to a status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ClientName;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "unknown client: zoe",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Core relay error enum with HTTP status code mapping.
///
/// | Variant            | HTTP Status   |
/// |--------------------|---------------|
/// | `UnknownClient`    | 404 Not Found |
/// | `MappingNotFound`  | 404 Not Found |
/// | `NameTaken`        | 409 Conflict  |
/// | `DuplicateMapping` | 409 Conflict  |
#[derive(Debug, Clone, thiserror::Error)]
pub enum RelayError {
    /// The requested name already belongs to a registered connection.
    #[error("name taken: {0}")]
    NameTaken(ClientName),

    /// No connection is registered under the given name.
    #[error("unknown client: {0}")]
    UnknownClient(ClientName),

    /// The exact ordered mapping already exists.
    #[error("mapping {from} -> {to} already exists")]
    DuplicateMapping {
        /// Sender endpoint of the rejected edge.
        from: ClientName,
        /// Receiver endpoint of the rejected edge.
        to: ClientName,
    },

    /// No such ordered mapping exists.
    #[error("mapping {from} -> {to} does not exist")]
    MappingNotFound {
        /// Sender endpoint of the missing edge.
        from: ClientName,
        /// Receiver endpoint of the missing edge.
        to: ClientName,
    },
}

impl RelayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::UnknownClient(_) => 2001,
            Self::MappingNotFound { .. } => 2002,
            Self::NameTaken(_) => 2003,
            Self::DuplicateMapping { .. } => 2004,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownClient(_) | Self::MappingNotFound { .. } => StatusCode::NOT_FOUND,
            Self::NameTaken(_) | Self::DuplicateMapping { .. } => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
