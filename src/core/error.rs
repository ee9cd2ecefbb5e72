//! Typed errors raised while collecting and guarding request parameters
//!
//! - [`MissingParameterError`]: a required field is absent or blank
//! - [`ParamsError`]: everything that can abort a guarded request, each variant
//!   tagged with an [`ErrorKind`] so the
//!   [`ErrorMapper`](crate::server::ErrorMapper) can look up its handler
//!
//! # Example
//!
//! ```rust
//! use route_params::core::error::{ErrorKind, MissingParameterError, ParamsError};
//!
//! let err = ParamsError::from(MissingParameterError::for_field("action"));
//! assert_eq!(err.kind(), ErrorKind::MissingParameter);
//! assert_eq!(err.to_string(), "Action cannot be blank");
//! ```

use super::field::FieldName;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// A required parameter was missing or blank
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct MissingParameterError {
    message: String,
    field: Option<FieldName>,
}

impl MissingParameterError {
    /// Error carrying a generic message that names no particular field
    pub fn generic(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
        }
    }

    /// Error naming the first missing field: `"<Field> cannot be blank"`
    pub fn for_field(field: impl Into<FieldName>) -> Self {
        let field = field.into();
        Self {
            message: format!("{} cannot be blank", field.humanize()),
            field: Some(field),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The missing field, if one was identified
    pub fn field(&self) -> Option<&FieldName> {
        self.field.as_ref()
    }
}

/// Discriminant used to key error handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingParameter,
    RouteNotMatched,
    InvalidParameters,
    BodyTooLarge,
}

/// Errors that abort a guarded request before its handler runs
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error(transparent)]
    MissingParameter(#[from] MissingParameterError),

    /// A guard rejected the route without signaling an error
    #[error("Not Found")]
    RouteNotMatched,

    /// Query string or body could not be decoded
    #[error("Invalid request parameters: {0}")]
    InvalidParameters(String),

    /// Body could not be buffered within the configured limit
    #[error("Request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
}

impl ParamsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParamsError::MissingParameter(_) => ErrorKind::MissingParameter,
            ParamsError::RouteNotMatched => ErrorKind::RouteNotMatched,
            ParamsError::InvalidParameters(_) => ErrorKind::InvalidParameters,
            ParamsError::BodyTooLarge { .. } => ErrorKind::BodyTooLarge,
        }
    }

    /// Status used by the default mapping
    pub fn status_code(&self) -> StatusCode {
        match self {
            ParamsError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            ParamsError::RouteNotMatched => StatusCode::NOT_FOUND,
            ParamsError::InvalidParameters(_) => StatusCode::BAD_REQUEST,
            ParamsError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

/// Default rendering: the status from [`ParamsError::status_code`] with the
/// message as plain-text body
impl IntoResponse for ParamsError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}
