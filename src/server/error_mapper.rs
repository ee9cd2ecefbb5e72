//! Error-to-response mapping for guarded routes
//!
//! Every [`ParamsError`] escaping a route contract ends up here. Without
//! overrides the error renders through its own `IntoResponse` (400 with the
//! message as body for a missing parameter). Host applications can register a
//! handler per [`ErrorKind`] that fully replaces the default response.

use crate::core::error::{ErrorKind, MissingParameterError, ParamsError};
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Handler = Arc<dyn Fn(&ParamsError) -> Response + Send + Sync>;

/// Registry of error handlers keyed by error kind
///
/// # Example
///
/// ```rust
/// use axum::response::{IntoResponse, Redirect};
/// use route_params::server::ErrorMapper;
///
/// let mapper = ErrorMapper::new()
///     .on_missing_parameter(|_err| Redirect::to("/form").into_response());
/// ```
#[derive(Clone, Default)]
pub struct ErrorMapper {
    handlers: HashMap<ErrorKind, Handler>,
}

impl ErrorMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an error kind, replacing any previous one
    pub fn on<F>(mut self, kind: ErrorKind, handler: F) -> Self
    where
        F: Fn(&ParamsError) -> Response + Send + Sync + 'static,
    {
        self.handlers.insert(kind, Arc::new(handler));
        self
    }

    /// Register a handler for missing or blank required parameters
    pub fn on_missing_parameter<F>(self, handler: F) -> Self
    where
        F: Fn(&MissingParameterError) -> Response + Send + Sync + 'static,
    {
        self.on(ErrorKind::MissingParameter, move |err| match err {
            ParamsError::MissingParameter(missing) => handler(missing),
            other => other.status_code().into_response(),
        })
    }

    /// Whether the host registered a handler for this kind
    pub fn has_override(&self, kind: ErrorKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Convert an error into the response sent to the client
    pub fn map(&self, err: ParamsError) -> Response {
        match self.handlers.get(&err.kind()) {
            Some(handler) => handler(&err),
            None => {
                tracing::debug!(kind = ?err.kind(), error = %err, "rejecting request");
                err.into_response()
            }
        }
    }
}

impl fmt::Debug for ErrorMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorMapper")
            .field("overrides", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
