//! Axum extractors for request parameters
//!
//! This module provides:
//! - [`collect_params`]: builds a [`ParameterSet`] from the query string and a
//!   urlencoded or JSON object body, leaving the body readable for the handler
//! - [`Params`]: the active (possibly filtered) parameters
//! - [`OriginalParams`]: the unfiltered parameters as received

use crate::core::error::ParamsError;
use crate::core::params::ParameterSet;
use axum::body::Body;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::http::{HeaderMap, Method, header};
use axum::{Form, Json};
use serde_json::Value;
use std::ops::{Deref, DerefMut};

/// Body buffering limit used when none is configured
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Active request parameters
///
/// On a route registered with a contract (empty or not) these are the query
/// and body parameters after the guards ran. On a route outside any contract
/// they are read straight from the query string.
///
/// ```rust,ignore
/// async fn show(Params(params): Params) -> String {
///     params.fetch("id").unwrap_or_default()
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Params(pub ParameterSet);

/// Unfiltered request parameters, stashed before any guard ran
#[derive(Debug, Clone)]
pub struct OriginalParams(pub ParameterSet);

impl Deref for Params {
    type Target = ParameterSet;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Params {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Deref for OriginalParams {
    type Target = ParameterSet;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Params
where
    S: Send + Sync,
{
    type Rejection = ParamsError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(params) = parts.extensions.get::<Params>() {
            return Ok(params.clone());
        }
        Ok(Params(query_params(parts)?))
    }
}

impl<S> FromRequestParts<S> for OriginalParams
where
    S: Send + Sync,
{
    type Rejection = ParamsError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(params) = parts.extensions.get::<OriginalParams>() {
            return Ok(params.clone());
        }
        Ok(OriginalParams(query_params(parts)?))
    }
}

fn query_params(parts: &Parts) -> Result<ParameterSet, ParamsError> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
        .map_err(|e| ParamsError::InvalidParameters(e.body_text()))?;
    Ok(ParameterSet::from_pairs(pairs))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyFormat {
    Form,
    Json,
}

fn body_format(headers: &HeaderMap) -> Option<BodyFormat> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())?;
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if mime == "application/x-www-form-urlencoded" {
        Some(BodyFormat::Form)
    } else if mime == "application/json" || mime.ends_with("+json") {
        Some(BodyFormat::Json)
    } else {
        None
    }
}

/// Collect the request's parameters
///
/// Query pairs come first; body fields overwrite query fields of the same
/// name. Bodies that are neither urlencoded nor JSON are left alone. The body
/// is buffered (up to `body_limit` bytes) and put back into the returned
/// request.
pub async fn collect_params(
    req: Request,
    body_limit: usize,
) -> Result<(Request, ParameterSet), ParamsError> {
    let (parts, body) = req.into_parts();
    let mut params = query_params(&parts)?;

    let Some(format) = body_format(&parts.headers) else {
        return Ok((Request::from_parts(parts, body), params));
    };

    let bytes = axum::body::to_bytes(body, body_limit)
        .await
        .map_err(|e| body_error(e, body_limit))?;

    if !bytes.is_empty() {
        match format {
            BodyFormat::Form => {
                let probe = Request::builder()
                    .method(Method::POST)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(bytes.clone()))
                    .map_err(|e| ParamsError::InvalidParameters(e.to_string()))?;
                let Form(pairs) = Form::<Vec<(String, String)>>::from_request(probe, &())
                    .await
                    .map_err(|e| ParamsError::InvalidParameters(e.body_text()))?;
                for (key, value) in pairs {
                    params.insert(key, Some(value));
                }
            }
            BodyFormat::Json => {
                let Json(value) = Json::<Value>::from_bytes(&bytes)
                    .map_err(|e| ParamsError::InvalidParameters(e.body_text()))?;
                merge_json(&mut params, value);
            }
        }
    }

    Ok((Request::from_parts(parts, Body::from(bytes)), params))
}

/// Classify a body buffering failure
///
/// Errors raised by the body itself arrive wrapped as `axum::Error`; the only
/// other failure `to_bytes` produces is the length limit.
fn body_error(err: axum::Error, limit: usize) -> ParamsError {
    let inner = err.into_inner();
    if inner.is::<axum::Error>() {
        tracing::warn!(error = %inner, "failed to read request body");
        ParamsError::InvalidParameters(format!("Failed to read request body: {inner}"))
    } else {
        ParamsError::BodyTooLarge { limit }
    }
}

/// Copy the scalar members of a JSON object into `params`
///
/// Strings are taken as-is, numbers and booleans stringified, `null` becomes a
/// key without a value. Nested arrays and objects are skipped. Non-object
/// bodies contribute nothing.
fn merge_json(params: &mut ParameterSet, value: Value) {
    let Value::Object(map) = value else {
        tracing::debug!("JSON body is not an object, no parameters taken from it");
        return;
    };

    for (key, value) in map {
        match value {
            Value::String(s) => {
                params.insert(key, Some(s));
            }
            Value::Number(n) => {
                params.insert(key, Some(n.to_string()));
            }
            Value::Bool(b) => {
                params.insert(key, Some(b.to_string()));
            }
            Value::Null => {
                params.insert(key, None);
            }
            Value::Array(_) | Value::Object(_) => {
                tracing::debug!(field = %key, "skipping nested JSON parameter");
            }
        }
    }
}
