//! Method override for HTML forms.
//!
//! Browsers can only submit forms with GET or POST. A form that carries a
//! hidden `_method` field has that field stripped from its body and its value
//! (upper-cased) installed as the request method before routing.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{header, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;

/// Name of the hidden form field carrying the intended method.
pub const METHOD_FIELD: &str = "_method";

/// Largest form body the middleware will buffer.
pub const MAX_FORM_BYTES: usize = 2 * 1024 * 1024;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Middleware rewriting the request method from a `_method` form field.
///
/// Must wrap the router rather than be layered onto it: routing has already
/// picked a handler by the time route layers run.
pub async fn method_override(request: Request, next: Next) -> Result<Response, AppError> {
    if !is_form(request.headers()) {
        return Ok(next.run(request).await);
    }

    let (mut parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_FORM_BYTES)
        .await
        .map_err(|e| AppError::bad_request("Malformed request body.", e))?;

    let body = match strip_method_field(&bytes) {
        Some(FormOverride { method, remaining }) => {
            match parse_method(&method) {
                Some(parsed) => {
                    tracing::debug!(from = %parts.method, to = %parsed, "method override");
                    parts.method = parsed;
                }
                None => tracing::warn!(value = %method, "ignoring invalid method override"),
            }
            parts.headers.insert(
                header::CONTENT_LENGTH,
                HeaderValue::from(remaining.len()),
            );
            remaining
        }
        None => bytes,
    };

    Ok(next.run(Request::from_parts(parts, Body::from(body))).await)
}

/// Result of removing `_method` from a form body.
#[derive(Debug, PartialEq, Eq)]
pub struct FormOverride {
    /// Raw value of the first `_method` field.
    pub method: String,
    /// The form re-encoded without any `_method` field.
    pub remaining: Bytes,
}

/// Remove every `_method` pair from a urlencoded body.
///
/// Returns `None` when the body is not valid urlencoded data or carries no
/// `_method` field, in which case it should be forwarded untouched.
pub fn strip_method_field(body: &[u8]) -> Option<FormOverride> {
    let mut pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body).ok()?;
    let position = pairs.iter().position(|(key, _)| key == METHOD_FIELD)?;
    let (_, method) = pairs.remove(position);
    pairs.retain(|(key, _)| key != METHOD_FIELD);

    let remaining = serde_urlencoded::to_string(&pairs).ok()?;
    Some(FormOverride {
        method,
        remaining: Bytes::from(remaining),
    })
}

fn parse_method(value: &str) -> Option<Method> {
    let value = value.trim().to_ascii_uppercase();
    if value.is_empty() {
        return None;
    }
    Method::from_bytes(value.as_bytes()).ok()
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start().starts_with(FORM_CONTENT_TYPE))
        .unwrap_or(false)
}
