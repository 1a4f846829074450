//! Raw body acquisition.
//!
//! The signature covers the exact bytes the sender transmitted, so the body
//! must reach the verifier untouched. Layers that decode the body before the
//! verification middleware runs should hand over what they consumed through a
//! [`PreparsedBody`] request extension.

use axum::body::{to_bytes, Bytes};
use axum::extract::Request;
use axum::http::request::Parts;
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};

/// A body an earlier layer already took off the request.
#[derive(Debug, Clone)]
pub enum PreparsedBody {
    /// The untouched bytes. Used as-is.
    Bytes(Bytes),
    /// The body decoded as UTF-8 text. Re-encoded without loss.
    Text(String),
    /// The body decoded as JSON. Re-serializing it may not reproduce the
    /// sender's bytes, so verification can fail.
    Json(Value),
}

/// Splits `request` into its head and the raw body bytes.
///
/// With no [`PreparsedBody`] extension the body stream is read to the end,
/// bounded by `limit`. A stream error is returned as [`Error::BodyRead`] and
/// no verification must happen on a partial body.
pub async fn take_raw_body(request: Request, limit: usize) -> Result<(Parts, Bytes)> {
    let (mut parts, body) = request.into_parts();

    let raw = match parts.extensions.remove::<PreparsedBody>() {
        Some(PreparsedBody::Bytes(bytes)) => bytes,
        Some(PreparsedBody::Text(text)) => Bytes::from(text),
        Some(PreparsedBody::Json(value)) => {
            warn!(
                uri = %parts.uri,
                "request body was already decoded as JSON by another layer; \
                 re-serializing it, which may not match the signed bytes. \
                 Disable body parsing on this route so the raw body reaches the verifier"
            );
            let bytes = serde_json::to_vec(&value).map_err(|e| Error::Internal(e.to_string()))?;
            Bytes::from(bytes)
        }
        None => to_bytes(body, limit)
            .await
            .map_err(|e| Error::BodyRead(e.to_string()))?,
    };

    Ok((parts, raw))
}
