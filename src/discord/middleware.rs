//! Signature-checking middleware for the interactions and webhook-event
//! endpoints.
//!
//! ```ignore
//! let guard = SignatureGuard::new(&config.discord_public_key)?;
//! let app = Router::new()
//!     .route("/interactions", post(handle_command))
//!     .route_layer(middleware::from_fn_with_state(guard, verify_interaction));
//! ```

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use tracing::warn;

use crate::config::DEFAULT_MAX_BODY_BYTES;
use crate::discord::body::take_raw_body;
use crate::discord::canonical::InputValue;
use crate::discord::types::{InteractionResponse, InteractionType};
use crate::discord::verify::{Verifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::error::{Error, Result};

/// The decoded body of a verified request, available to downstream handlers
/// as a request extension.
#[derive(Debug, Clone)]
pub struct VerifiedPayload(pub Value);

/// Middleware state: one public key, fixed for the lifetime of the guard.
/// Shared by [`verify_interaction`] and
/// [`verify_webhook_event`](crate::discord::verify_webhook_event).
#[derive(Clone, Debug)]
pub struct SignatureGuard {
    verifier: Arc<Verifier>,
    body_limit: usize,
}

impl SignatureGuard {
    /// Fails with [`Error::Config`] on an empty or unusable public key, before
    /// any request is served.
    pub fn new<'k>(public_key: impl Into<InputValue<'k>>) -> Result<Self> {
        Ok(Self {
            verifier: Arc::new(Verifier::new(public_key)?),
            body_limit: DEFAULT_MAX_BODY_BYTES,
        })
    }

    /// Reuses a key that was already imported.
    pub fn from_verifier(verifier: Verifier) -> Self {
        Self {
            verifier: Arc::new(verifier),
            body_limit: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    /// Reads the raw body and checks it against the signature headers.
    pub async fn authenticate(&self, request: Request) -> Result<VerifiedRequest> {
        let (Some(signature), Some(timestamp)) = (
            header_value(request.headers(), SIGNATURE_HEADER),
            header_value(request.headers(), TIMESTAMP_HEADER),
        ) else {
            warn!(uri = %request.uri(), "missing discord signature headers");
            return Err(Error::InvalidSignature);
        };

        let (parts, raw) = take_raw_body(request, self.body_limit).await?;

        // Non-UTF-8 signature bytes become replacement characters and fail hex decoding.
        let signature = InputValue::text(String::from_utf8_lossy(&signature));
        if !self.verifier.verify(&raw, signature, &timestamp) {
            warn!(uri = %parts.uri, "invalid discord signature");
            return Err(Error::InvalidSignature);
        }

        let payload = parse_payload(&raw)?;
        Ok(VerifiedRequest {
            parts,
            raw,
            payload,
        })
    }
}

impl From<Verifier> for SignatureGuard {
    fn from(verifier: Verifier) -> Self {
        Self::from_verifier(verifier)
    }
}

/// A request whose body matched its signature.
#[derive(Debug)]
pub struct VerifiedRequest {
    parts: Parts,
    raw: Bytes,
    payload: Value,
}

impl VerifiedRequest {
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn raw_body(&self) -> &Bytes {
        &self.raw
    }

    /// Rebuilds the request with the raw bytes as its body and the decoded
    /// payload attached as [`VerifiedPayload`].
    pub fn into_request(self) -> Request {
        let mut request = Request::from_parts(self.parts, Body::from(self.raw));
        request
            .extensions_mut()
            .insert(VerifiedPayload(self.payload));
        request
    }
}

/// Rejects unsigned requests with 401, answers pings with a pong and passes
/// everything else on.
pub async fn verify_interaction(
    State(guard): State<SignatureGuard>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let verified = guard.authenticate(request).await?;

    if InteractionType::of(verified.payload()) == Some(InteractionType::Ping) {
        return Ok(Json(InteractionResponse::pong()).into_response());
    }

    Ok(next.run(verified.into_request()).await)
}

/// The header's bytes as sent. Values outside visible ASCII are kept.
fn header_value(headers: &HeaderMap, name: &str) -> Option<Bytes> {
    headers
        .get(name)
        .map(|v| v.as_bytes())
        .filter(|v| !v.is_empty())
        .map(Bytes::copy_from_slice)
}

fn parse_payload(raw: &[u8]) -> Result<Value> {
    if raw.is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(raw).map_err(|e| Error::InvalidPayload(e.to_string()))
}
