//! Sender side of the scheme, for local testing and tooling.

use std::time::{SystemTime, UNIX_EPOCH};

use ed25519_dalek::{Signer, SigningKey};

use crate::discord::verify::signed_message;
use crate::error::{Error, Result};

/// A body with the header values a sender attaches to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub body: String,
    pub signature: String,
    pub timestamp: String,
}

pub fn sign_request(
    key: &SigningKey,
    body: impl Into<String>,
    timestamp: impl Into<String>,
) -> SignedRequest {
    let body = body.into();
    let timestamp = timestamp.into();
    let message = signed_message(timestamp.as_bytes(), body.as_bytes());
    let signature = hex::encode(key.sign(&message).to_bytes());
    SignedRequest {
        body,
        signature,
        timestamp,
    }
}

/// Signs with the current unix time in seconds as the timestamp.
pub fn sign_request_now(key: &SigningKey, body: impl Into<String>) -> SignedRequest {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    sign_request(key, body, now.to_string())
}

/// Parses a hex-encoded 32-byte secret key seed.
pub fn signing_key_from_hex(secret: &str) -> Result<SigningKey> {
    let bytes = hex::decode(secret.trim())?;
    let seed = <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
        Error::InvalidEncoding(format!("secret key must be 32 bytes, got {}", bytes.len()))
    })?;
    Ok(SigningKey::from_bytes(&seed))
}

pub fn public_key_hex(key: &SigningKey) -> String {
    hex::encode(key.verifying_key().as_bytes())
}
