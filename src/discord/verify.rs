use ed25519_dalek::{Signature, VerifyingKey};
use tracing::debug;

use crate::discord::canonical::{Encoding, InputValue};
use crate::error::{Error, Result};

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

/// Checks `signature` against `timestamp ++ body` under `public_key`.
///
/// Signature and public key strings are read as hex, body and timestamp
/// strings as UTF-8. Any failure, malformed input included, is `false`. The
/// timestamp is only bound into the message; its age is not checked.
pub fn verify_key<'b, 's, 't, 'k>(
    body: impl Into<InputValue<'b>>,
    signature: impl Into<InputValue<'s>>,
    timestamp: impl Into<InputValue<'t>>,
    public_key: impl Into<InputValue<'k>>,
) -> bool {
    let outcome = decode_public_key(&public_key.into()).and_then(|key| {
        check_signature(&key, &body.into(), &signature.into(), &timestamp.into())
    });
    match outcome {
        Ok(()) => true,
        Err(err) => {
            debug!(error = %err, "signature verification failed");
            false
        }
    }
}

/// A public key imported once and reused for every request.
#[derive(Clone, Debug)]
pub struct Verifier {
    key: VerifyingKey,
}

impl Verifier {
    /// Fails with [`Error::Config`] when the key is empty or not a valid
    /// Ed25519 point.
    pub fn new<'k>(public_key: impl Into<InputValue<'k>>) -> Result<Self> {
        let public_key = public_key.into();
        if public_key.is_empty() {
            return Err(Error::Config(
                "a Discord application public key is required".into(),
            ));
        }
        let key = decode_public_key(&public_key)
            .map_err(|e| Error::Config(format!("invalid public key: {e}")))?;
        Ok(Self { key })
    }

    pub fn verify<'b, 's, 't>(
        &self,
        body: impl Into<InputValue<'b>>,
        signature: impl Into<InputValue<'s>>,
        timestamp: impl Into<InputValue<'t>>,
    ) -> bool {
        match check_signature(&self.key, &body.into(), &signature.into(), &timestamp.into()) {
            Ok(()) => true,
            Err(err) => {
                debug!(error = %err, "signature verification failed");
                false
            }
        }
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.key.as_bytes())
    }
}

/// The exact bytes the sender signs.
pub fn signed_message(timestamp: &[u8], body: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(timestamp.len() + body.len());
    message.extend_from_slice(timestamp);
    message.extend_from_slice(body);
    message
}

fn decode_public_key(public_key: &InputValue<'_>) -> Result<VerifyingKey> {
    let bytes = public_key.to_bytes(Encoding::Hex)?;
    let bytes = <[u8; 32]>::try_from(&bytes[..]).map_err(|_| {
        Error::InvalidEncoding(format!("public key must be 32 bytes, got {}", bytes.len()))
    })?;
    VerifyingKey::from_bytes(&bytes)
        .map_err(|_| Error::InvalidEncoding("public key is not a valid Ed25519 point".into()))
}

fn check_signature(
    key: &VerifyingKey,
    body: &InputValue<'_>,
    signature: &InputValue<'_>,
    timestamp: &InputValue<'_>,
) -> Result<()> {
    use ed25519_dalek::Verifier as _;

    let timestamp = timestamp.to_bytes(Encoding::Utf8)?;
    let body = body.to_bytes(Encoding::Utf8)?;
    let message = signed_message(&timestamp, &body);

    let signature = signature.to_bytes(Encoding::Hex)?;
    let signature = Signature::from_slice(&signature).map_err(|_| {
        Error::InvalidEncoding(format!("signature must be 64 bytes, got {}", signature.len()))
    })?;

    key.verify(&message, &signature).map_err(|_| Error::InvalidSignature)
}
