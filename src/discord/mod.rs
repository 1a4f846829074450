pub mod body;
pub mod canonical;
pub mod middleware;
pub mod signing;
pub mod types;
pub mod verify;
pub mod webhook;

pub use body::PreparsedBody;
pub use canonical::{Encoding, InputValue};
pub use middleware::{verify_interaction, SignatureGuard, VerifiedPayload, VerifiedRequest};
pub use types::{
    InteractionResponse, InteractionResponseFlags, InteractionResponseType, InteractionType,
    WebhookEventType, WebhookType,
};
pub use verify::{verify_key, Verifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};
pub use webhook::verify_webhook_event;
