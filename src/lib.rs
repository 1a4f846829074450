pub mod config;
pub mod discord;
pub mod error;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use tracing::info;

use crate::discord::{
    verify_interaction, verify_webhook_event, InteractionResponse, InteractionType,
    SignatureGuard, VerifiedPayload, WebhookEventType,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "interaction-verify",
        "version": VERSION
    }))
}

pub async fn root() -> &'static str {
    "interaction-verify: signed Discord requests only"
}

pub async fn handle_interaction(
    Extension(VerifiedPayload(payload)): Extension<VerifiedPayload>,
) -> Json<InteractionResponse> {
    match InteractionType::of(&payload) {
        Some(InteractionType::ApplicationCommand) => {
            let name = payload
                .pointer("/data/name")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            info!(command = name, "application command");
            Json(InteractionResponse::message("Hello world"))
        }
        other => {
            info!(kind = ?other, "unhandled interaction");
            Json(InteractionResponse::ephemeral("Unsupported interaction"))
        }
    }
}

pub async fn handle_webhook_event(
    Extension(VerifiedPayload(payload)): Extension<VerifiedPayload>,
) -> StatusCode {
    match WebhookEventType::of(&payload) {
        Some(event) => info!(?event, "webhook event"),
        None => info!("webhook event of unknown type"),
    }
    StatusCode::OK
}

pub fn create_app(guard: SignatureGuard) -> Router {
    let interactions = Router::new()
        .route("/interactions", post(handle_interaction))
        .route_layer(middleware::from_fn_with_state(
            guard.clone(),
            verify_interaction,
        ));

    let webhooks = Router::new()
        .route("/webhooks/events", post(handle_webhook_event))
        .route_layer(middleware::from_fn_with_state(guard, verify_webhook_event));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(interactions)
        .merge(webhooks)
}
