use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use tracing::{debug, warn};

use crate::discord::middleware::SignatureGuard;
use crate::discord::types::{WebhookEventType, WebhookType};
use crate::error::Result;

/// Verification middleware for webhook event deliveries.
///
/// Every verified delivery is acknowledged with `204 No Content` right away.
/// Pings stop here; events are handed to the downstream handler on a separate
/// task and its response is discarded.
pub async fn verify_webhook_event(
    State(guard): State<SignatureGuard>,
    request: Request,
    next: Next,
) -> Result<StatusCode> {
    let verified = guard.authenticate(request).await?;

    if WebhookType::of(verified.payload()) == Some(WebhookType::Ping) {
        debug!("acknowledged webhook ping");
        return Ok(StatusCode::NO_CONTENT);
    }

    let event_type = WebhookEventType::of(verified.payload());
    let request = verified.into_request();
    tokio::spawn(async move {
        let response = next.run(request).await;
        if !response.status().is_success() {
            warn!(
                status = %response.status(),
                ?event_type,
                "webhook event handler failed"
            );
        }
    });

    Ok(StatusCode::NO_CONTENT)
}
