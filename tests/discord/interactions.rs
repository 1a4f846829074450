use std::io;

use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde_json::{json, Value};

use interaction_verify::create_app;
use ed25519_dalek::Signer;

use interaction_verify::discord::signing::sign_request;
use interaction_verify::discord::verify::signed_message;
use interaction_verify::discord::{
    verify_interaction, InteractionResponseType, PreparsedBody, SignatureGuard, VerifiedPayload,
    SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
use interaction_verify::error::Error;

#[path = "../common/common.rs"]
mod common;

use common::{TestKeys, COMMAND_BODY, PING_BODY};

const URI: &str = "/interactions";

fn app(keys: &TestKeys) -> Router {
    create_app(SignatureGuard::new(keys.public_key()).unwrap())
}

/// Routes where an earlier layer already consumed the body.
fn app_with_preparsed(keys: &TestKeys, preparsed: PreparsedBody) -> Router {
    let guard = SignatureGuard::new(keys.public_key()).unwrap();
    Router::new()
        .route(
            URI,
            post(
                |Extension(VerifiedPayload(payload)): Extension<VerifiedPayload>| async move {
                    Json(json!({ "seen": payload }))
                },
            ),
        )
        .route_layer(middleware::from_fn_with_state(guard, verify_interaction))
        .layer(middleware::from_fn(
            move |mut request: Request, next: Next| {
                let preparsed = preparsed.clone();
                async move {
                    request.extensions_mut().insert(preparsed);
                    next.run(request).await
                }
            },
        ))
}

async fn unreachable_handler() -> StatusCode {
    panic!("handler must not run for unverified requests")
}

#[tokio::test]
async fn test_valid_ping() {
    let keys = TestKeys::generate();
    let signed = common::sign(&keys.valid, r#"{"type":1}"#);

    let res = common::send(app(&keys), common::signed_post(URI, &signed)).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.content_type.as_deref(), Some("application/json"));
    assert_eq!(res.body, r#"{"type":1}"#);
}

#[tokio::test]
async fn test_full_ping_payload() {
    let keys = TestKeys::generate();
    let signed = common::sign(&keys.valid, PING_BODY);

    let res = common::send(app(&keys), common::signed_post(URI, &signed)).await;

    assert_eq!(res.status, StatusCode::OK);
    let body: Value = serde_json::from_str(&res.body).unwrap();
    assert_eq!(body, json!({ "type": InteractionResponseType::Pong as u8 }));
}

#[tokio::test]
async fn test_valid_application_command() {
    let keys = TestKeys::generate();
    let signed = common::sign(&keys.valid, COMMAND_BODY);

    let res = common::send(app(&keys), common::signed_post(URI, &signed)).await;

    assert_eq!(res.status, StatusCode::OK);
    let body: Value = serde_json::from_str(&res.body).unwrap();
    assert_eq!(
        body,
        json!({
            "type": InteractionResponseType::ChannelMessageWithSource as u8,
            "data": { "content": "Hello world" }
        })
    );
}

#[tokio::test]
async fn test_invalid_key() {
    let keys = TestKeys::generate();
    let signed = common::sign(&keys.invalid, COMMAND_BODY);

    let res = common::send(app(&keys), common::signed_post(URI, &signed)).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body, "invalid signature");
}

#[tokio::test]
async fn test_invalid_body() {
    let keys = TestKeys::generate();
    let signed = common::sign(&keys.valid, PING_BODY);
    let req = common::post(
        URI,
        Some(&signed.signature),
        Some(&signed.timestamp),
        "example invalid body",
    );

    let res = common::send(app(&keys), req).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_signature() {
    let keys = TestKeys::generate();
    let signed = common::sign(&keys.valid, PING_BODY);
    let req = common::post(
        URI,
        Some("example invalid signature"),
        Some(&signed.timestamp),
        &signed.body,
    );

    let res = common::send(app(&keys), req).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_timestamp() {
    let keys = TestKeys::generate();
    let signed = common::sign(&keys.valid, PING_BODY);
    let stale = (signed.timestamp.parse::<u64>().unwrap() - 10_000).to_string();
    let req = common::post(URI, Some(&signed.signature), Some(&stale), &signed.body);

    let res = common::send(app(&keys), req).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_old_but_correctly_signed_timestamp() {
    let keys = TestKeys::generate();
    let signed = sign_request(&keys.valid, PING_BODY, "1000000000");

    let res = common::send(app(&keys), common::signed_post(URI, &signed)).await;

    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_headers() {
    let keys = TestKeys::generate();
    let signed = common::sign(&keys.valid, PING_BODY);

    for (signature, timestamp) in [
        (None, None),
        (Some(signed.signature.as_str()), None),
        (None, Some(signed.timestamp.as_str())),
        (Some(""), Some(signed.timestamp.as_str())),
    ] {
        let req = common::post(URI, signature, timestamp, &signed.body);
        let res = common::send(app(&keys), req).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_missing_public_key() {
    let err = SignatureGuard::new("").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn test_empty_body() {
    let keys = TestKeys::generate();

    // Signed over an empty body: verifies and reaches the handler.
    let signed = common::sign(&keys.valid, "");
    let res = common::send(app(&keys), common::signed_post(URI, &signed)).await;
    assert_eq!(res.status, StatusCode::OK);

    // Signed over something else: the empty body does not match.
    let signed = common::sign(&keys.valid, PING_BODY);
    let req = common::post(URI, Some(&signed.signature), Some(&signed.timestamp), "");
    let res = common::send(app(&keys), req).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signed_but_not_json() {
    let keys = TestKeys::generate();
    let signed = common::sign(&keys.valid, "plain text");

    let res = common::send(app(&keys), common::signed_post(URI, &signed)).await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_body_limit() {
    let keys = TestKeys::generate();
    let guard = SignatureGuard::new(keys.public_key())
        .unwrap()
        .with_body_limit(16);
    let signed = common::sign(&keys.valid, COMMAND_BODY);

    let res = common::send(create_app(guard), common::signed_post(URI, &signed)).await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stream_error_is_bad_request() {
    let keys = TestKeys::generate();
    let guard = SignatureGuard::new(keys.public_key()).unwrap();
    let app = Router::new()
        .route(URI, post(unreachable_handler))
        .route_layer(middleware::from_fn_with_state(guard, verify_interaction));
    let signed = common::sign(&keys.valid, COMMAND_BODY);

    let chunks = vec![
        Ok(Bytes::from(signed.body[..8].to_owned())),
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
    ];
    let request = axum::http::Request::builder()
        .method("POST")
        .uri(URI)
        .header(SIGNATURE_HEADER, &signed.signature)
        .header(TIMESTAMP_HEADER, &signed.timestamp)
        .body(Body::from_stream(futures::stream::iter(chunks)))
        .unwrap();

    let res = common::send(app, request).await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.starts_with("failed to read request body"));
}

#[tokio::test]
async fn test_timestamp_bytes_are_signed_verbatim() {
    let keys = TestKeys::generate();
    let timestamp: &[u8] = b"17\xe900";
    let signature = keys
        .valid
        .sign(&signed_message(timestamp, COMMAND_BODY.as_bytes()));

    let request = axum::http::Request::builder()
        .method("POST")
        .uri(URI)
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, hex::encode(signature.to_bytes()))
        .header(TIMESTAMP_HEADER, HeaderValue::from_bytes(timestamp).unwrap())
        .body(Body::from(COMMAND_BODY))
        .unwrap();

    let res = common::send(app(&keys), request).await;

    assert_eq!(res.status, StatusCode::OK);
    let body: Value = serde_json::from_str(&res.body).unwrap();
    assert_eq!(body["data"]["content"], "Hello world");
}

#[tokio::test]
async fn test_handler_sees_raw_body_and_payload() {
    let keys = TestKeys::generate();
    let guard = SignatureGuard::new(keys.public_key()).unwrap();
    let app = Router::new()
        .route(
            URI,
            post(
                |Extension(VerifiedPayload(payload)): Extension<VerifiedPayload>,
                 body: Bytes| async move {
                    Json(json!({
                        "name": payload["data"]["name"],
                        "raw": String::from_utf8_lossy(&body),
                    }))
                },
            ),
        )
        .route_layer(middleware::from_fn_with_state(guard, verify_interaction));
    let signed = common::sign(&keys.valid, COMMAND_BODY);

    let res = common::send(app, common::signed_post(URI, &signed)).await;

    assert_eq!(res.status, StatusCode::OK);
    let body: Value = serde_json::from_str(&res.body).unwrap();
    assert_eq!(body["name"], "test");
    assert_eq!(body["raw"], COMMAND_BODY);
}

#[tokio::test]
async fn test_handles_string_bodies_from_middleware() {
    let keys = TestKeys::generate();
    let signed = common::sign(&keys.valid, COMMAND_BODY);
    let app = app_with_preparsed(&keys, PreparsedBody::Text(signed.body.clone()));
    let req = common::post(URI, Some(&signed.signature), Some(&signed.timestamp), "");

    let res = common::send(app, req).await;

    assert_eq!(res.status, StatusCode::OK);
    let body: Value = serde_json::from_str(&res.body).unwrap();
    assert_eq!(body["seen"]["data"]["name"], "test");
}

#[tokio::test]
async fn test_handles_byte_bodies_from_middleware() {
    let keys = TestKeys::generate();
    let signed = common::sign(&keys.valid, PING_BODY);
    let app = app_with_preparsed(&keys, PreparsedBody::Bytes(Bytes::from(signed.body.clone())));
    let req = common::post(URI, Some(&signed.signature), Some(&signed.timestamp), "");

    let res = common::send(app, req).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, r#"{"type":1}"#);
}

#[tokio::test]
async fn test_reconstructs_json_bodies_from_middleware() {
    let keys = TestKeys::generate();
    let signed = common::sign(&keys.valid, PING_BODY);
    let parsed: Value = serde_json::from_str(&signed.body).unwrap();
    let app = app_with_preparsed(&keys, PreparsedBody::Json(parsed));
    let req = common::post(URI, Some(&signed.signature), Some(&signed.timestamp), "");

    let res = common::send(app, req).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, r#"{"type":1}"#);
}

#[tokio::test]
async fn test_json_reconstruction_can_break_verification() {
    let keys = TestKeys::generate();
    let signed = common::sign(&keys.valid, r#"{ "type": 2, "data": { "name": "test" } }"#);
    let parsed: Value = serde_json::from_str(&signed.body).unwrap();
    let app = app_with_preparsed(&keys, PreparsedBody::Json(parsed));
    let req = common::post(URI, Some(&signed.signature), Some(&signed.timestamp), "");

    let res = common::send(app, req).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unsigned_requests_never_reach_the_handler() {
    let keys = TestKeys::generate();
    let guard = SignatureGuard::new(keys.public_key()).unwrap();
    let app = Router::new()
        .route(URI, post(unreachable_handler))
        .route_layer(middleware::from_fn_with_state(guard, verify_interaction));
    let signed = common::sign(&keys.invalid, COMMAND_BODY);

    let res = common::send(app, common::signed_post(URI, &signed)).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ping_never_reaches_the_handler() {
    let keys = TestKeys::generate();
    let guard = SignatureGuard::new(keys.public_key()).unwrap();
    let app = Router::new()
        .route(URI, post(unreachable_handler))
        .route_layer(middleware::from_fn_with_state(guard, verify_interaction));
    let signed = common::sign(&keys.valid, PING_BODY);

    let res = common::send(app, common::signed_post(URI, &signed)).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, r#"{"type":1}"#);
}
