//! HTTP endpoints: webhook intake plus health checks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info, warn};

use crate::channels::line::{SIGNATURE_HEADER, verify_signature};
use crate::pipeline::Dispatcher;

/// Largest accepted webhook body.
pub const MAX_BODY_SIZE: usize = 1_048_576;
/// Upper bound on handling one request, replies included.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    /// Channel secret for webhook signature checks.
    pub channel_secret: SecretString,
    pub environment: String,
    pub started_at: Instant,
}

/// Build the Axum router with webhook and health routes.
pub fn responder_routes(
    dispatcher: Arc<Dispatcher>,
    channel_secret: SecretString,
    environment: impl Into<String>,
) -> Router {
    let state = AppState {
        dispatcher,
        channel_secret,
        environment: environment.into(),
        started_at: Instant::now(),
    };

    Router::new()
        .route("/", get(health))
        .route("/ping", get(ping))
        .route("/webhook", post(webhook))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ))
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "line-responder",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "environment": state.environment,
    }))
}

async fn ping() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "pong",
        "time": Utc::now().to_rfc3339(),
    }))
}

// ── Webhook ─────────────────────────────────────────────────────────────

async fn webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    info!(bytes = body.len(), "Webhook received");

    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        warn!("Webhook rejected: missing signature header");
        return error_response(StatusCode::UNAUTHORIZED, "missing signature");
    };

    if !verify_signature(state.channel_secret.expose_secret(), &body, signature) {
        warn!("Webhook rejected: signature mismatch");
        return error_response(StatusCode::UNAUTHORIZED, "invalid signature");
    }

    match state.dispatcher.dispatch_body(&body).await {
        Ok(results) => {
            info!(events = results.len(), "Webhook batch processed");
            (StatusCode::OK, Json(serde_json::json!({ "results": results }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Webhook batch rejected");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use base64::Engine;
    use hmac::{Hmac, Mac};
    use serde_json::Value;
    use sha2::Sha256;
    use tower::ServiceExt;

    use super::*;
    use crate::channels::{DeliveryGateway, ReplyHandle};
    use crate::clock::SystemClock;
    use crate::error::DeliveryError;
    use crate::responder::{IntentClassifier, ResponseGenerator, ResponsePayload, ThreadRandom};

    struct OkGateway;

    #[async_trait]
    impl DeliveryGateway for OkGateway {
        fn name(&self) -> &str {
            "ok"
        }
        async fn reply(&self, _: &ReplyHandle, _: &ResponsePayload) -> Result<(), DeliveryError> {
            Ok(())
        }
        async fn broadcast(&self, _: &ResponsePayload) -> Result<(), DeliveryError> {
            Ok(())
        }
    }

    const SECRET: &str = "test-secret";

    fn app() -> Router {
        let generator = ResponseGenerator::with_default_catalog(
            chrono_tz::Asia::Tokyo,
            Arc::new(ThreadRandom),
            Arc::new(SystemClock),
        );
        let dispatcher = Dispatcher::new(
            Arc::new(IntentClassifier::default_rules()),
            Arc::new(generator),
            Arc::new(OkGateway),
        );
        responder_routes(Arc::new(dispatcher), SecretString::from(SECRET), "test")
    }

    fn sign(body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(body);
        base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }

    async fn send(req: Request<Body>) -> (StatusCode, Value) {
        let resp = app().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn webhook_request(body: &'static str, signature: Option<String>) -> Request<Body> {
        let mut builder = Request::post("/webhook").header("content-type", "application/json");
        if let Some(sig) = signature {
            builder = builder.header(SIGNATURE_HEADER, sig);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn health_reports_environment() {
        let (status, json) = send(Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["environment"], "test");
        assert!(json["uptime_secs"].is_u64());
    }

    #[tokio::test]
    async fn ping_pongs() {
        let (status, json) = send(Request::get("/ping").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "pong");
    }

    #[tokio::test]
    async fn missing_signature_is_unauthorized() {
        let (status, _) = send(webhook_request(r#"{"events":[]}"#, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bad_signature_is_unauthorized() {
        let (status, json) =
            send(webhook_request(r#"{"events":[]}"#, Some("AAAA".into()))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "invalid signature");
    }

    #[tokio::test]
    async fn malformed_batch_is_server_error() {
        let body = r#"{"destination":"U1"}"#;
        let (status, json) = send(webhook_request(body, Some(sign(body.as_bytes())))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].as_str().unwrap().contains("events"));
    }

    #[tokio::test]
    async fn valid_batch_returns_results() {
        let body = r#"{"events":[
            {"type":"message","replyToken":"r0","message":{"type":"text","text":"hello"}},
            {"type":"follow","replyToken":"r1"}
        ]}"#;
        let (status, json) = send(webhook_request(body, Some(sign(body.as_bytes())))).await;
        assert_eq!(status, StatusCode::OK);
        let results = json["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["outcome"], "delivered");
        assert_eq!(results[1]["outcome"], "skipped");
    }

    #[tokio::test]
    async fn oversized_body_rejected() {
        let body = vec![b' '; MAX_BODY_SIZE + 1];
        let sig = sign(&body);
        let req = Request::post("/webhook")
            .header(SIGNATURE_HEADER, sig)
            .body(Body::from(body))
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
