//! LINE Messaging API channel: reply and broadcast over HTTPS.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use sha2::Sha256;
use tracing::debug;

use crate::channels::{DeliveryGateway, ReplyHandle};
use crate::error::DeliveryError;
use crate::responder::{ResponsePayload, StyleHints};

/// Header carrying the webhook body signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// LINE channel. Pushes replies and broadcasts through the Messaging API.
pub struct LineGateway {
    access_token: SecretString,
    api_base: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl LineGateway {
    pub fn new(
        access_token: SecretString,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        Ok(Self {
            access_token,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            timeout,
            client,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v2/bot/message/{path}", self.api_base)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<(), DeliveryError> {
        let resp = self
            .client
            .post(self.api_url(path))
            .bearer_auth(self.access_token.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::Timeout(self.timeout)
                } else {
                    DeliveryError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl DeliveryGateway for LineGateway {
    fn name(&self) -> &str {
        "line"
    }

    async fn reply(
        &self,
        handle: &ReplyHandle,
        payload: &ResponsePayload,
    ) -> Result<(), DeliveryError> {
        let body = json!({
            "replyToken": handle.as_str(),
            "messages": [to_line_message(payload)],
        });
        self.post("reply", &body).await?;
        debug!(payload = payload.label(), "LINE reply sent");
        Ok(())
    }

    async fn broadcast(&self, payload: &ResponsePayload) -> Result<(), DeliveryError> {
        let body = json!({ "messages": [to_line_message(payload)] });
        self.post("broadcast", &body).await?;
        debug!(payload = payload.label(), "LINE broadcast sent");
        Ok(())
    }
}

/// Render a payload as a LINE message object.
pub fn to_line_message(payload: &ResponsePayload) -> Value {
    match payload {
        ResponsePayload::PlainText { text } => json!({ "type": "text", "text": text }),
        ResponsePayload::RichCard {
            alt_text,
            title,
            title_style,
            sections,
        } => {
            let mut contents = Vec::with_capacity(sections.len() + 1);
            contents.push(text_component(title, title_style));
            contents.extend(sections.iter().map(|s| text_component(&s.text, &s.style)));

            json!({
                "type": "flex",
                "altText": alt_text,
                "contents": {
                    "type": "bubble",
                    "body": {
                        "type": "box",
                        "layout": "vertical",
                        "contents": contents,
                    }
                }
            })
        }
    }
}

fn text_component(text: &str, style: &StyleHints) -> Value {
    let mut component = json!({ "type": "text", "text": text });
    if let Some(weight) = style.weight {
        component["weight"] = json!(weight.as_str());
    }
    if let Some(size) = style.size {
        component["size"] = json!(size.as_str());
    }
    if let Some(ref color) = style.color {
        component["color"] = json!(color);
    }
    if let Some(margin) = style.margin {
        component["margin"] = json!(margin.as_str());
    }
    if style.wrap {
        component["wrap"] = json!(true);
    }
    component
}

/// Verify the webhook signature: base64(HMAC-SHA256(channel_secret, body)).
pub fn verify_signature(channel_secret: &str, body: &[u8], signature_header: &str) -> bool {
    let Ok(expected) = BASE64.decode(signature_header.trim()) else {
        return false;
    };

    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(channel_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);

    // Constant-time comparison
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use tokio::net::TcpListener;

    use super::*;
    use crate::responder::catalog;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        BASE64.encode(mac.finalize().into_bytes())
    }

    #[test]
    fn line_api_url() {
        let gw = LineGateway::new(
            SecretString::from("token"),
            "https://api.line.me/",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(gw.api_url("reply"), "https://api.line.me/v2/bot/message/reply");
        assert_eq!(gw.name(), "line");
    }

    #[test]
    fn plain_text_wire_format() {
        let msg = to_line_message(&ResponsePayload::text("hello"));
        assert_eq!(msg, json!({ "type": "text", "text": "hello" }));
    }

    #[test]
    fn help_card_wire_format() {
        let msg = to_line_message(&catalog::help_card());
        assert_eq!(msg["type"], "flex");
        assert_eq!(msg["altText"], "ボットの使い方ガイド");
        let body = &msg["contents"]["body"];
        assert_eq!(body["layout"], "vertical");

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 4);
        assert_eq!(contents[0]["text"], "使い方ガイド");
        assert_eq!(contents[0]["weight"], "bold");
        assert_eq!(contents[0]["size"], "xl");
        assert_eq!(contents[0]["color"], "#1DB446");
        assert_eq!(contents[2]["wrap"], true);
        assert_eq!(contents[3]["color"], "#666666");
        assert!(contents[1].get("wrap").is_none());
    }

    #[test]
    fn valid_signature_accepted() {
        let body = br#"{"events":[]}"#;
        let sig = sign("secret", body);
        assert!(verify_signature("secret", body, &sig));
    }

    #[test]
    fn wrong_secret_rejected() {
        let body = br#"{"events":[]}"#;
        let sig = sign("other", body);
        assert!(!verify_signature("secret", body, &sig));
    }

    #[test]
    fn tampered_body_rejected() {
        let sig = sign("secret", br#"{"events":[]}"#);
        assert!(!verify_signature("secret", br#"{"events":[1]}"#, &sig));
    }

    #[test]
    fn non_base64_signature_rejected() {
        assert!(!verify_signature("secret", b"{}", "not base64!!"));
    }

    type Seen = Arc<Mutex<Vec<(String, String, Value)>>>;

    /// Messaging API stand-in: records (path, authorization, body) and answers `status`.
    async fn start_api(status: StatusCode) -> (String, Seen) {
        let seen: Seen = Arc::default();
        let recorder = Arc::clone(&seen);
        let app = Router::new().route(
            "/v2/bot/message/{kind}",
            post(
                move |Path(kind): Path<String>, headers: HeaderMap, Json(body): Json<Value>| {
                    let recorder = Arc::clone(&recorder);
                    async move {
                        let auth = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default()
                            .to_string();
                        recorder.lock().unwrap().push((kind, auth, body));
                        if status.is_success() {
                            (status, Json(json!({})))
                        } else {
                            (status, Json(json!({ "message": "Invalid reply token" })))
                        }
                    }
                },
            ),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://127.0.0.1:{port}"), seen)
    }

    fn gateway(base: &str) -> LineGateway {
        LineGateway::new(SecretString::from("tok"), base, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn reply_posts_token_and_messages_with_bearer_auth() {
        let (base, seen) = start_api(StatusCode::OK).await;
        let gw = gateway(&base);

        gw.reply(&ReplyHandle::new("r1"), &ResponsePayload::text("hi"))
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (path, auth, body) = &seen[0];
        assert_eq!(path, "reply");
        assert_eq!(auth, "Bearer tok");
        assert_eq!(
            *body,
            json!({
                "replyToken": "r1",
                "messages": [{ "type": "text", "text": "hi" }]
            })
        );
    }

    #[tokio::test]
    async fn broadcast_posts_messages_only() {
        let (base, seen) = start_api(StatusCode::OK).await;
        let gw = gateway(&base);

        gw.broadcast(&catalog::help_card()).await.unwrap();

        let seen = seen.lock().unwrap();
        let (path, auth, body) = &seen[0];
        assert_eq!(path, "broadcast");
        assert_eq!(auth, "Bearer tok");
        assert!(body.get("replyToken").is_none());
        assert_eq!(body["messages"][0], to_line_message(&catalog::help_card()));
    }

    #[tokio::test]
    async fn non_success_status_is_rejected_with_body() {
        let (base, _seen) = start_api(StatusCode::BAD_REQUEST).await;
        let gw = gateway(&base);

        let err = gw
            .reply(&ReplyHandle::new("expired"), &ResponsePayload::text("hi"))
            .await
            .unwrap_err();
        match err {
            DeliveryError::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("Invalid reply token"), "body: {body}");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_api_is_transport_failure() {
        let gw = LineGateway::new(
            SecretString::from("token"),
            "http://127.0.0.1:1",
            Duration::from_secs(2),
        )
        .unwrap();
        let err = gw
            .broadcast(&ResponsePayload::text("x"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DeliveryError::Transport(_) | DeliveryError::Timeout(_)
        ));
    }
}
