//! Shared types for the webhook dispatch pipeline.

use serde::{Deserialize, Serialize};

use crate::channels::ReplyHandle;
use crate::error::ValidationError;

// ── Inbound batch ───────────────────────────────────────────────────

/// A webhook delivery: one request body carrying an ordered batch of events.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookBatch {
    /// Bot user id the events were sent to.
    #[serde(default)]
    pub destination: Option<String>,
    pub events: Vec<InboundEvent>,
}

impl WebhookBatch {
    /// Parse and validate a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, ValidationError> {
        Ok(serde_json::from_slice(body)?)
    }
}

/// One platform event. Immutable once parsed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    /// Event kind: "message", "follow", "unfollow", "postback", ...
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: Option<MessageContent>,
    #[serde(default)]
    pub source: Option<EventSource>,
    #[serde(default)]
    pub reply_token: Option<ReplyHandle>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl InboundEvent {
    /// The message text, only for text message events.
    pub fn text(&self) -> Option<&str> {
        if self.kind != "message" {
            return None;
        }
        let message = self.message.as_ref()?;
        if message.kind != "text" {
            return None;
        }
        message.text.as_deref()
    }

    /// Opaque id of whoever sent the event.
    pub fn source_id(&self) -> Option<&str> {
        let source = self.source.as_ref()?;
        source
            .user_id
            .as_deref()
            .or(source.group_id.as_deref())
            .or(source.room_id.as_deref())
    }

    /// Source id shortened for logs.
    pub fn source_id_for_log(&self) -> String {
        match self.source_id() {
            Some(id) => format!("{}...", id.chars().take(8).collect::<String>()),
            None => "unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageContent {
    /// Message kind: "text", "image", "sticker", ...
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    /// "user", "group" or "room".
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
}

// ── Dispatch result ─────────────────────────────────────────────────

/// What happened to one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// A reply was accepted by the gateway.
    Delivered,
    /// Not a text message; nothing was sent.
    Skipped,
    /// The reply could not be delivered. Not retried.
    DeliveryFailed { reason: String },
}

impl DispatchOutcome {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Skipped => "skipped",
            Self::DeliveryFailed { .. } => "delivery_failed",
        }
    }
}

/// Outcome for the event at `index` in the submitted batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchResult {
    pub index: usize,
    pub event_kind: String,
    #[serde(flatten)]
    pub outcome: DispatchOutcome,
}
