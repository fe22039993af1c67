//! Error types for the LINE responder.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// The inbound webhook batch is structurally malformed.
///
/// Raised before any per-event processing starts; the whole batch is rejected.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Request body is not valid JSON: {0}")]
    MalformedJson(String),

    #[error("Webhook batch has invalid shape: {0}")]
    InvalidShape(String),
}

impl From<serde_json::Error> for ValidationError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_syntax() || e.is_eof() {
            Self::MalformedJson(e.to_string())
        } else {
            Self::InvalidShape(e.to_string())
        }
    }
}

/// A reply or broadcast call to the messaging gateway failed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DeliveryError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Gateway rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Gateway call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Event has no reply handle")]
    MissingReplyHandle,
}

/// Broadcast schedule construction errors.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Invalid recurrence: {0}")]
    InvalidRecurrence(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Invalid cron expression '{expression}': {reason}")]
    Cron { expression: String, reason: String },
}
