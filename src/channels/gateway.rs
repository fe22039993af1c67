//! Delivery gateway abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DeliveryError;
use crate::responder::ResponsePayload;

/// Opaque token the messaging platform issues with an event, required to reply to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplyHandle(String);

impl ReplyHandle {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Outbound side of the messaging platform. Pure I/O, no business logic.
///
/// Implementations own their transport timeouts; any failure, including a
/// timeout, comes back as a `DeliveryError`.
#[async_trait]
pub trait DeliveryGateway: Send + Sync {
    /// Gateway name for logging (e.g. "line").
    fn name(&self) -> &str;

    /// Reply to the event that issued `handle`.
    async fn reply(
        &self,
        handle: &ReplyHandle,
        payload: &ResponsePayload,
    ) -> Result<(), DeliveryError>;

    /// Send to every recipient the platform knows about.
    async fn broadcast(&self, payload: &ResponsePayload) -> Result<(), DeliveryError>;
}
