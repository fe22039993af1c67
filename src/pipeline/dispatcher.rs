//! Event dispatcher. Fans a webhook batch out to independent per-event pipelines.
//!
//! Flow per event:
//! 1. Non-text events → `Skipped` (no classification, no gateway call)
//! 2. `IntentClassifier::classify()` → `ResponseGenerator::generate()`
//! 3. `DeliveryGateway::reply()` → `Delivered` or `DeliveryFailed`
//!
//! Events run concurrently on the calling task. A failing event only affects
//! its own result; the batch as a whole fails only when it cannot be parsed.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::channels::DeliveryGateway;
use crate::error::{DeliveryError, ValidationError};
use crate::pipeline::types::{DispatchOutcome, DispatchResult, InboundEvent, WebhookBatch};
use crate::responder::{IntentClassifier, ResponseGenerator};

/// Dispatches inbound events to classification, generation and delivery.
pub struct Dispatcher {
    classifier: Arc<IntentClassifier>,
    generator: Arc<ResponseGenerator>,
    gateway: Arc<dyn DeliveryGateway>,
}

impl Dispatcher {
    pub fn new(
        classifier: Arc<IntentClassifier>,
        generator: Arc<ResponseGenerator>,
        gateway: Arc<dyn DeliveryGateway>,
    ) -> Self {
        Self {
            classifier,
            generator,
            gateway,
        }
    }

    /// Validate a raw webhook body, then dispatch every event in it.
    ///
    /// A malformed body is rejected before any event is touched.
    pub async fn dispatch_body(&self, body: &[u8]) -> Result<Vec<DispatchResult>, ValidationError> {
        let batch = WebhookBatch::from_slice(body)?;
        Ok(self.dispatch(&batch.events).await)
    }

    /// Process a batch. Returns one result per event, in input order.
    pub async fn dispatch(&self, events: &[InboundEvent]) -> Vec<DispatchResult> {
        let count = events.len();
        info!(count, "Dispatching event batch");

        let results = join_all(
            events
                .iter()
                .enumerate()
                .map(|(index, event)| self.handle_event(index, event)),
        )
        .await;

        let delivered = results
            .iter()
            .filter(|r| r.outcome == DispatchOutcome::Delivered)
            .count();
        let failed = results
            .iter()
            .filter(|r| matches!(r.outcome, DispatchOutcome::DeliveryFailed { .. }))
            .count();
        info!(
            total = count,
            delivered,
            failed,
            skipped = count - delivered - failed,
            "Batch dispatch complete"
        );
        results
    }

    /// Run one event through the pipeline. Never fails; errors become outcomes.
    pub async fn handle_event(&self, index: usize, event: &InboundEvent) -> DispatchResult {
        let outcome = self.process(index, event).await;
        DispatchResult {
            index,
            event_kind: event.kind.clone(),
            outcome,
        }
    }

    async fn process(&self, index: usize, event: &InboundEvent) -> DispatchOutcome {
        let Some(text) = event.text() else {
            debug!(event_index = index, kind = %event.kind, "Skipping non-text event");
            return DispatchOutcome::Skipped;
        };

        info!(
            event_index = index,
            source = %event.source_id_for_log(),
            text = %text,
            "Handling text message"
        );

        let intent = self.classifier.classify(text);
        let payload = self.generator.generate(intent);

        let delivery = match event.reply_token {
            Some(ref handle) => self.gateway.reply(handle, &payload).await,
            None => Err(DeliveryError::MissingReplyHandle),
        };

        match delivery {
            Ok(()) => {
                info!(
                    event_index = index,
                    intent = intent.map(|i| i.as_str()).unwrap_or("none"),
                    gateway = self.gateway.name(),
                    "Reply delivered"
                );
                DispatchOutcome::Delivered
            }
            Err(e) => {
                warn!(
                    event_index = index,
                    gateway = self.gateway.name(),
                    error = %e,
                    "Reply delivery failed"
                );
                DispatchOutcome::DeliveryFailed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
