//! Inbound webhook processing pipeline.
//!
//! Every webhook batch flows through:
//! 1. `WebhookBatch::from_slice()`: whole-batch validation
//! 2. `Dispatcher::dispatch()`: concurrent, isolated per-event handling
//! 3. `DeliveryGateway::reply()`: one reply attempt per text message, never retried

pub mod dispatcher;
pub mod types;

pub use dispatcher::Dispatcher;
pub use types::{DispatchOutcome, DispatchResult, InboundEvent, WebhookBatch};
