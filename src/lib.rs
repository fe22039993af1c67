//! LINE Responder: keyword auto-replies and scheduled broadcasts.

pub mod broadcast;
pub mod channels;
pub mod clock;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod responder;
pub mod server;
