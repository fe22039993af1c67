//! Messaging platform I/O.

pub mod gateway;
pub mod line;

pub use gateway::{DeliveryGateway, ReplyHandle};
pub use line::{LineGateway, verify_signature};
