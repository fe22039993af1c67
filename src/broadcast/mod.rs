//! Time-scheduled broadcasts.
//!
//! - `trigger`: weekday/hour/minute recurrences in a fixed timezone
//! - `engine`: the ticking scheduler that fires due triggers

pub mod engine;
pub mod trigger;

pub use engine::{BroadcastScheduler, spawn_scheduler};
pub use trigger::{
    PayloadFactory, RecurrenceSpec, ScheduleTrigger, default_triggers, parse_timezone,
};
