//! Reply selection: keyword intent classification and payload generation.
//!
//! 1. `IntentClassifier::classify()`: ordered, first-match keyword rules
//! 2. `ResponseGenerator::generate()`: fixed template, random variant, or rich card
//!
//! Both steps are total and side-effect free apart from the random draw.

pub mod catalog;
pub mod generator;
pub mod intent;
pub mod payload;
pub mod random;

pub use generator::{ResponseGenerator, ResponseSource, VariantPool};
pub use intent::{Intent, IntentClassifier, IntentRule};
pub use payload::{CardSection, FontWeight, ResponsePayload, StyleHints, TextSize};
pub use random::{RandomSource, SeededRandom, SequenceRandom, ThreadRandom};
