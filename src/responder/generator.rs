//! Response generator. Maps a classified intent to a reply payload.
//!
//! Fixed templates are returned as-is, variant pools draw one element per
//! call through the injected [`RandomSource`], and unmatched messages draw
//! from the default pool.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc, Weekday};
use chrono_tz::Tz;
use tracing::debug;

use super::catalog;
use super::intent::Intent;
use super::payload::ResponsePayload;
use super::random::RandomSource;
use crate::clock::Clock;

/// A fixed, non-empty set of interchangeable replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantPool {
    variants: Vec<ResponsePayload>,
}

impl VariantPool {
    /// Returns `None` for an empty list.
    pub fn new(variants: Vec<ResponsePayload>) -> Option<Self> {
        if variants.is_empty() {
            None
        } else {
            Some(Self { variants })
        }
    }

    /// Build a pool of plain-text replies.
    pub fn from_texts<const N: usize>(texts: [&str; N]) -> Self {
        const { assert!(N > 0, "variant pool must not be empty") };
        Self {
            variants: texts.into_iter().map(ResponsePayload::text).collect(),
        }
    }

    pub fn variants(&self) -> &[ResponsePayload] {
        &self.variants
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Draw one variant. Every call is an independent draw.
    pub fn draw(&self, rng: &dyn RandomSource) -> &ResponsePayload {
        let len = self.variants.len();
        &self.variants[rng.pick(len) % len]
    }
}

/// How an intent's reply is produced.
#[derive(Debug, Clone)]
pub enum ResponseSource {
    /// Always the same payload.
    Fixed(ResponsePayload),
    /// One of several payloads, chosen at random.
    Pool(VariantPool),
    /// The current local time in the given timezone.
    CurrentTime { timezone: Tz },
}

/// Produces reply payloads. Holds only read-only state after construction.
pub struct ResponseGenerator {
    sources: HashMap<Intent, ResponseSource>,
    default_pool: VariantPool,
    rng: Arc<dyn RandomSource>,
    clock: Arc<dyn Clock>,
}

impl ResponseGenerator {
    /// Create a generator with no intent sources; everything falls back to `default_pool`.
    pub fn new(
        default_pool: VariantPool,
        rng: Arc<dyn RandomSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sources: HashMap::new(),
            default_pool,
            rng,
            clock,
        }
    }

    /// The production reply catalog.
    pub fn with_default_catalog(
        timezone: Tz,
        rng: Arc<dyn RandomSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        use ResponseSource::{CurrentTime, Fixed, Pool};

        Self::new(VariantPool::from_texts(catalog::DEFAULT_VARIANTS), rng, clock)
            .with_source(
                Intent::MorningGreeting,
                Fixed(ResponsePayload::text(catalog::MORNING_GREETING)),
            )
            .with_source(Intent::Hello, Fixed(ResponsePayload::text(catalog::HELLO)))
            .with_source(
                Intent::GoodNight,
                Fixed(ResponsePayload::text(catalog::GOOD_NIGHT)),
            )
            .with_source(Intent::Time, CurrentTime { timezone })
            .with_source(
                Intent::Weather,
                Pool(VariantPool::from_texts(catalog::WEATHER_VARIANTS)),
            )
            .with_source(Intent::Tired, Fixed(ResponsePayload::text(catalog::TIRED)))
            .with_source(Intent::Cheer, Fixed(ResponsePayload::text(catalog::CHEER)))
            .with_source(Intent::Thanks, Fixed(ResponsePayload::text(catalog::THANKS)))
            .with_source(
                Intent::AboutBot,
                Fixed(ResponsePayload::text(catalog::ABOUT_BOT)),
            )
            .with_source(Intent::Help, Fixed(catalog::help_card()))
    }

    /// Register (or replace) the source for an intent.
    pub fn with_source(mut self, intent: Intent, source: ResponseSource) -> Self {
        self.sources.insert(intent, source);
        self
    }

    pub fn source_for(&self, intent: Intent) -> Option<&ResponseSource> {
        self.sources.get(&intent)
    }

    pub fn default_pool(&self) -> &VariantPool {
        &self.default_pool
    }

    /// Produce the reply for a classification result.
    pub fn generate(&self, intent: Option<Intent>) -> ResponsePayload {
        let source = intent.and_then(|i| self.sources.get(&i));

        let payload = match source {
            Some(ResponseSource::Fixed(payload)) => payload.clone(),
            Some(ResponseSource::Pool(pool)) => pool.draw(self.rng.as_ref()).clone(),
            Some(ResponseSource::CurrentTime { timezone }) => {
                let formatted = format_local_time(self.clock.now(), *timezone);
                ResponsePayload::text(catalog::current_time_text(&formatted))
            }
            None => self.default_pool.draw(self.rng.as_ref()).clone(),
        };

        debug!(
            intent = intent.map(Intent::as_str).unwrap_or("none"),
            payload = payload.label(),
            "Generated response"
        );
        payload
    }
}

/// Render an instant as `2024年1月15日(月) 08:05` in `timezone`.
pub fn format_local_time(instant: DateTime<Utc>, timezone: Tz) -> String {
    let local = instant.with_timezone(&timezone);
    format!(
        "{}年{}月{}日({}) {}",
        local.year(),
        local.month(),
        local.day(),
        weekday_kanji(local.weekday()),
        local.format("%H:%M"),
    )
}

fn weekday_kanji(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "月",
        Weekday::Tue => "火",
        Weekday::Wed => "水",
        Weekday::Thu => "木",
        Weekday::Fri => "金",
        Weekday::Sat => "土",
        Weekday::Sun => "日",
    }
}
