//! Keyword intent classifier.
//!
//! Rules are evaluated in declared order against the case-folded message
//! text. The first rule with a keyword contained in the text wins; later
//! rules are never consulted. There is no scoring and no fuzzy fallback.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Classification label for an inbound text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    MorningGreeting,
    Hello,
    GoodNight,
    Time,
    Weather,
    Tired,
    Cheer,
    Thanks,
    AboutBot,
    Help,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MorningGreeting => "morning_greeting",
            Self::Hello => "hello",
            Self::GoodNight => "good_night",
            Self::Time => "time",
            Self::Weather => "weather",
            Self::Tired => "tired",
            Self::Cheer => "cheer",
            Self::Thanks => "thanks",
            Self::AboutBot => "about_bot",
            Self::Help => "help",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ordered classification rule: any keyword contained in the text matches.
#[derive(Debug, Clone)]
pub struct IntentRule {
    pub intent: Intent,
    /// Case-folded keywords.
    keywords: Vec<String>,
}

impl IntentRule {
    pub fn new<I, S>(intent: Intent, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            intent,
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Whether the already case-folded text contains any keyword.
    pub fn matches(&self, normalized: &str) -> bool {
        self.keywords.iter().any(|k| normalized.contains(k.as_str()))
    }
}

/// Ordered rule list. Built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: Vec<IntentRule>,
}

impl IntentClassifier {
    pub fn new(rules: Vec<IntentRule>) -> Self {
        Self { rules }
    }

    /// The production rule set, in priority order.
    pub fn default_rules() -> Self {
        Self::new(vec![
            IntentRule::new(Intent::MorningGreeting, ["おはよう", "good morning"]),
            IntentRule::new(Intent::Hello, ["こんにちは", "hello"]),
            IntentRule::new(Intent::GoodNight, ["おやすみ", "good night"]),
            IntentRule::new(Intent::Time, ["時間", "何時", "time"]),
            IntentRule::new(Intent::Weather, ["天気", "weather"]),
            IntentRule::new(Intent::Tired, ["疲れ", "tired", "しんど"]),
            IntentRule::new(Intent::Cheer, ["頑張", "がんば"]),
            IntentRule::new(Intent::Thanks, ["ありがとう", "thanks"]),
            IntentRule::new(Intent::AboutBot, ["ボット", "bot", "あなた"]),
            IntentRule::new(Intent::Help, ["ヘルプ", "help", "使い方"]),
        ])
    }

    /// A classifier that never matches (for testing).
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Append a rule at the lowest priority.
    pub fn with_rule(mut self, rule: IntentRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    /// Classify raw message text. Returns `None` when no rule matches.
    pub fn classify(&self, text: &str) -> Option<Intent> {
        let normalized = text.to_lowercase();
        let intent = self
            .rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map(|rule| rule.intent);

        debug!(intent = ?intent, "Classified message");
        intent
    }
}
