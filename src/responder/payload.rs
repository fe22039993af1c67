//! Response payloads: plain text replies and structured rich cards.
//!
//! Payloads are plain values: once built they are only read, cloned, or
//! serialized. The channel adapter owns the exact wire schema.

use serde::{Deserialize, Serialize};

/// What the responder sends back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsePayload {
    /// A single text message.
    PlainText { text: String },
    /// A titled card with ordered text sections.
    RichCard {
        /// Fallback text shown where cards cannot render (notifications, old clients).
        alt_text: String,
        title: String,
        /// Style applied to the title line.
        #[serde(default)]
        title_style: StyleHints,
        sections: Vec<CardSection>,
    },
}

impl ResponsePayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self::PlainText { text: text.into() }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PlainText { .. } => "plain_text",
            Self::RichCard { .. } => "rich_card",
        }
    }

    /// The text body of a `PlainText` payload.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::PlainText { text } => Some(text),
            Self::RichCard { .. } => None,
        }
    }
}

/// One line block inside a rich card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSection {
    pub text: String,
    #[serde(default)]
    pub style: StyleHints,
}

impl CardSection {
    pub fn new(text: impl Into<String>, style: StyleHints) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// Optional presentation hints for a card line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<FontWeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<TextSize>,
    /// Hex colour, e.g. `#1DB446`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Space above the line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<TextSize>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub wrap: bool,
}

impl StyleHints {
    pub fn bold(mut self) -> Self {
        self.weight = Some(FontWeight::Bold);
        self
    }

    pub fn size(mut self, size: TextSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn margin(mut self, margin: TextSize) -> Self {
        self.margin = Some(margin);
        self
    }

    pub fn wrap(mut self) -> Self {
        self.wrap = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Regular,
    Bold,
}

impl FontWeight {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Bold => "bold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSize {
    Xs,
    Sm,
    Md,
    Lg,
    Xl,
}

impl TextSize {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Xs => "xs",
            Self::Sm => "sm",
            Self::Md => "md",
            Self::Lg => "lg",
            Self::Xl => "xl",
        }
    }
}
