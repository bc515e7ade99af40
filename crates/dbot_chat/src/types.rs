//! Core types for the DisasterBot chat system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a transcript message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Bot,
}

/// A single transcript message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID (UUID)
    pub id: String,
    /// Role of the message sender
    pub role: MessageRole,
    /// Message body, raw (never rendered)
    pub body: String,
    /// Whether the body is pre-formatted markup
    #[serde(rename = "isStructured", default)]
    pub is_structured: bool,
    /// When the message was created
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new user message
    pub fn user(body: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: MessageRole::User,
            body: body.into(),
            is_structured: false,
            created_at: Utc::now(),
        }
    }

    /// Create a new bot message
    pub fn bot(body: impl Into<String>, is_structured: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: MessageRole::Bot,
            body: body.into(),
            is_structured,
            created_at: Utc::now(),
        }
    }
}

/// State change requested by a resolved payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SideEffect {
    #[default]
    None,
    EnterEmergencyMode,
}

/// Which resolution rule produced a payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Intent {
    Emergency,
    Faq { category: String },
    Steps { category: String },
    Contacts,
    Greeting,
    Fallback,
}

impl Intent {
    /// Short label used in logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Faq { .. } => "faq",
            Self::Steps { .. } => "steps",
            Self::Contacts => "contacts",
            Self::Greeting => "greeting",
            Self::Fallback => "fallback",
        }
    }
}

/// Output of the intent resolver
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponsePayload {
    /// Reply body; may contain simple markup
    pub body: String,
    /// `true` when `body` is already formatted and must be inserted as-is,
    /// `false` when it is plain text to be auto-linked before display
    #[serde(rename = "isStructured")]
    pub is_structured: bool,
    /// State change the conversation should apply
    #[serde(rename = "sideEffect")]
    pub side_effect: SideEffect,
    /// Rule that produced this payload
    pub intent: Intent,
}

impl ResponsePayload {
    /// A pre-formatted payload without side effect
    pub fn structured(body: impl Into<String>, intent: Intent) -> Self {
        Self {
            body: body.into(),
            is_structured: true,
            side_effect: SideEffect::None,
            intent,
        }
    }

    /// A plain-text payload without side effect
    pub fn plain(body: impl Into<String>, intent: Intent) -> Self {
        Self {
            body: body.into(),
            is_structured: false,
            side_effect: SideEffect::None,
            intent,
        }
    }

    pub fn with_side_effect(mut self, side_effect: SideEffect) -> Self {
        self.side_effect = side_effect;
        self
    }

    /// Convert into a bot transcript message
    pub fn to_message(&self) -> Message {
        Message::bot(self.body.clone(), self.is_structured)
    }
}
