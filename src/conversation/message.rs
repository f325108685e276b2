//! Conversation log message types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque, immutable message identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Typed by the user
    User,
    /// Produced by the assistant
    Bot,
}

/// What a message represents
///
/// `Loading` is the only non-terminal kind: it marks an operation in flight
/// and is later replaced, in place, by `Plain`, `Summary` or `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageKind {
    /// Ordinary text
    Plain,
    /// Session notices such as the welcome banner
    System,
    /// Canned answer from the knowledge base
    KnowledgeAnswer,
    /// Placeholder for an operation in flight
    Loading,
    /// Document summary card
    Summary {
        /// Card title
        title: String,
        /// Document the summary belongs to
        document_id: String,
    },
    /// Failure report
    Error,
}

impl MessageKind {
    /// Whether this kind ends an operation (anything but `Loading`)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Loading)
    }

    /// Short label, used in logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::System => "system",
            Self::KnowledgeAnswer => "knowledge",
            Self::Loading => "loading",
            Self::Summary { .. } => "summary",
            Self::Error => "error",
        }
    }
}

/// One entry of the conversation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Identity, fixed at creation
    pub id: MessageId,
    /// Author
    pub origin: Origin,
    /// Variant
    pub kind: MessageKind,
    /// Display text
    pub text: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(origin: Origin, kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            origin,
            kind,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    /// Plain text typed by the user
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Origin::User, MessageKind::Plain, text)
    }

    /// Plain assistant reply
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Origin::Bot, MessageKind::Plain, text)
    }

    /// Session notice
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Origin::Bot, MessageKind::System, text)
    }

    /// Knowledge base answer
    pub fn knowledge(text: impl Into<String>) -> Self {
        Self::new(Origin::Bot, MessageKind::KnowledgeAnswer, text)
    }

    /// In-flight placeholder
    pub fn loading(text: impl Into<String>) -> Self {
        Self::new(Origin::Bot, MessageKind::Loading, text)
    }

    /// Summary card
    pub fn summary(
        title: impl Into<String>,
        document_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::new(
            Origin::Bot,
            MessageKind::Summary {
                title: title.into(),
                document_id: document_id.into(),
            },
            text,
        )
    }

    /// Failure report
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Origin::Bot, MessageKind::Error, text)
    }

    /// Whether this message is an in-flight placeholder
    pub fn is_loading(&self) -> bool {
        matches!(self.kind, MessageKind::Loading)
    }
}

/// Terminal content a placeholder is resolved into
///
/// Applied with [`crate::conversation::ConversationLog::resolve`]; it only
/// carries terminal variants so a placeholder can never be "resolved" back
/// into another placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Success text
    Plain(String),
    /// Summary card
    Summary {
        /// Card title
        title: String,
        /// Document the summary belongs to
        document_id: String,
        /// Summary body
        text: String,
    },
    /// Failure text
    Error(String),
}

impl Resolution {
    pub(crate) fn into_parts(self) -> (MessageKind, String) {
        match self {
            Self::Plain(text) => (MessageKind::Plain, text),
            Self::Summary {
                title,
                document_id,
                text,
            } => (MessageKind::Summary { title, document_id }, text),
            Self::Error(text) => (MessageKind::Error, text),
        }
    }
}
