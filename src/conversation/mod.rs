//! Conversation log and message model
//!
//! The log is the single ordered history the chat surface renders. Commands
//! add `Loading` placeholders to it and later resolve them by id.

pub mod log;
pub mod message;

pub use log::{ConversationLog, LogError, LogEvent};
pub use message::{Message, MessageId, MessageKind, Origin, Resolution};
