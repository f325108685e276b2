//! Ordered, id-addressed conversation log
//!
//! Entries are kept in an id → message map plus a separate ordering sequence,
//! so a placeholder is always found by identity and never by position. The
//! log is append-only: messages are never removed, and the only mutation is
//! resolving a `Loading` placeholder into a terminal message, in place.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::mpsc;

use super::message::{Message, MessageId, Resolution};

/// Errors from log mutations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogError {
    /// No message with this id exists
    #[error("No message with id {0}")]
    NotFound(MessageId),

    /// The message exists but is not an in-flight placeholder
    #[error("Message {0} is not a pending placeholder")]
    NotPending(MessageId),
}

/// Change notification delivered to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// A message was appended at the end of the log
    Appended(Message),
    /// A placeholder was replaced in place by its terminal message
    Resolved(Message),
}

#[derive(Debug, Default)]
struct LogState {
    order: Vec<MessageId>,
    entries: HashMap<MessageId, Message>,
    subscribers: Vec<mpsc::UnboundedSender<LogEvent>>,
}

impl LogState {
    fn notify(&mut self, event: LogEvent) {
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Shared handle to a conversation log
///
/// Cloning the handle shares the same underlying log, so the dispatcher, the
/// transfer reporter and the chat renderer all see one ordered history.
///
/// # Examples
///
/// ```
/// use securedoc::conversation::{ConversationLog, Message, Resolution};
///
/// let log = ConversationLog::new();
/// log.append(Message::user("list"));
/// let placeholder = log.append(Message::loading("Fetching documents..."));
/// log.resolve(placeholder, Resolution::Plain("1. a.pdf (ID: 1)".to_string())).unwrap();
///
/// let messages = log.snapshot();
/// assert_eq!(messages.len(), 2);
/// assert_eq!(messages[1].id, placeholder);
/// assert!(!messages[1].is_loading());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    inner: Arc<Mutex<LogState>>,
}

impl ConversationLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, LogState> {
        // A panic while holding the lock cannot leave the map and ordering
        // out of sync: each mutation updates both before releasing.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a message at the end of the log and return its id
    pub fn append(&self, message: Message) -> MessageId {
        let id = message.id;
        let mut state = self.state();
        state.order.push(id);
        state.entries.insert(id, message.clone());
        state.notify(LogEvent::Appended(message));
        id
    }

    /// Resolve a `Loading` placeholder into its terminal message
    ///
    /// The update is atomic: kind and text change together, under one lock,
    /// and the message keeps its id and position.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::NotFound`] for an unknown id and
    /// [`LogError::NotPending`] if the message was already resolved or was
    /// never a placeholder.
    pub fn resolve(&self, id: MessageId, resolution: Resolution) -> Result<Message, LogError> {
        let mut state = self.state();
        let entry = state.entries.get_mut(&id).ok_or(LogError::NotFound(id))?;
        if !entry.is_loading() {
            return Err(LogError::NotPending(id));
        }

        let (kind, text) = resolution.into_parts();
        entry.kind = kind;
        entry.text = text;
        let resolved = entry.clone();

        state.notify(LogEvent::Resolved(resolved.clone()));
        Ok(resolved)
    }

    /// Look up a message by id
    pub fn get(&self, id: MessageId) -> Option<Message> {
        self.state().entries.get(&id).cloned()
    }

    /// Position of a message in display order
    pub fn position(&self, id: MessageId) -> Option<usize> {
        self.state().order.iter().position(|m| *m == id)
    }

    /// Copy of every message in display order
    pub fn snapshot(&self) -> Vec<Message> {
        let state = self.state();
        state
            .order
            .iter()
            .filter_map(|id| state.entries.get(id).cloned())
            .collect()
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.state().order.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.state().order.is_empty()
    }

    /// Number of unresolved placeholders
    pub fn pending_count(&self) -> usize {
        self.state()
            .entries
            .values()
            .filter(|m| m.is_loading())
            .count()
    }

    /// Subscribe to change events
    ///
    /// Events are delivered in the order mutations happened. Dropping the
    /// receiver unsubscribes.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<LogEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state().subscribers.push(tx);
        rx
    }
}
