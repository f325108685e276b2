//! Command dispatcher for the conversational surface
//!
//! Turns one user submission into conversation log entries. Everything that
//! can be decided locally (the user's own message, knowledge base answers,
//! help and clarification prompts, the `Loading` placeholder) is appended
//! synchronously by [`Dispatcher::submit`]. The remote part is returned as a
//! [`PendingOperation`] that resolves exactly its own placeholder, by id, when
//! awaited. Several pending operations may run concurrently and complete in any
//! order.

use std::sync::Arc;

use crate::commands::parser::{parse_command, Command};
use crate::conversation::{ConversationLog, LogError, Message, MessageId, Resolution};
use crate::gateway::{DocumentGateway, DocumentRef, GatewayError};
use crate::knowledge::KnowledgeBase;

/// Reply for text that is neither a knowledge base question nor a command
pub const HELP_TEXT: &str = "I didn't find that in my knowledge base.\n\
You can ask about how the app works, or type commands like:\n\
- \"list\" to show your documents\n\
- \"find <term>\" to search your documents by name\n\
- \"summarize <documentId>\" to generate a summary of an uploaded document\n\
- \"email <documentId>\" to email a document to your account address\n\
Type /help for upload and download actions.";

/// Reply when a listing returns nothing
pub const NO_DOCUMENTS: &str = "You don't have any documents yet.";

/// Summary text when the service has none
pub const NO_SUMMARY: &str = "(No summary generated)";

const FIND_PROMPT: &str = "Please provide a search term. Example: \"find invoice\"";
const SUMMARIZE_PROMPT: &str = "Please provide a document ID. Example: \"summarize 64f123abc123...\"";
const EMAIL_PROMPT: &str = "Please provide a document ID. Example: \"email 64f123abc123...\"";

/// Welcome banner appended when a chat session starts
pub fn welcome_text(user_email: Option<&str>) -> String {
    format!(
        "Hello {} - welcome to SecureDoc AI!\n\
         You can chat with me, upload a document with /upload, or type \
         \"summarize <documentId>\" to get an AI summary.",
        user_email.unwrap_or("there")
    )
}

/// Render documents as numbered lines, 1-indexed in fetch order
pub fn render_documents(documents: &[DocumentRef]) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| format!("{}. {} (ID: {})", i + 1, doc.display_name(), doc.id))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_search(term: &str, documents: &[DocumentRef]) -> String {
    if documents.is_empty() {
        format!("No matches for \"{}\".", term)
    } else {
        format!("Results for \"{}\":\n{}", term, render_documents(documents))
    }
}

/// Remote request behind a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
enum Request {
    List,
    Find(String),
    Summarize(String),
    Email(String),
}

impl Request {
    fn loading_text(&self) -> String {
        match self {
            Self::List => "Fetching your documents...".to_string(),
            Self::Find(term) => format!("Searching for \"{}\"...", term),
            Self::Summarize(id) => format!("Summarizing document {}...", id),
            Self::Email(id) => format!("Emailing document {}...", id),
        }
    }
}

/// Conversational command dispatcher
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use securedoc::config::GatewayConfig;
/// use securedoc::conversation::ConversationLog;
/// use securedoc::dispatcher::Dispatcher;
/// use securedoc::gateway::HttpGateway;
/// use securedoc::knowledge::KnowledgeBase;
///
/// let gateway = Arc::new(HttpGateway::new(&GatewayConfig::default(), None).unwrap());
/// let dispatcher = Dispatcher::new(ConversationLog::new(), gateway, KnowledgeBase::builtin());
///
/// // Unrecognized text is answered locally with the help text.
/// assert!(dispatcher.submit("hello").is_none());
/// assert_eq!(dispatcher.log().len(), 2);
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    log: ConversationLog,
    gateway: Arc<dyn DocumentGateway>,
    knowledge: KnowledgeBase,
}

impl Dispatcher {
    /// Create a dispatcher writing into `log`
    pub fn new(
        log: ConversationLog,
        gateway: Arc<dyn DocumentGateway>,
        knowledge: KnowledgeBase,
    ) -> Self {
        Self {
            log,
            gateway,
            knowledge,
        }
    }

    /// The log this dispatcher writes into
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Append the welcome banner
    pub fn welcome(&self, user_email: Option<&str>) -> MessageId {
        self.log.append(Message::system(welcome_text(user_email)))
    }

    /// Handle the local part of a submission
    ///
    /// Appends the user's message first, then either a local reply or a
    /// `Loading` placeholder. Returns the remote part when there is one.
    /// Blank text is ignored.
    pub fn submit(&self, text: &str) -> Option<PendingOperation> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.log.append(Message::user(text));

        if let Some(answer) = self.knowledge.answer(text) {
            tracing::debug!("Answered from knowledge base");
            self.log.append(Message::knowledge(answer));
            return None;
        }

        let command = parse_command(text);
        tracing::debug!("Parsed command: {}", command);

        let request = match command {
            Command::Unrecognized => return self.reply(HELP_TEXT),
            Command::List => Request::List,
            Command::Find(term) if term.is_empty() => return self.reply(FIND_PROMPT),
            Command::Find(term) => Request::Find(term),
            Command::Summarize(None) => return self.reply(SUMMARIZE_PROMPT),
            Command::Summarize(Some(id)) => Request::Summarize(id),
            Command::Email(None) => return self.reply(EMAIL_PROMPT),
            Command::Email(Some(id)) => Request::Email(id),
        };

        let placeholder = self.log.append(Message::loading(request.loading_text()));
        Some(PendingOperation {
            placeholder,
            request,
            log: self.log.clone(),
            gateway: Arc::clone(&self.gateway),
        })
    }

    /// Submit and run to completion
    ///
    /// Returns the resolved placeholder, or `None` when the submission was
    /// answered locally.
    pub async fn dispatch(&self, text: &str) -> Result<Option<Message>, LogError> {
        match self.submit(text) {
            Some(pending) => pending.run().await.map(Some),
            None => Ok(None),
        }
    }

    fn reply(&self, text: &str) -> Option<PendingOperation> {
        self.log.append(Message::bot(text));
        None
    }
}

/// Remote half of a submission, owning one placeholder
///
/// There is no cancellation: once `run` has started the gateway call, the
/// placeholder is resolved with whatever the call returns.
#[must_use = "the placeholder stays Loading until the operation is run"]
pub struct PendingOperation {
    placeholder: MessageId,
    request: Request,
    log: ConversationLog,
    gateway: Arc<dyn DocumentGateway>,
}

impl std::fmt::Debug for PendingOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingOperation")
            .field("placeholder", &self.placeholder)
            .field("request", &self.request)
            .finish()
    }
}

impl PendingOperation {
    /// Id of the placeholder this operation resolves
    pub fn placeholder(&self) -> MessageId {
        self.placeholder
    }

    /// Call the gateway and resolve the placeholder in one update
    ///
    /// # Errors
    ///
    /// Returns error only if the placeholder was already resolved, which
    /// cannot happen through the public API.
    pub async fn run(self) -> Result<Message, LogError> {
        let resolution = match self.execute().await {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::warn!("Command {:?} failed: {}", self.request, e);
                Resolution::Error(e.user_message())
            }
        };
        self.log.resolve(self.placeholder, resolution)
    }

    async fn execute(&self) -> Result<Resolution, GatewayError> {
        match &self.request {
            Request::List => {
                let documents = self.gateway.list_documents(None).await?;
                let text = if documents.is_empty() {
                    NO_DOCUMENTS.to_string()
                } else {
                    render_documents(&documents)
                };
                Ok(Resolution::Plain(text))
            }
            Request::Find(term) => {
                let documents = self.gateway.list_documents(Some(term)).await?;
                Ok(Resolution::Plain(render_search(term, &documents)))
            }
            Request::Summarize(id) => {
                let summary = self.gateway.get_summary(id).await?;
                Ok(Resolution::Summary {
                    title: format!("Summary for document {}", id),
                    document_id: id.clone(),
                    text: summary.unwrap_or_else(|| NO_SUMMARY.to_string()),
                })
            }
            Request::Email(id) => {
                self.gateway.send_email(id, None).await?;
                Ok(Resolution::Plain(format!(
                    "Document {} has been sent to your email address.",
                    id
                )))
            }
        }
    }
}
