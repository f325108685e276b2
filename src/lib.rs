//! SecureDoc - encrypted document client library
//!
//! This library provides the core functionality of the SecureDoc client: a
//! conversational assistant over the user's encrypted documents, the secure
//! upload/download flow, and the document and activity views.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `knowledge`: Canned answers matched against free text
//! - `commands`: Free-text and slash command parsers plus the CLI handlers
//! - `conversation`: Ordered, id-addressed conversation log
//! - `dispatcher`: Turns a submission into log entries and remote calls
//! - `transfer`: Secure transfer sessions, orchestration and payload handling
//! - `gateway`: Remote document service contract and its HTTP client
//! - `documents`, `activity`: Direct document list and activity log views
//! - `config`, `session`, `error`, `cli`: Application plumbing
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use securedoc::{Config, ConversationLog, Dispatcher};
//! use securedoc::gateway::HttpGateway;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let gateway = Arc::new(HttpGateway::new(&config.gateway, config.session.token.clone())?);
//!     let dispatcher = Dispatcher::new(ConversationLog::new(), gateway, config.knowledge_base());
//!     if let Some(message) = dispatcher.dispatch("list").await? {
//!         println!("{}", message.text);
//!     }
//!     Ok(())
//! }
//! ```

pub mod activity;
pub mod cli;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod dispatcher;
pub mod documents;
pub mod error;
pub mod gateway;
pub mod knowledge;
pub mod secret;
pub mod session;
pub mod transfer;

// Re-export commonly used types
pub use config::Config;
pub use conversation::{ConversationLog, Message, MessageKind};
pub use dispatcher::{Dispatcher, PendingOperation};
pub use error::{Result, SecureDocError};
pub use gateway::{DocumentGateway, DocumentRef, GatewayError, HttpGateway};
pub use transfer::{TransferOrchestrator, TransferOutcome, TransferSession};

#[cfg(test)]
pub mod test_utils;
