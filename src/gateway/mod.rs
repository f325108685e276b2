//! Remote operation gateway
//!
//! The conversational core and the transfer orchestrator only depend on the
//! [`DocumentGateway`] trait. [`HttpGateway`] implements it against the
//! SecureDoc REST API.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::secret::Secret;

pub mod http;
pub mod types;

pub use http::HttpGateway;
pub use types::{
    ActivityPage, ActivityQuery, ActivityRecord, DocumentRef, PageMeta, UploadFile,
};

/// Message shown when a failure carries no usable description
pub const GENERIC_FAILURE: &str = "Something went wrong while contacting the document service";

/// Errors reported by a gateway call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The service answered with a non-success status
    #[error("service returned {status}: {}", .message.as_deref().unwrap_or(GENERIC_FAILURE))]
    Remote {
        /// HTTP status code
        status: u16,
        /// `message` field of the failure body, if one could be parsed
        message: Option<String>,
    },

    /// The request never completed (connection refused, timeout, ...)
    #[error("transport failure: {0}")]
    Transport(String),

    /// A success response could not be decoded
    #[error("malformed response: {0}")]
    Decode(String),

    /// No bearer credential is available for the session
    #[error("not signed in; run `securedoc login --token <TOKEN>` first")]
    MissingCredentials,

    /// A local file needed for the request could not be read
    #[error("could not read file {0}")]
    Io(String),
}

impl GatewayError {
    /// Text suitable for the conversation log
    ///
    /// Remote failures show the service's own message when present; transport
    /// and decoding failures fall back to [`GENERIC_FAILURE`].
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            Self::Remote { .. } | Self::Transport(_) | Self::Decode(_) => {
                GENERIC_FAILURE.to_string()
            }
            Self::MissingCredentials | Self::Io(_) => self.to_string(),
        }
    }
}

/// Contract of the remote document service
///
/// Every call is authenticated by the implementation; callers never handle
/// the bearer credential. Secrets are borrowed for the duration of exactly one
/// call.
#[async_trait]
pub trait DocumentGateway: Send + Sync {
    /// List documents, optionally filtered by a search term
    async fn list_documents(&self, query: Option<&str>) -> Result<Vec<DocumentRef>, GatewayError>;

    /// Fetch the server-side summary of a document
    ///
    /// Returns `Ok(None)` when the service has no summary for it.
    async fn get_summary(&self, document_id: &str) -> Result<Option<String>, GatewayError>;

    /// Ask the service to email a document to the account address
    async fn send_email(
        &self,
        document_id: &str,
        secret: Option<&Secret>,
    ) -> Result<(), GatewayError>;

    /// Upload one file secured with `secret`
    ///
    /// Returns the document references the service created.
    async fn upload(
        &self,
        file: &UploadFile,
        secret: &Secret,
    ) -> Result<Vec<DocumentRef>, GatewayError>;

    /// Download and decrypt a document with `secret`
    async fn download(&self, document_id: &str, secret: &Secret) -> Result<Bytes, GatewayError>;

    /// Fetch one page of activity records
    async fn list_activity(&self, query: &ActivityQuery) -> Result<ActivityPage, GatewayError>;
}
