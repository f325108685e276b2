//! Transfer session state machine
//!
//! Pure state: no I/O happens here. Side effects of the `InFlight` phase are
//! performed by [`super::TransferOrchestrator`], which moves the session
//! through the crate-private transitions below.

use std::path::PathBuf;

use super::{Phase, TransferError};
use crate::gateway::DocumentRef;
use crate::secret::Secret;

/// What a session transfers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferTarget {
    /// Local files to upload, in selection order
    Upload(Vec<PathBuf>),
    /// A listed document to download
    Download(DocumentRef),
    /// A document to email to the account address
    Email {
        /// Document id
        document_id: String,
        /// Display name, if known
        file_name: Option<String>,
    },
}

impl TransferTarget {
    /// Short description for prompts and logs
    pub fn describe(&self) -> String {
        match self {
            Self::Upload(files) if files.len() == 1 => format!("upload of {}", files[0].display()),
            Self::Upload(files) => format!("upload of {} files", files.len()),
            Self::Download(doc) => format!("download of \"{}\"", doc.display_name()),
            Self::Email {
                document_id,
                file_name,
            } => format!(
                "email of \"{}\"",
                file_name.as_deref().unwrap_or(document_id)
            ),
        }
    }
}

/// Result of [`TransferSession::begin`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Begin {
    /// The session now waits for a secret
    CollectSecret,
    /// Unencrypted download resolved to its storage locator; no secret and no
    /// gateway call are involved
    Direct {
        /// Storage locator of the document
        locator: String,
    },
}

/// State of one secure upload, download or email
///
/// # Examples
///
/// ```
/// use securedoc::gateway::DocumentRef;
/// use securedoc::secret::Secret;
/// use securedoc::transfer::{Begin, Phase, TransferSession, TransferTarget};
///
/// let doc = DocumentRef::new("d1", "report.pdf", true);
/// let mut session = TransferSession::new(TransferTarget::Download(doc));
///
/// assert_eq!(session.begin().unwrap(), Begin::CollectSecret);
/// assert!(session.submit_secret(Secret::new("  ")).is_err());
/// assert_eq!(session.phase(), Phase::CollectingSecret);
///
/// session.submit_secret(Secret::new("123456")).unwrap();
/// assert_eq!(session.phase(), Phase::Confirmed);
/// ```
#[derive(Debug)]
pub struct TransferSession {
    target: TransferTarget,
    secret: Secret,
    phase: Phase,
    history: Vec<Phase>,
}

impl TransferSession {
    /// Create an idle session
    pub fn new(target: TransferTarget) -> Self {
        Self {
            target,
            secret: Secret::default(),
            phase: Phase::Idle,
            history: vec![Phase::Idle],
        }
    }

    /// Upload session for `files`
    pub fn upload(files: Vec<PathBuf>) -> Self {
        Self::new(TransferTarget::Upload(files))
    }

    /// Download session for `document`
    pub fn download(document: DocumentRef) -> Self {
        Self::new(TransferTarget::Download(document))
    }

    /// Email session for a document id
    pub fn email(document_id: impl Into<String>, file_name: Option<String>) -> Self {
        Self::new(TransferTarget::Email {
            document_id: document_id.into(),
            file_name,
        })
    }

    /// What this session transfers
    pub fn target(&self) -> &TransferTarget {
        &self.target
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Every phase entered so far, starting with `Idle`
    pub fn history(&self) -> &[Phase] {
        &self.history
    }

    /// Whether the session ever entered `phase`
    pub fn visited(&self, phase: Phase) -> bool {
        self.history.contains(&phase)
    }

    /// Whether no secret is held
    pub fn secret_cleared(&self) -> bool {
        self.secret.is_empty()
    }

    /// Whether this session needs a secret at all
    pub fn requires_secret(&self) -> bool {
        !matches!(&self.target, TransferTarget::Download(doc) if !doc.encrypted)
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!("Transfer {} -> {}", self.phase, phase);
        self.phase = phase;
        self.history.push(phase);
    }

    fn invalid(&self, action: &'static str) -> TransferError {
        TransferError::InvalidTransition {
            phase: self.phase,
            action,
        }
    }

    /// Start the session
    ///
    /// Unencrypted downloads go straight to `Succeeded` with their storage
    /// locator. Everything else moves to `CollectingSecret`.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidTransition`] unless the session is idle
    pub fn begin(&mut self) -> Result<Begin, TransferError> {
        if self.phase != Phase::Idle {
            return Err(self.invalid("start"));
        }

        if !self.requires_secret() {
            if let TransferTarget::Download(doc) = &self.target {
                let locator = doc.path.clone();
                self.enter(Phase::Succeeded);
                return Ok(Begin::Direct { locator });
            }
        }

        self.enter(Phase::CollectingSecret);
        Ok(Begin::CollectSecret)
    }

    /// Submit the collected secret
    ///
    /// A blank secret is rejected and the session stays in
    /// `CollectingSecret`; the rejected value is wiped when dropped.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::EmptySecret`] for a blank secret, or
    /// [`TransferError::InvalidTransition`] outside `CollectingSecret`
    pub fn submit_secret(&mut self, secret: Secret) -> Result<(), TransferError> {
        if self.phase != Phase::CollectingSecret {
            return Err(self.invalid("submit a secret"));
        }
        if secret.is_blank() {
            return Err(TransferError::EmptySecret);
        }
        self.secret = secret;
        self.enter(Phase::Confirmed);
        Ok(())
    }

    /// Abandon the session before anything was sent
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidTransition`] once a call is in flight
    /// or the session has finished
    pub fn cancel(&mut self) -> Result<(), TransferError> {
        match self.phase {
            Phase::CollectingSecret | Phase::Confirmed => {
                self.secret.clear();
                self.enter(Phase::Idle);
                Ok(())
            }
            _ => Err(self.invalid("cancel")),
        }
    }

    pub(crate) fn launch(&mut self) -> Result<(), TransferError> {
        if self.phase != Phase::Confirmed {
            return Err(self.invalid("send"));
        }
        self.enter(Phase::InFlight);
        Ok(())
    }

    pub(crate) fn secret(&self) -> &Secret {
        &self.secret
    }

    pub(crate) fn succeed(&mut self) {
        self.secret.clear();
        self.enter(Phase::Succeeded);
    }

    /// `InFlight -> Failed -> Idle`; a failed session may be started again
    pub(crate) fn fail(&mut self) {
        self.secret.clear();
        self.enter(Phase::Failed);
        self.enter(Phase::Idle);
    }
}
