//! Secret-gated document transfers
//!
//! A [`TransferSession`] is the state machine of one upload, download or
//! email action. It owns the secret for exactly that session and clears it on
//! every terminal transition. The [`TransferOrchestrator`] drives a confirmed
//! session against the gateway, materializes downloaded payloads as
//! [`BlobHandle`]s and hands them to a [`SaveTarget`].
//!
//! ```text
//! Idle -> CollectingSecret -> Confirmed -> InFlight -> Succeeded
//!   ^            |                            |
//!   +--cancel----+            Idle <- Failed -+
//! ```

use std::fmt;

use thiserror::Error;

pub mod blob;
pub mod orchestrator;
pub mod report;
pub mod save;
pub mod session;

pub use blob::{BlobHandle, BlobRegistry};
pub use orchestrator::{TransferOrchestrator, TransferOutcome, UploadEntry, UploadReport};
pub use report::report_outcome;
pub use save::{sanitize_file_name, DirectorySaveTarget, SaveTarget};
pub use session::{Begin, TransferSession, TransferTarget};

/// Phase of a transfer session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    CollectingSecret,
    Confirmed,
    InFlight,
    Succeeded,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::CollectingSecret => "collecting secret",
            Self::Confirmed => "confirmed",
            Self::InFlight => "in flight",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Errors raised by transfer sessions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The requested step is not allowed from the current phase
    #[error("Cannot {action} while the transfer is {phase}")]
    InvalidTransition {
        /// Current phase
        phase: Phase,
        /// Attempted step
        action: &'static str,
    },

    /// A blank password or OTP was submitted
    #[error("Please enter a password or OTP")]
    EmptySecret,

    /// A downloaded payload could not be written
    #[error("Could not save {file_name}: {reason}")]
    Save {
        /// File name the payload was being saved under
        file_name: String,
        /// Underlying failure
        reason: String,
    },
}
