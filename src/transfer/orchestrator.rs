//! Drives confirmed transfer sessions against the gateway

use std::path::PathBuf;
use std::sync::Arc;

use super::{BlobRegistry, Phase, SaveTarget, TransferError, TransferSession, TransferTarget};
use crate::gateway::{DocumentGateway, DocumentRef, GatewayError, UploadFile};

/// Result of uploading one selected file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEntry {
    /// File name as selected
    pub file_name: String,
    /// Created documents, or the failure message
    pub result: Result<Vec<DocumentRef>, String>,
}

/// Per-file results of an upload session, in selection order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub entries: Vec<UploadEntry>,
}

impl UploadReport {
    /// Whether at least one file was uploaded
    pub fn any_succeeded(&self) -> bool {
        self.entries.iter().any(|e| e.result.is_ok())
    }

    /// Documents created across all files
    pub fn documents(&self) -> impl Iterator<Item = &DocumentRef> {
        self.entries
            .iter()
            .filter_map(|e| e.result.as_ref().ok())
            .flatten()
    }

    /// Failure messages with their file names
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|e| match &e.result {
            Err(message) => Some((e.file_name.as_str(), message.as_str())),
            Ok(_) => None,
        })
    }
}

/// What a transfer session ended with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Upload finished; see the report for per-file results
    Uploaded(UploadReport),
    /// Payload saved locally
    Downloaded {
        /// Document that was downloaded
        document: DocumentRef,
        /// Where it was written
        path: PathBuf,
    },
    /// Email requested
    Emailed {
        /// Document id
        document_id: String,
    },
    /// Unencrypted document resolved without a secret
    Located {
        /// Document
        document: DocumentRef,
        /// Storage locator
        locator: String,
    },
    /// No files were selected; nothing was sent
    Cancelled,
    /// The gateway call or the local save failed
    Failed {
        /// Message for the user
        message: String,
    },
}

impl TransferOutcome {
    /// Whether the session ended in `Succeeded`
    pub fn is_success(&self) -> bool {
        match self {
            Self::Uploaded(report) => report.any_succeeded(),
            Self::Downloaded { .. } | Self::Emailed { .. } | Self::Located { .. } => true,
            Self::Cancelled | Self::Failed { .. } => false,
        }
    }
}

/// Runs transfer sessions
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use securedoc::config::GatewayConfig;
/// use securedoc::gateway::{DocumentRef, HttpGateway};
/// use securedoc::secret::Secret;
/// use securedoc::transfer::{Begin, DirectorySaveTarget, TransferOrchestrator, TransferSession};
///
/// # async fn example() -> anyhow::Result<()> {
/// let gateway = Arc::new(HttpGateway::new(&GatewayConfig::default(), Some("token".into()))?);
/// let orchestrator = TransferOrchestrator::new(gateway, Arc::new(DirectorySaveTarget::new("downloads")));
///
/// let mut session = TransferSession::download(DocumentRef::new("d1", "report.pdf", true));
/// if session.begin()? == Begin::CollectSecret {
///     session.submit_secret(Secret::new("123456"))?;
///     let outcome = orchestrator.execute(&mut session).await?;
///     println!("{:?}", outcome);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TransferOrchestrator {
    gateway: Arc<dyn DocumentGateway>,
    save_target: Arc<dyn SaveTarget>,
    blobs: BlobRegistry,
}

impl TransferOrchestrator {
    /// Create an orchestrator saving downloads into `save_target`
    pub fn new(gateway: Arc<dyn DocumentGateway>, save_target: Arc<dyn SaveTarget>) -> Self {
        Self {
            gateway,
            save_target,
            blobs: BlobRegistry::new(),
        }
    }

    /// Registry of download payloads not yet released
    pub fn blobs(&self) -> &BlobRegistry {
        &self.blobs
    }

    /// Start a session, resolving the unencrypted download shortcut
    ///
    /// Returns `Some(outcome)` when the session finished without needing a
    /// secret, `None` when it now waits in `CollectingSecret`.
    ///
    /// # Errors
    ///
    /// Returns error if the session is not idle
    pub fn begin(
        &self,
        session: &mut TransferSession,
    ) -> Result<Option<TransferOutcome>, TransferError> {
        match session.begin()? {
            super::Begin::CollectSecret => Ok(None),
            super::Begin::Direct { locator } => {
                let document = match session.target() {
                    TransferTarget::Download(doc) => doc.clone(),
                    _ => return Ok(None),
                };
                tracing::info!("Document {} is not encrypted, using its locator", document.id);
                Ok(Some(TransferOutcome::Located { document, locator }))
            }
        }
    }

    /// Perform the transfer of a confirmed session
    ///
    /// Moves the session to `InFlight`, makes the gateway call(s) with the
    /// session's secret, and ends in `Succeeded` or `Failed` (then `Idle`).
    /// The secret is cleared in both cases. Remote and save failures are
    /// reported through [`TransferOutcome::Failed`], not as errors.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidTransition`] if the session is not
    /// `Confirmed`
    pub async fn execute(
        &self,
        session: &mut TransferSession,
    ) -> Result<TransferOutcome, TransferError> {
        if session.phase() != Phase::Confirmed {
            return Err(TransferError::InvalidTransition {
                phase: session.phase(),
                action: "send",
            });
        }

        if let TransferTarget::Upload(files) = session.target() {
            if files.is_empty() {
                tracing::info!("No files selected, upload cancelled");
                session.cancel()?;
                return Ok(TransferOutcome::Cancelled);
            }
        }

        session.launch()?;
        tracing::info!("Starting {}", session.target().describe());

        let outcome = match session.target().clone() {
            TransferTarget::Upload(files) => self.upload(session, &files).await,
            TransferTarget::Download(document) => self.download(session, document).await,
            TransferTarget::Email { document_id, .. } => self.email(session, document_id).await,
        };

        if outcome.is_success() {
            session.succeed();
        } else {
            session.fail();
        }
        Ok(outcome)
    }

    async fn upload(&self, session: &TransferSession, files: &[PathBuf]) -> TransferOutcome {
        let mut report = UploadReport::default();

        for path in files {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());

            let result = match UploadFile::from_path(path).await {
                Ok(file) => self.gateway.upload(&file, session.secret()).await,
                Err(e) => Err(e),
            };

            if let Err(e) = &result {
                tracing::warn!("Upload of {} failed: {}", file_name, e);
            }
            report.entries.push(UploadEntry {
                file_name,
                result: result.map_err(|e| e.user_message()),
            });
        }

        TransferOutcome::Uploaded(report)
    }

    async fn download(&self, session: &TransferSession, document: DocumentRef) -> TransferOutcome {
        let payload = match self.gateway.download(&document.id, session.secret()).await {
            Ok(payload) => payload,
            Err(e) => return failed(&e),
        };

        let blob = self.blobs.register(document.display_name(), payload);
        let saved = self.save_target.save(&blob).await;
        blob.release();

        match saved {
            Ok(path) => TransferOutcome::Downloaded { document, path },
            Err(e) => {
                tracing::error!("{}", e);
                TransferOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    async fn email(&self, session: &TransferSession, document_id: String) -> TransferOutcome {
        match self
            .gateway
            .send_email(&document_id, Some(session.secret()))
            .await
        {
            Ok(()) => TransferOutcome::Emailed { document_id },
            Err(e) => failed(&e),
        }
    }
}

fn failed(error: &GatewayError) -> TransferOutcome {
    tracing::warn!("Transfer failed: {}", error);
    TransferOutcome::Failed {
        message: error.user_message(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::Secret;
    use crate::test_utils::{create_test_file, temp_dir, FakeCall, FakeGateway};
    use crate::transfer::DirectorySaveTarget;
    use async_trait::async_trait;

    struct FailingSave;

    #[async_trait]
    impl SaveTarget for FailingSave {
        async fn save(&self, blob: &crate::transfer::BlobHandle) -> Result<PathBuf, TransferError> {
            Err(TransferError::Save {
                file_name: blob.file_name().to_string(),
                reason: "disk full".to_string(),
            })
        }
    }

    fn orchestrator(gateway: &FakeGateway, dir: &std::path::Path) -> TransferOrchestrator {
        TransferOrchestrator::new(
            Arc::new(gateway.clone()),
            Arc::new(DirectorySaveTarget::new(dir)),
        )
    }

    fn confirmed(mut session: TransferSession, secret: &str) -> TransferSession {
        session.begin().unwrap();
        session.submit_secret(Secret::new(secret)).unwrap();
        session
    }

    #[tokio::test]
    async fn test_download_saves_and_releases_blob() {
        let dir = temp_dir();
        let gateway = FakeGateway::new().with_download(b"%PDF-1.7");
        let orch = orchestrator(&gateway, dir.path());

        let doc = DocumentRef::new("d1", "report.pdf", true);
        let mut session = confirmed(TransferSession::download(doc.clone()), "123456");
        let outcome = orch.execute(&mut session).await.unwrap();

        let expected_path = dir.path().join("report.pdf");
        assert_eq!(
            outcome,
            TransferOutcome::Downloaded {
                document: doc,
                path: expected_path.clone()
            }
        );
        assert_eq!(std::fs::read(expected_path).unwrap(), b"%PDF-1.7");
        assert_eq!(session.phase(), Phase::Succeeded);
        assert!(session.secret_cleared());
        assert_eq!(orch.blobs().live(), 0);
        assert_eq!(
            gateway.calls(),
            vec![FakeCall::Download("d1".to_string(), "123456".to_string())]
        );
    }

    #[tokio::test]
    async fn test_download_failure_returns_to_idle() {
        let dir = temp_dir();
        let gateway = FakeGateway::new().with_download_error(GatewayError::Remote {
            status: 401,
            message: Some("Invalid OTP".to_string()),
        });
        let orch = orchestrator(&gateway, dir.path());

        let mut session = confirmed(
            TransferSession::download(DocumentRef::new("d1", "report.pdf", true)),
            "000000",
        );
        let outcome = orch.execute(&mut session).await.unwrap();

        assert_eq!(
            outcome,
            TransferOutcome::Failed {
                message: "Invalid OTP".to_string()
            }
        );
        assert!(session.visited(Phase::Failed));
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.secret_cleared());
        assert_eq!(orch.blobs().live(), 0);
    }

    #[tokio::test]
    async fn test_save_failure_releases_blob() {
        let gateway = FakeGateway::new().with_download(b"data");
        let orch = TransferOrchestrator::new(Arc::new(gateway.clone()), Arc::new(FailingSave));

        let mut session = confirmed(
            TransferSession::download(DocumentRef::new("d1", "report.pdf", true)),
            "pw",
        );
        let outcome = orch.execute(&mut session).await.unwrap();

        assert!(matches!(outcome, TransferOutcome::Failed { ref message } if message.contains("disk full")));
        assert_eq!(orch.blobs().live(), 0);
        assert!(session.secret_cleared());
    }

    #[tokio::test]
    async fn test_unencrypted_download_makes_no_gateway_call() {
        let dir = temp_dir();
        let gateway = FakeGateway::new();
        let orch = orchestrator(&gateway, dir.path());

        let doc = DocumentRef::new("d2", "open.pdf", false).with_path("https://bucket/open.pdf");
        let mut session = TransferSession::download(doc.clone());
        let outcome = orch.begin(&mut session).unwrap();

        assert_eq!(
            outcome,
            Some(TransferOutcome::Located {
                document: doc,
                locator: "https://bucket/open.pdf".to_string()
            })
        );
        assert!(!session.visited(Phase::CollectingSecret));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_sends_same_secret_for_every_file() {
        let dir = temp_dir();
        let a = create_test_file(&dir, "a.pdf", "A");
        let b = create_test_file(&dir, "b.pdf", "B");
        let gateway = FakeGateway::new();
        let orch = orchestrator(&gateway, dir.path());

        let mut session = confirmed(TransferSession::upload(vec![a, b]), "s3cret");
        let outcome = orch.execute(&mut session).await.unwrap();

        let TransferOutcome::Uploaded(report) = outcome else {
            panic!("expected upload outcome");
        };
        assert_eq!(report.documents().count(), 2);
        assert_eq!(
            gateway.calls(),
            vec![
                FakeCall::Upload("a.pdf".to_string(), "s3cret".to_string()),
                FakeCall::Upload("b.pdf".to_string(), "s3cret".to_string()),
            ]
        );
        assert_eq!(session.phase(), Phase::Succeeded);
        assert!(session.secret_cleared());
    }

    #[tokio::test]
    async fn test_upload_partial_failure_still_succeeds() {
        let dir = temp_dir();
        let a = create_test_file(&dir, "a.pdf", "A");
        let missing = dir.path().join("missing.pdf");
        let gateway = FakeGateway::new();
        let orch = orchestrator(&gateway, dir.path());

        let mut session = confirmed(TransferSession::upload(vec![a, missing]), "pw");
        let outcome = orch.execute(&mut session).await.unwrap();

        let TransferOutcome::Uploaded(report) = &outcome else {
            panic!("expected upload outcome");
        };
        assert!(report.any_succeeded());
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "missing.pdf");
        assert!(outcome.is_success());
        assert_eq!(session.phase(), Phase::Succeeded);
        // Unreadable files never reach the gateway.
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn test_upload_all_failed_fails_session() {
        let dir = temp_dir();
        let a = create_test_file(&dir, "a.pdf", "A");
        let gateway = FakeGateway::new().with_upload(
            "a.pdf",
            Err(GatewayError::Remote {
                status: 413,
                message: Some("File too large".to_string()),
            }),
        );
        let orch = orchestrator(&gateway, dir.path());

        let mut session = confirmed(TransferSession::upload(vec![a]), "pw");
        let outcome = orch.execute(&mut session).await.unwrap();

        assert!(!outcome.is_success());
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.visited(Phase::Failed));
        assert!(session.secret_cleared());
    }

    #[tokio::test]
    async fn test_upload_without_files_cancels() {
        let dir = temp_dir();
        let gateway = FakeGateway::new();
        let orch = orchestrator(&gateway, dir.path());

        let mut session = confirmed(TransferSession::upload(vec![]), "pw");
        let outcome = orch.execute(&mut session).await.unwrap();

        assert_eq!(outcome, TransferOutcome::Cancelled);
        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.visited(Phase::InFlight));
        assert!(session.secret_cleared());
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_email_carries_secret() {
        let dir = temp_dir();
        let gateway = FakeGateway::new();
        let orch = orchestrator(&gateway, dir.path());

        let mut session = confirmed(TransferSession::email("d7", None), "pw");
        let outcome = orch.execute(&mut session).await.unwrap();

        assert_eq!(
            outcome,
            TransferOutcome::Emailed {
                document_id: "d7".to_string()
            }
        );
        assert_eq!(
            gateway.calls(),
            vec![FakeCall::Email("d7".to_string(), Some("pw".to_string()))]
        );
        assert!(session.secret_cleared());
    }

    #[tokio::test]
    async fn test_execute_requires_confirmed_session() {
        let dir = temp_dir();
        let gateway = FakeGateway::new();
        let orch = orchestrator(&gateway, dir.path());

        let mut session = TransferSession::email("d7", None);
        assert!(matches!(
            orch.execute(&mut session).await,
            Err(TransferError::InvalidTransition { .. })
        ));
        assert_eq!(gateway.call_count(), 0);
    }
}
