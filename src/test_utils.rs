//! Test utilities for SecureDoc
//!
//! This module provides a scripted in-memory [`FakeGateway`], temporary
//! directory helpers and assertion helpers shared by the unit tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::TempDir;

use crate::config::Config;
use crate::conversation::{ConversationLog, Message, MessageKind};
use crate::gateway::{
    ActivityPage, ActivityQuery, DocumentGateway, DocumentRef, GatewayError, UploadFile,
};
use crate::secret::Secret;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content and return its path
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Create a test configuration pointing at an unreachable local service
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.gateway.base_url = "http://127.0.0.1:9".to_string();
    config.session.token = Some("test-token".to_string());
    config
}

/// Create a test configuration YAML string
pub fn test_config_yaml() -> String {
    r#"
gateway:
  base_url: http://localhost:5000
  timeout_seconds: 10
session:
  keyring_service: securedoc-test
chat:
  user_email: tester@example.com
  show_timestamps: false
downloads:
  directory: /tmp/securedoc-downloads
knowledge_base:
  - question: how do i upload a file
    answer: Use /upload.
  - question: upload
    answer: Uploads are encrypted.
"#
    .to_string()
}

/// Snapshot of the log as `(kind label, text)` pairs, for compact assertions
pub fn log_lines(log: &ConversationLog) -> Vec<(&'static str, String)> {
    log.snapshot()
        .into_iter()
        .map(|m| (m.kind.label(), m.text))
        .collect()
}

/// Last message of the log
///
/// # Panics
///
/// Panics if the log is empty
pub fn last_message(log: &ConversationLog) -> Message {
    log.snapshot().pop().expect("log is empty")
}

/// Assert that a message is an error whose text contains `expected`
pub fn assert_error_message(message: &Message, expected: &str) {
    assert_eq!(message.kind, MessageKind::Error, "not an error: {:?}", message);
    assert!(
        message.text.contains(expected),
        "Error text '{}' does not contain '{}'",
        message.text,
        expected
    );
}

/// One recorded gateway call
///
/// Secrets are recorded in clear so tests can check which secret reached
/// which call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    List(Option<String>),
    Summary(String),
    Email(String, Option<String>),
    Upload(String, String),
    Download(String, String),
    Activity(ActivityQuery),
}

#[derive(Debug)]
struct FakeState {
    list: Result<Vec<DocumentRef>, GatewayError>,
    summary: Result<Option<String>, GatewayError>,
    email: Result<(), GatewayError>,
    uploads: HashMap<String, Result<Vec<DocumentRef>, GatewayError>>,
    download: Result<Bytes, GatewayError>,
    activity: Result<ActivityPage, GatewayError>,
    calls: Vec<FakeCall>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            list: Ok(Vec::new()),
            summary: Ok(None),
            email: Ok(()),
            uploads: HashMap::new(),
            download: Ok(Bytes::new()),
            activity: Ok(ActivityPage::default()),
            calls: Vec::new(),
        }
    }
}

/// Scripted in-memory gateway
///
/// Every operation answers immediately with its configured reply and records
/// the call. Uploads without a scripted reply succeed with one encrypted
/// document named after the file, with id `id-<file name>`.
#[derive(Debug, Clone, Default)]
pub struct FakeGateway {
    state: Arc<Mutex<FakeState>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(self, f: impl FnOnce(&mut FakeState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn with_documents(self, documents: Vec<DocumentRef>) -> Self {
        self.update(|s| s.list = Ok(documents))
    }

    pub fn with_list_error(self, error: GatewayError) -> Self {
        self.update(|s| s.list = Err(error))
    }

    pub fn with_summary(self, summary: Option<&str>) -> Self {
        let summary = summary.map(str::to_string);
        self.update(|s| s.summary = Ok(summary))
    }

    pub fn with_summary_error(self, error: GatewayError) -> Self {
        self.update(|s| s.summary = Err(error))
    }

    pub fn with_email_error(self, error: GatewayError) -> Self {
        self.update(|s| s.email = Err(error))
    }

    pub fn with_upload(
        self,
        file_name: &str,
        reply: Result<Vec<DocumentRef>, GatewayError>,
    ) -> Self {
        let file_name = file_name.to_string();
        self.update(|s| {
            s.uploads.insert(file_name, reply);
        })
    }

    pub fn with_download(self, payload: &'static [u8]) -> Self {
        self.update(|s| s.download = Ok(Bytes::from_static(payload)))
    }

    pub fn with_download_error(self, error: GatewayError) -> Self {
        self.update(|s| s.download = Err(error))
    }

    pub fn with_activity(self, page: ActivityPage) -> Self {
        self.update(|s| s.activity = Ok(page))
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<FakeCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of calls received so far
    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    fn record(&self, call: FakeCall) -> std::sync::MutexGuard<'_, FakeState> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state
    }
}

#[async_trait]
impl DocumentGateway for FakeGateway {
    async fn list_documents(&self, query: Option<&str>) -> Result<Vec<DocumentRef>, GatewayError> {
        let state = self.record(FakeCall::List(query.map(str::to_string)));
        state.list.clone()
    }

    async fn get_summary(&self, document_id: &str) -> Result<Option<String>, GatewayError> {
        let state = self.record(FakeCall::Summary(document_id.to_string()));
        state.summary.clone()
    }

    async fn send_email(
        &self,
        document_id: &str,
        secret: Option<&Secret>,
    ) -> Result<(), GatewayError> {
        let state = self.record(FakeCall::Email(
            document_id.to_string(),
            secret.map(|s| s.expose().to_string()),
        ));
        state.email.clone()
    }

    async fn upload(
        &self,
        file: &UploadFile,
        secret: &Secret,
    ) -> Result<Vec<DocumentRef>, GatewayError> {
        let state = self.record(FakeCall::Upload(
            file.file_name.clone(),
            secret.expose().to_string(),
        ));
        match state.uploads.get(&file.file_name) {
            Some(reply) => reply.clone(),
            None => Ok(vec![DocumentRef::new(
                format!("id-{}", file.file_name),
                file.file_name.clone(),
                true,
            )]),
        }
    }

    async fn download(&self, document_id: &str, secret: &Secret) -> Result<Bytes, GatewayError> {
        let state = self.record(FakeCall::Download(
            document_id.to_string(),
            secret.expose().to_string(),
        ));
        state.download.clone()
    }

    async fn list_activity(&self, query: &ActivityQuery) -> Result<ActivityPage, GatewayError> {
        let state = self.record(FakeCall::Activity(query.clone()));
        state.activity.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
    }

    #[tokio::test]
    async fn test_fake_gateway_records_calls() {
        let gateway = FakeGateway::new().with_summary(Some("short"));
        let summary = gateway.get_summary("doc1").await.unwrap();
        assert_eq!(summary.as_deref(), Some("short"));

        let uploaded = gateway
            .upload(&UploadFile::new("a.pdf", b"x".to_vec()), &Secret::new("pw"))
            .await
            .unwrap();
        assert_eq!(uploaded[0].id, "id-a.pdf");

        assert_eq!(
            gateway.calls(),
            vec![
                FakeCall::Summary("doc1".to_string()),
                FakeCall::Upload("a.pdf".to_string(), "pw".to_string()),
            ]
        );
    }
}
