//! Wire types exchanged with the SecureDoc service
//!
//! Every optional field tolerates absence (and malformed timestamps) so that a
//! partially populated response degrades to defaults instead of failing.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use super::GatewayError;

/// Metadata of a stored document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Service-assigned document id
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    /// Original file name
    #[serde(rename = "fileName", default)]
    pub file_name: String,

    /// Whether the stored payload is encrypted with a user secret
    #[serde(default)]
    pub encrypted: bool,

    /// Storage locator (object URL or server path)
    #[serde(default)]
    pub path: String,

    /// Size in bytes, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Upload time, when reported
    #[serde(
        rename = "createdAt",
        alias = "uploadedAt",
        default,
        deserialize_with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub uploaded_at: Option<DateTime<Utc>>,

    /// Server-side AI summary, present on upload results when computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl DocumentRef {
    /// Minimal document reference, mostly useful for tests and fixtures
    pub fn new(id: impl Into<String>, file_name: impl Into<String>, encrypted: bool) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            encrypted,
            path: String::new(),
            size: None,
            uploaded_at: None,
            summary: None,
        }
    }

    /// Set the storage locator
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Name to display, falling back to the id when the service sent none
    pub fn display_name(&self) -> &str {
        if self.file_name.is_empty() {
            &self.id
        } else {
            &self.file_name
        }
    }
}

fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }))
}

/// `GET /api/pdf/list` response
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListResponse {
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
}

/// `GET /api/pdf/{id}/summary` response
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SummaryResponse {
    #[serde(default)]
    pub summary: Option<String>,
}

/// `POST /api/pdf/upload` response
#[derive(Debug, Default, Deserialize)]
pub(crate) struct UploadResponse {
    #[serde(default)]
    pub results: Vec<UploadResult>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UploadResult {
    #[serde(default)]
    pub doc: Option<DocumentRef>,
}

/// Failure body returned with non-2xx statuses
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Body for the password-carrying POST endpoints
#[derive(Debug, Serialize)]
pub(crate) struct PasswordBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
}

/// A file selected for upload, read into memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// File name sent to the service
    pub file_name: String,
    /// MIME type
    pub content_type: String,
    /// Contents
    pub bytes: Bytes,
}

impl UploadFile {
    /// Build an upload file from in-memory contents
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Io`] if the file cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self, GatewayError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| GatewayError::Io(format!("{}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

fn guess_content_type(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Filters for one page of activity records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityQuery {
    /// 1-based page number
    pub page: u32,
    /// Records per page
    pub limit: u32,
    /// Free-text filter (file name, action, details)
    pub text: Option<String>,
    /// Action filter (upload, download, public-download, email)
    pub action: Option<String>,
    /// Inclusive start date (YYYY-MM-DD)
    pub from: Option<String>,
    /// Inclusive end date (YYYY-MM-DD)
    pub to: Option<String>,
}

impl Default for ActivityQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            text: None,
            action: None,
            from: None,
            to: None,
        }
    }
}

impl ActivityQuery {
    /// Query-string pairs; empty filters are omitted
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        let optional = [
            ("q", &self.text),
            ("action", &self.action),
            ("from", &self.from),
            ("to", &self.to),
        ];
        for (key, value) in optional {
            if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                pairs.push((key, v.to_string()));
            }
        }
        pairs
    }
}

/// One activity record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Record id
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    /// Action name
    #[serde(default)]
    pub action: String,
    /// File the action concerned
    #[serde(rename = "fileName", default)]
    pub file_name: Option<String>,
    /// Free-form details
    #[serde(default, alias = "extra")]
    pub details: Option<String>,
    /// Acting user
    #[serde(rename = "userEmail", default)]
    pub user_email: Option<String>,
    /// When it happened
    #[serde(
        rename = "createdAt",
        default,
        deserialize_with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// Paging metadata of an activity page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page
    #[serde(default = "one")]
    pub page: u32,
    /// Total pages
    #[serde(default = "one")]
    pub pages: u32,
    /// Total records
    #[serde(default)]
    pub total: u64,
}

fn one() -> u32 {
    1
}

impl Default for PageMeta {
    fn default() -> Self {
        Self {
            page: 1,
            pages: 1,
            total: 0,
        }
    }
}

/// One page of activity records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPage {
    /// Records on this page
    #[serde(default)]
    pub logs: Vec<ActivityRecord>,
    /// Paging metadata
    #[serde(default)]
    pub meta: PageMeta,
}
