//! HTTP implementation of the document gateway
//!
//! Talks to the SecureDoc REST API with `reqwest`. Every request carries the
//! session's bearer token. Non-2xx responses are turned into
//! [`GatewayError::Remote`] with the `message` field of the body when it can
//! be parsed.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use super::types::{ErrorBody, ListResponse, PasswordBody, SummaryResponse, UploadResponse};
use super::{ActivityPage, ActivityQuery, DocumentGateway, DocumentRef, GatewayError, UploadFile};
use crate::config::GatewayConfig;
use crate::secret::Secret;

/// Gateway backed by the SecureDoc REST API
///
/// # Examples
///
/// ```
/// use securedoc::config::GatewayConfig;
/// use securedoc::gateway::HttpGateway;
///
/// let config = GatewayConfig::default();
/// let gateway = HttpGateway::new(&config, Some("token".to_string()));
/// assert!(gateway.is_ok());
/// ```
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

impl HttpGateway {
    /// Create a gateway for the configured service
    ///
    /// # Arguments
    ///
    /// * `config` - Service location and timeout
    /// * `token` - Bearer credential; `None` makes every call fail with
    ///   [`GatewayError::MissingCredentials`]
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or the HTTP client cannot be
    /// built
    pub fn new(config: &GatewayConfig, token: Option<String>) -> Result<Self, GatewayError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| GatewayError::Transport(format!("invalid base url: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::Transport(format!(
                "invalid base url: {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("securedoc/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to create HTTP client: {}", e)))?;

        tracing::debug!("Initialized HTTP gateway: base_url={}", base_url);

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Transport("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, GatewayError> {
        let token = self
            .token
            .as_deref()
            .ok_or(GatewayError::MissingCredentials)?;
        Ok(request.bearer_auth(token))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, GatewayError> {
        let response = self
            .authorized(request)?
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Document service request failed: {}", e);
                GatewayError::Transport(e.to_string())
            })?;
        check_status(response).await
    }
}

async fn check_status(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message);
    tracing::warn!(
        "Document service returned {} ({})",
        status,
        message.as_deref().unwrap_or("no message")
    );
    Err(GatewayError::Remote {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned + Default>(response: Response) -> Result<T, GatewayError> {
    let body = response
        .bytes()
        .await
        .map_err(|e| GatewayError::Transport(e.to_string()))?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(&body).map_err(|e| {
        tracing::error!("Failed to decode document service response: {}", e);
        GatewayError::Decode(e.to_string())
    })
}

#[async_trait]
impl DocumentGateway for HttpGateway {
    async fn list_documents(&self, query: Option<&str>) -> Result<Vec<DocumentRef>, GatewayError> {
        let url = self.endpoint(&["api", "pdf", "list"])?;
        let mut request = self.client.get(url);
        if let Some(q) = query {
            request = request.query(&[("q", q)]);
        }

        let response = self.send(request).await?;
        let list: ListResponse = decode(response).await?;
        tracing::debug!("Fetched {} documents", list.documents.len());
        Ok(list.documents)
    }

    async fn get_summary(&self, document_id: &str) -> Result<Option<String>, GatewayError> {
        let url = self.endpoint(&["api", "pdf", document_id, "summary"])?;
        let response = self.send(self.client.get(url)).await?;
        let summary: SummaryResponse = decode(response).await?;
        Ok(summary.summary.filter(|s| !s.trim().is_empty()))
    }

    async fn send_email(
        &self,
        document_id: &str,
        secret: Option<&Secret>,
    ) -> Result<(), GatewayError> {
        let url = self.endpoint(&["api", "pdf", document_id, "email"])?;
        let body = PasswordBody {
            password: secret.map(Secret::expose),
        };
        self.send(self.client.post(url).json(&body)).await?;
        tracing::info!("Email requested for document {}", document_id);
        Ok(())
    }

    async fn upload(
        &self,
        file: &UploadFile,
        secret: &Secret,
    ) -> Result<Vec<DocumentRef>, GatewayError> {
        let url = self.endpoint(&["api", "pdf", "upload"])?;
        let part = reqwest::multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("pdf", part)
            .text("uploadPassword", secret.expose().to_string());

        let response = self.send(self.client.post(url).multipart(form)).await?;
        let uploaded: UploadResponse = decode(response).await?;
        let documents: Vec<DocumentRef> = uploaded
            .results
            .into_iter()
            .filter_map(|r| r.doc)
            .collect();
        tracing::info!(
            "Uploaded {} ({} bytes), {} document(s) created",
            file.file_name,
            file.bytes.len(),
            documents.len()
        );
        Ok(documents)
    }

    async fn download(&self, document_id: &str, secret: &Secret) -> Result<Bytes, GatewayError> {
        let url = self.endpoint(&["api", "files", "download", document_id])?;
        let body = PasswordBody {
            password: Some(secret.expose()),
        };
        let response = self.send(self.client.post(url).json(&body)).await?;
        let payload = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        tracing::info!(
            "Downloaded document {} ({} bytes)",
            document_id,
            payload.len()
        );
        Ok(payload)
    }

    async fn list_activity(&self, query: &ActivityQuery) -> Result<ActivityPage, GatewayError> {
        let url = self.endpoint(&["api", "logs"])?;
        let request = self.client.get(url).query(&query.to_pairs());
        let response = self.send(request).await?;
        decode(response).await
    }
}
