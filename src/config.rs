//! Configuration management for SecureDoc
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, SecureDocError};
use crate::knowledge::{KnowledgeBase, KnowledgeEntry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for SecureDoc
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Document service location
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Session credential settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Chat surface settings
    #[serde(default)]
    pub chat: ChatConfig,

    /// Download destination
    #[serde(default)]
    pub downloads: DownloadConfig,

    /// Ordered question/answer pairs answered locally in chat
    ///
    /// When omitted the built-in knowledge base is used.
    #[serde(default)]
    pub knowledge_base: Option<Vec<KnowledgeEntry>>,
}

/// Document service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the SecureDoc API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Session credential configuration
///
/// The bearer token is normally kept in the OS keyring (see
/// [`crate::session`]); `token` exists for CI and scripted use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Explicit bearer token, overrides the keyring
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Keyring service name
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// Keyring user name
    #[serde(default = "default_keyring_user")]
    pub keyring_user: String,
}

fn default_keyring_service() -> String {
    "securedoc".to_string()
}

fn default_keyring_user() -> String {
    "session".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token: None,
            keyring_service: default_keyring_service(),
            keyring_user: default_keyring_user(),
        }
    }
}

/// Chat surface configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Account email shown in the welcome message
    #[serde(default)]
    pub user_email: Option<String>,

    /// Prefix rendered messages with their local time
    #[serde(default)]
    pub show_timestamps: bool,
}

/// Download configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory downloaded documents are saved into
    #[serde(default = "default_download_dir")]
    pub directory: PathBuf,
}

fn default_download_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("downloads"))
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            directory: default_download_dir(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            session: SessionConfig::default(),
            chat: ChatConfig::default(),
            downloads: DownloadConfig::default(),
            knowledge_base: None,
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SecureDocError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| SecureDocError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("SECUREDOC_BASE_URL") {
            self.gateway.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("SECUREDOC_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.gateway.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid SECUREDOC_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(token) = std::env::var("SECUREDOC_TOKEN") {
            if !token.trim().is_empty() {
                tracing::debug!("Env override: SECUREDOC_TOKEN");
                self.session.token = Some(token);
            }
        }

        if let Ok(dir) = std::env::var("SECUREDOC_DOWNLOAD_DIR") {
            tracing::debug!(dir = %dir, "Env override: SECUREDOC_DOWNLOAD_DIR");
            self.downloads.directory = PathBuf::from(dir);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(base_url) = &cli.base_url {
            self.gateway.base_url = base_url.clone();
        }
    }

    /// The knowledge base chat answers from
    pub fn knowledge_base(&self) -> KnowledgeBase {
        match &self.knowledge_base {
            Some(entries) => KnowledgeBase::new(entries.clone()),
            None => KnowledgeBase::builtin(),
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.gateway.base_url).map_err(|e| {
            SecureDocError::Config(format!(
                "Invalid gateway.base_url '{}': {}",
                self.gateway.base_url, e
            ))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(SecureDocError::Config(format!(
                "gateway.base_url must use http or https, got {}",
                url.scheme()
            ))
            .into());
        }

        if self.gateway.timeout_seconds == 0 {
            return Err(SecureDocError::Config(
                "gateway.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.session.keyring_service.trim().is_empty() {
            return Err(SecureDocError::Config(
                "session.keyring_service cannot be empty".to_string(),
            )
            .into());
        }

        if let Some(entries) = &self.knowledge_base {
            for (index, entry) in entries.iter().enumerate() {
                if entry.question.trim().is_empty() {
                    return Err(SecureDocError::Config(format!(
                        "knowledge_base[{}].question cannot be empty",
                        index
                    ))
                    .into());
                }
                if entry.answer.trim().is_empty() {
                    return Err(SecureDocError::Config(format!(
                        "knowledge_base[{}].answer cannot be empty",
                        index
                    ))
                    .into());
                }
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
