//! Error types for SecureDoc
//!
//! This module defines the crate-level error type used by the application
//! layer, using `thiserror` for ergonomic error handling. The core components
//! (gateway, transfer orchestrator) carry their own typed errors which convert
//! into [`SecureDocError`] at the edges.

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::transfer::TransferError;

/// Main error type for SecureDoc operations
///
/// Encompasses configuration loading, gateway calls, transfer sessions,
/// credential storage and local I/O.
#[derive(Error, Debug)]
pub enum SecureDocError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote document service errors
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Secure transfer session errors
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// Session credential errors (missing or unreadable bearer token)
    #[error("Session error: {0}")]
    Session(String),

    /// CSV export errors
    #[error("Export error: {0}")]
    Export(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type alias for SecureDoc application operations
///
/// Uses `anyhow::Error` so callers can attach context while propagating.
pub type Result<T> = anyhow::Result<T>;
