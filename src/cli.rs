//! Command-line interface definition for SecureDoc
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chat, document management, activity logs and
//! session credentials.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SecureDoc - encrypted document client
///
/// Manage encrypted documents through a conversational assistant or direct
/// document commands.
#[derive(Parser, Debug, Clone)]
#[command(name = "securedoc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Override the document service base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for SecureDoc
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the interactive chat assistant
    Chat,

    /// List your documents
    Docs {
        /// Only show documents whose file name contains this text
        #[arg(short, long)]
        query: Option<String>,

        /// Output as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Upload files secured with a password
    Upload {
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Download a document
    Download {
        /// Document id
        id: String,

        /// Directory to save into (defaults to the configured download directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the AI summary of a document
    Summary {
        /// Document id
        id: String,
    },

    /// Email a document to your account address
    Email {
        /// Document id
        id: String,
    },

    /// Show activity logs
    Logs {
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Records per page
        #[arg(long, default_value_t = 20)]
        limit: u32,

        /// Search file name, action or details
        #[arg(short, long)]
        query: Option<String>,

        /// Only this action (upload, download, public-download, email)
        #[arg(short, long)]
        action: Option<String>,

        /// From date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// To date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Export the page as CSV; without a path, writes securedoc-logs-<date>.csv
        #[arg(long, num_args = 0..=1, value_name = "FILE")]
        csv: Option<Option<PathBuf>>,
    },

    /// Store a session token in the system keyring
    Login {
        /// Bearer token issued by the service
        #[arg(long)]
        token: String,
    },

    /// Remove the stored session token
    Logout,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: "config/config.yaml".to_string(),
            verbose: false,
            json_logs: false,
            base_url: None,
            command: Commands::Chat,
        }
    }
}
