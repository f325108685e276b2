//! Special commands parser for interactive chat mode
//!
//! Slash commands are the chat's direct actions. Unlike free text, which goes
//! through the command dispatcher, they drive the secure transfer flow:
//! - Upload local files secured with a password
//! - Download a document (asking for its password or OTP when encrypted)
//! - Email a document using its upload password
//! - Show the document table, pending operations, help, or exit
//!
//! Commands are prefixed with `/` and the command word is case-insensitive.
//! Arguments keep their case.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Upload local files, all secured with one password
    Upload(Vec<PathBuf>),

    /// Download a document by id
    Download(String),

    /// Email a document by id, decrypted with its upload password
    Email(String),

    /// Show the document table, optionally filtered by file name
    Docs(Option<String>),

    /// Show how many operations are still in flight
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; the text goes to the dispatcher
    None,
}

fn missing(command: &str, usage: &str) -> CommandError {
    CommandError::MissingArgument {
        command: command.to_string(),
        usage: usage.to_string(),
    }
}

fn single_id(command: &str, usage: &str, rest: &[&str]) -> Result<String, CommandError> {
    match rest {
        [] => Err(missing(command, usage)),
        [id] => Ok((*id).to_string()),
        [_, extra, ..] => Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: (*extra).to_string(),
        }),
    }
}

/// Parse a user input string into a special command
///
/// Returns `SpecialCommand::None` for text that is not a command (anything
/// not starting with `/`, except the bare words `exit` and `quit`).
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for an unknown `/command`,
/// `CommandError::MissingArgument` when a required argument is absent and
/// `CommandError::UnsupportedArgument` for extra arguments.
///
/// # Examples
///
/// ```
/// use securedoc::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(
///     parse_special_command("/download 64f1").unwrap(),
///     SpecialCommand::Download("64f1".to_string())
/// );
/// assert_eq!(parse_special_command("list").unwrap(), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let mut tokens = trimmed.split_whitespace();
    let command = tokens
        .next()
        .map(str::to_lowercase)
        .unwrap_or_default();
    let rest: Vec<&str> = tokens.collect();

    match command.as_str() {
        "/upload" => {
            if rest.is_empty() {
                Err(missing("/upload", "/upload <file> [file...]"))
            } else {
                Ok(SpecialCommand::Upload(
                    rest.iter().map(PathBuf::from).collect(),
                ))
            }
        }
        "/download" | "/get" => {
            single_id("/download", "/download <documentId>", &rest).map(SpecialCommand::Download)
        }
        "/email" => single_id("/email", "/email <documentId>", &rest).map(SpecialCommand::Email),
        "/docs" | "/documents" => {
            if rest.is_empty() {
                Ok(SpecialCommand::Docs(None))
            } else {
                Ok(SpecialCommand::Docs(Some(rest.join(" "))))
            }
        }
        "/status" if rest.is_empty() => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" if rest.is_empty() => Ok(SpecialCommand::Help),
        "/status" | "/help" | "/?" => Err(CommandError::UnsupportedArgument {
            command: command.clone(),
            arg: rest.join(" "),
        }),
        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Display help text for the chat session
///
/// # Examples
///
/// ```
/// use securedoc::commands::special_commands::print_help;
///
/// print_help();
/// ```
pub fn print_help() {
    println!(
        r#"
SecureDoc Chat
==============

COMMANDS (plain text):
  list                    - Show your documents
  find <term>             - Search your documents by name
  summarize <documentId>  - Show the AI summary of a document
  email <documentId>      - Email a document to your account address

SECURE ACTIONS:
  /upload <file> [file...] - Upload files secured with a password
  /download <documentId>   - Download a document (asks for its password or OTP)
  /email <documentId>      - Email a document using its upload password
  /docs [term]             - Show the document table, optionally filtered

SESSION:
  /status         - Show operations still in flight
  /help           - Show this help message
  /?              - Same as /help
  exit            - Exit interactive mode
  quit            - Same as exit

NOTES:
  - Questions such as "how do i upload a file" are answered directly
  - Several commands may be in flight at once; each result replaces its own
    loading line
  - Leave the password prompt empty and press Ctrl-C to cancel a transfer
"#
    );
}
