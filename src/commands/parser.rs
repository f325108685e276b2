//! Conversational command parser
//!
//! Turns free chat text into one of the document commands the assistant
//! understands. Only the leading verb is case-insensitive; arguments are kept
//! exactly as typed.
//!
//! Parsing never fails. Whether an argument is present is a dispatch-time
//! concern: `find` with no term still parses to [`Command::Find`] with an empty
//! term, and `summarize`/`email` without an id parse with `None`. The
//! dispatcher turns those into clarification prompts.

use std::fmt;

/// A parsed conversational command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `list` - list every document (trailing words are ignored)
    List,

    /// `find <term>` - search documents by term
    ///
    /// The term is everything after the verb, trimmed. It may be empty.
    Find(String),

    /// `summarize <documentId>` - fetch the server-side summary
    Summarize(Option<String>),

    /// `email <documentId>` - email the document to the account address
    Email(Option<String>),

    /// Anything else
    Unrecognized,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Find(term) => write!(f, "find {}", term),
            Self::Summarize(Some(id)) => write!(f, "summarize {}", id),
            Self::Summarize(None) => write!(f, "summarize"),
            Self::Email(Some(id)) => write!(f, "email {}", id),
            Self::Email(None) => write!(f, "email"),
            Self::Unrecognized => write!(f, "<unrecognized>"),
        }
    }
}

/// Parse chat text into a [`Command`]
///
/// # Examples
///
/// ```
/// use securedoc::commands::parser::{parse_command, Command};
///
/// assert_eq!(parse_command("LIST anything"), Command::List);
/// assert_eq!(parse_command("summarize"), Command::Summarize(None));
/// assert_eq!(parse_command("find   "), Command::Find(String::new()));
/// assert_eq!(parse_command("find findable files"), Command::Find("findable files".to_string()));
/// assert_eq!(parse_command("hello"), Command::Unrecognized);
/// ```
pub fn parse_command(text: &str) -> Command {
    let trimmed = text.trim_start();
    let mut tokens = trimmed.split_whitespace();

    let Some(first) = tokens.next() else {
        return Command::Unrecognized;
    };

    match first.to_lowercase().as_str() {
        "list" => Command::List,
        "find" => {
            // Drop exactly the leading verb token; the rest is the term.
            let rest = &trimmed[first.len()..];
            Command::Find(rest.trim().to_string())
        }
        "summarize" => Command::Summarize(tokens.next().map(str::to_string)),
        "email" => Command::Email(tokens.next().map(str::to_string)),
        _ => Command::Unrecognized,
    }
}
