//! Knowledge base matching for canned answers
//!
//! The chat surface answers common "how do I" questions locally before any
//! command parsing happens. Entries are matched in declared order; the first
//! entry whose question appears inside the user's text wins.

use serde::{Deserialize, Serialize};

/// A single question/answer pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Question phrase looked for inside user text (matched case-insensitively)
    pub question: String,
    /// Answer returned when the question matches
    pub answer: String,
}

impl KnowledgeEntry {
    /// Create a new entry
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Ordered collection of knowledge entries
///
/// Order is significant: it is the tie-break when several questions match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    /// Build a knowledge base from entries, preserving their order
    pub fn new(entries: Vec<KnowledgeEntry>) -> Self {
        Self { entries }
    }

    /// Entries in declared order
    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the base has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the canned answer for a query
    ///
    /// See [`match_answer`].
    pub fn answer(&self, query: &str) -> Option<&str> {
        match_answer(query, &self.entries)
    }

    /// The knowledge base shipped with the client
    ///
    /// Used when the configuration does not declare its own `knowledge_base`.
    pub fn builtin() -> Self {
        let entries = [
            (
                "how do i upload a file",
                "Use /upload <files...> in chat or `securedoc upload <files...>`. You will be asked for a password that secures the upload; the file is stored encrypted.",
            ),
            (
                "how to retrieve a file",
                "Use /download <documentId> in chat or `securedoc download <documentId>`. Encrypted documents ask for the password or OTP before downloading.",
            ),
            (
                "what file types are supported",
                "PDFs and images (jpg, png). The service decides which other document types it accepts.",
            ),
            (
                "how is the file secured",
                "Files are encrypted with the password you supply at upload time. The same password or an OTP is required to decrypt when retrieving.",
            ),
            (
                "can i upload multiple files",
                "Yes. /upload accepts several files at once and secures all of them with the same password.",
            ),
            (
                "what is securedoc",
                "SecureDoc stores documents securely and provides a chat assistant for listing, searching and summarizing them.",
            ),
            (
                "how to search docs",
                "Type \"find <term>\" to search your documents, or \"list\" to see all of them.",
            ),
            (
                "how to summarize",
                "Type \"summarize <documentId>\" to get the AI summary of an uploaded document.",
            ),
            (
                "what is otp flow",
                "When sensitive actions occur, the service sends a time-limited OTP to your registered email. Enter it when asked to proceed.",
            ),
            (
                "how to logout",
                "Run `securedoc logout` to remove the stored session token.",
            ),
        ];

        Self::new(
            entries
                .into_iter()
                .map(|(q, a)| KnowledgeEntry::new(q, a))
                .collect(),
        )
    }
}

/// Match free text against an ordered list of entries
///
/// The query is lower-cased and trimmed; an entry matches when its lower-cased
/// question is a substring of the normalized query. The first matching entry in
/// declared order wins. Empty queries and empty questions never match.
///
/// # Examples
///
/// ```
/// use securedoc::knowledge::{match_answer, KnowledgeEntry};
///
/// let base = vec![
///     KnowledgeEntry::new("upload", "first"),
///     KnowledgeEntry::new("how do i upload", "second"),
/// ];
/// assert_eq!(match_answer("How do I UPLOAD a file?", &base), Some("first"));
/// assert_eq!(match_answer("   ", &base), None);
/// ```
pub fn match_answer<'a>(query: &str, base: &'a [KnowledgeEntry]) -> Option<&'a str> {
    let normalized = query.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    base.iter()
        .find(|entry| {
            let question = entry.question.to_lowercase();
            !question.is_empty() && normalized.contains(&question)
        })
        .map(|entry| entry.answer.as_str())
}
