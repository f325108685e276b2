//! Direct document-list surface
//!
//! Holds the documents from the most recent fetch only; every refresh replaces
//! the previous list. Filtering by file name happens locally on that list.

use std::sync::Arc;

use chrono::Local;
use prettytable::{format, row, Table};

use crate::gateway::{DocumentGateway, DocumentRef, GatewayError};

/// The most recently fetched document list
pub struct DocumentListView {
    gateway: Arc<dyn DocumentGateway>,
    documents: Vec<DocumentRef>,
}

impl DocumentListView {
    /// Create an empty view; call [`refresh`](Self::refresh) to populate it
    pub fn new(gateway: Arc<dyn DocumentGateway>) -> Self {
        Self {
            gateway,
            documents: Vec::new(),
        }
    }

    /// Fetch the list, replacing whatever was held before
    ///
    /// On failure the previous list is kept.
    ///
    /// # Errors
    ///
    /// Returns the gateway failure
    pub async fn refresh(&mut self) -> Result<&[DocumentRef], GatewayError> {
        let documents = self.gateway.list_documents(None).await?;
        tracing::debug!("Document list refreshed ({} documents)", documents.len());
        self.documents = documents;
        Ok(&self.documents)
    }

    /// Documents from the last successful fetch
    pub fn documents(&self) -> &[DocumentRef] {
        &self.documents
    }

    /// Look a document up by id
    pub fn get(&self, id: &str) -> Option<&DocumentRef> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Documents whose file name contains `query`, case-insensitively
    ///
    /// A blank query returns every document.
    pub fn filter(&self, query: &str) -> Vec<&DocumentRef> {
        let query = query.trim().to_lowercase();
        self.documents
            .iter()
            .filter(|d| query.is_empty() || d.file_name.to_lowercase().contains(&query))
            .collect()
    }
}

/// Human readable byte count
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Table with one row per document
pub fn documents_table(documents: &[&DocumentRef]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.set_titles(row!["ID", "File Name", "Encrypted", "Size", "Uploaded"]);

    for doc in documents {
        let size = doc.size.map(format_size).unwrap_or_else(|| "-".to_string());
        let uploaded = doc
            .uploaded_at
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(row![
            doc.id,
            doc.display_name(),
            if doc.encrypted { "yes" } else { "no" },
            size,
            uploaded
        ]);
    }
    table
}

/// Documents as pretty JSON, using the service's field names
///
/// # Errors
///
/// Returns error if serialization fails
pub fn documents_json(documents: &[&DocumentRef]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(documents)
}
