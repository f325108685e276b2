//! Activity log: paged fetch, table rendering and CSV export

use std::path::Path;

use chrono::Local;
use prettytable::{format, row, Table};

use crate::error::{Result, SecureDocError};
use crate::gateway::{ActivityRecord, DocumentGateway};
use crate::gateway::{ActivityPage, ActivityQuery};

/// Columns of the CSV export, in order
pub const CSV_HEADER: [&str; 5] = ["date", "action", "fileName", "details", "userEmail"];

/// Actions the service records
pub const KNOWN_ACTIONS: [&str; 4] = ["upload", "download", "public-download", "email"];

/// Fetch one page of activity
///
/// # Errors
///
/// Returns error if the gateway call fails
pub async fn fetch_page(gateway: &dyn DocumentGateway, query: &ActivityQuery) -> Result<ActivityPage> {
    if let Some(action) = query.action.as_deref() {
        if !KNOWN_ACTIONS.contains(&action) {
            tracing::warn!("Unknown activity action filter: {}", action);
        }
    }
    let page = gateway.list_activity(query).await?;
    tracing::debug!(
        "Fetched activity page {}/{} ({} records)",
        page.meta.page,
        page.meta.pages,
        page.logs.len()
    );
    Ok(page)
}

fn local_time(record: &ActivityRecord) -> String {
    record
        .created_at
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Table with one row per record
pub fn activity_table(records: &[ActivityRecord]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.set_titles(row!["Date", "Action", "File", "Details", "User"]);
    for record in records {
        table.add_row(row![
            local_time(record),
            record.action,
            record.file_name.as_deref().unwrap_or("-"),
            record.details.as_deref().unwrap_or("-"),
            record.user_email.as_deref().unwrap_or("-")
        ]);
    }
    table
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Render records as CSV
///
/// Every field is quoted and embedded quotes are doubled. Records render in
/// the given order after a header line.
pub fn to_csv(records: &[ActivityRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADER.join(","));
    for record in records {
        let fields = [
            local_time(record),
            record.action.clone(),
            record.file_name.clone().unwrap_or_default(),
            record.details.clone().unwrap_or_default(),
            record.user_email.clone().unwrap_or_default(),
        ];
        lines.push(
            fields
                .iter()
                .map(|f| csv_field(f.as_str()))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

/// Default export file name, `securedoc-logs-<YYYY-MM-DD>.csv`
pub fn default_export_name() -> String {
    format!("securedoc-logs-{}.csv", Local::now().format("%Y-%m-%d"))
}

/// Write records to `path` as CSV
///
/// # Errors
///
/// Returns error if there is nothing to export or the file cannot be written
pub fn export_csv(records: &[ActivityRecord], path: &Path) -> Result<()> {
    if records.is_empty() {
        return Err(SecureDocError::Export("no activity records to export".to_string()).into());
    }
    std::fs::write(path, to_csv(records))
        .map_err(|e| SecureDocError::Export(format!("{}: {}", path.display(), e)))?;
    tracing::info!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::PageMeta;
    use crate::test_utils::{FakeCall, FakeGateway};

    fn record(action: &str, file: Option<&str>, details: Option<&str>) -> ActivityRecord {
        ActivityRecord {
            id: "r1".to_string(),
            action: action.to_string(),
            file_name: file.map(str::to_string),
            details: details.map(str::to_string),
            user_email: Some("ada@example.com".to_string()),
            created_at: None,
        }
    }

    #[test]
    fn test_csv_quotes_and_escapes() {
        let csv = to_csv(&[
            record("upload", Some("a.pdf"), Some("said \"hi\", twice")),
            record("email", None, None),
        ]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,action,fileName,details,userEmail");
        assert_eq!(
            lines[1],
            "\"\",\"upload\",\"a.pdf\",\"said \"\"hi\"\", twice\",\"ada@example.com\""
        );
        assert_eq!(lines[2], "\"\",\"email\",\"\",\"\",\"ada@example.com\"");
    }

    #[test]
    fn test_export_refuses_empty_page() {
        let dir = tempfile::tempdir().unwrap();
        assert!(export_csv(&[], &dir.path().join("x.csv")).is_err());
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.csv");
        export_csv(&[record("download", Some("b.pdf"), None)], &path).unwrap();
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.starts_with("date,action"));
        assert!(written.contains("\"b.pdf\""));
    }

    #[test]
    fn test_default_export_name() {
        let name = default_export_name();
        assert!(name.starts_with("securedoc-logs-"));
        assert!(name.ends_with(".csv"));
    }

    #[tokio::test]
    async fn test_fetch_page_passes_query() {
        let page = ActivityPage {
            logs: vec![record("upload", Some("a.pdf"), None)],
            meta: PageMeta {
                page: 2,
                pages: 3,
                total: 41,
            },
        };
        let gateway = FakeGateway::new().with_activity(page.clone());
        let query = ActivityQuery {
            page: 2,
            action: Some("upload".to_string()),
            ..ActivityQuery::default()
        };

        let fetched = fetch_page(&gateway, &query).await.unwrap();
        assert_eq!(fetched, page);
        assert_eq!(gateway.calls(), vec![FakeCall::Activity(query)]);
        assert!(activity_table(&fetched.logs).to_string().contains("a.pdf"));
    }
}
