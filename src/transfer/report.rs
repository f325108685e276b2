//! Surfacing transfer outcomes in the conversation log

use super::{TransferOutcome, UploadReport};
use crate::conversation::{ConversationLog, Message};

/// Append the messages describing `outcome` to `log`
pub fn report_outcome(log: &ConversationLog, outcome: &TransferOutcome) {
    match outcome {
        TransferOutcome::Uploaded(report) => report_upload(log, report),
        TransferOutcome::Downloaded { document, path } => {
            log.append(Message::bot(format!(
                "Downloaded \"{}\" to {}",
                document.display_name(),
                path.display()
            )));
        }
        TransferOutcome::Emailed { document_id } => {
            log.append(Message::bot(format!(
                "Document {} has been sent to your email address.",
                document_id
            )));
        }
        TransferOutcome::Located { document, locator } if locator.is_empty() => {
            log.append(Message::error(format!(
                "\"{}\" is not encrypted but has no storage location",
                document.display_name()
            )));
        }
        TransferOutcome::Located { document, locator } => {
            log.append(Message::bot(format!(
                "\"{}\" is not encrypted. Open it at:\n{}",
                document.display_name(),
                locator
            )));
        }
        TransferOutcome::Cancelled => {
            log.append(Message::bot("No files selected, nothing was uploaded."));
        }
        TransferOutcome::Failed { message } => {
            log.append(Message::error(message.clone()));
        }
    }
}

fn report_upload(log: &ConversationLog, report: &UploadReport) {
    for entry in &report.entries {
        let documents = match &entry.result {
            Ok(documents) => documents,
            Err(message) => {
                log.append(Message::error(format!("Upload failed: {}", message)));
                continue;
            }
        };

        let confirmation = match documents.first() {
            Some(doc) => format!(
                "Uploaded \"{}\" successfully (ID: {})",
                entry.file_name, doc.id
            ),
            None => format!("Uploaded \"{}\" successfully", entry.file_name),
        };
        log.append(Message::bot(confirmation));

        let Some(doc) = documents.first() else {
            continue;
        };
        match doc.summary.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(summary) => {
                let name = if doc.file_name.is_empty() {
                    &entry.file_name
                } else {
                    &doc.file_name
                };
                log.append(Message::summary(
                    format!("AI summary for \"{}\"", name),
                    doc.id.clone(),
                    summary,
                ));
            }
            None => {
                log.append(Message::bot(format!(
                    "You can generate a summary anytime by typing:\n\"summarize {}\"",
                    doc.id
                )));
            }
        }
    }
}
