/*!
Command handlers for the CLI

This module provides the command handlers invoked by the CLI entrypoint.

- `chat`      - Interactive chat assistant with secure transfer actions
- `docs`      - Document table / JSON listing
- `transfer`  - One-shot upload, download and email sessions
- `summary`   - Server-side document summary
- `logs`      - Activity log page and CSV export
- `auth`      - Keyring login / logout

The handlers build an `HttpGateway` from the loaded configuration and share
the conversation log rendering and secret prompting helpers defined here.
*/

use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::config::Config;
use crate::conversation::{ConversationLog, LogEvent, Message, MessageKind, Origin};
use crate::error::Result;
use crate::gateway::{DocumentGateway, HttpGateway};
use crate::secret::Secret;
use crate::session;
use crate::transfer::{
    report_outcome, DirectorySaveTarget, TransferError, TransferOrchestrator, TransferOutcome,
    TransferSession,
};

// Free-text command parser
pub mod parser;

// Slash command parser for chat mode
pub mod special_commands;

const SECRET_PROMPT: &str = "Password or OTP (Ctrl-C to cancel): ";

/// Build the HTTP gateway for the configured service and session
///
/// # Errors
///
/// Returns error if the base URL is invalid or the client cannot be built
pub fn build_gateway(config: &Config) -> Result<Arc<dyn DocumentGateway>> {
    let token = session::resolve_token(&config.session);
    if token.is_none() {
        tracing::warn!("No session token found; run `securedoc login --token <TOKEN>`");
    }
    let gateway = HttpGateway::new(&config.gateway, token)?;
    tracing::debug!("Using document service at {}", gateway.base_url());
    Ok(Arc::new(gateway))
}

/// Orchestrator saving downloads into `directory`
pub fn build_orchestrator(
    gateway: Arc<dyn DocumentGateway>,
    directory: &Path,
) -> TransferOrchestrator {
    let target = DirectorySaveTarget::new(directory);
    tracing::debug!("Saving downloads to {}", target.directory().display());
    TransferOrchestrator::new(gateway, Arc::new(target))
}

/// Render one conversation message for the terminal
pub fn render_message(message: &Message, show_timestamps: bool) -> String {
    let body = match &message.kind {
        MessageKind::Plain => message.text.clone(),
        MessageKind::System => message.text.bold().to_string(),
        MessageKind::KnowledgeAnswer => message.text.cyan().to_string(),
        MessageKind::Loading => format!("... {}", message.text).dimmed().to_string(),
        MessageKind::Summary { title, .. } => {
            format!("{}\n{}", title.green().bold(), message.text)
        }
        MessageKind::Error => message.text.red().to_string(),
    };

    if show_timestamps {
        let time = message.created_at.with_timezone(&Local).format("%H:%M:%S");
        format!("[{}] {}", time.to_string().dimmed(), body)
    } else {
        body
    }
}

/// Print every message of `log` in order
pub fn print_log(log: &ConversationLog, show_timestamps: bool) {
    for message in log.snapshot() {
        println!("{}", render_message(&message, show_timestamps));
    }
}

/// Collect a secret for a session in `CollectingSecret`
///
/// `read` is called until it yields a non-blank value. Interrupt or EOF
/// cancels the session. Returns whether the session is now `Confirmed`.
///
/// # Errors
///
/// Returns error if reading fails for another reason or the session is not
/// collecting a secret
pub fn collect_secret<F>(session: &mut TransferSession, mut read: F) -> Result<bool>
where
    F: FnMut() -> std::result::Result<String, ReadlineError>,
{
    loop {
        match read() {
            Ok(value) => match session.submit_secret(Secret::new(value)) {
                Ok(()) => return Ok(true),
                Err(TransferError::EmptySecret) => {
                    println!("{}", TransferError::EmptySecret.to_string().yellow());
                }
                Err(e) => return Err(e.into()),
            },
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                session.cancel()?;
                tracing::info!("Cancelled {}", session.target().describe());
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Start a session, reading its secret with `read` when one is needed
///
/// Unencrypted downloads finish right away; everything else is either
/// `Confirmed` and ready to execute, or cancelled at the prompt.
fn prepare_session<F>(
    orchestrator: &TransferOrchestrator,
    session: &mut TransferSession,
    read: F,
) -> Result<Prepared>
where
    F: FnMut() -> std::result::Result<String, ReadlineError>,
{
    if let Some(outcome) = orchestrator.begin(session)? {
        return Ok(Prepared::Finished(outcome));
    }
    println!("Enter the secret for the {}", session.target().describe());
    if collect_secret(session, read)? {
        Ok(Prepared::Ready)
    } else {
        Ok(Prepared::Cancelled)
    }
}

enum Prepared {
    Finished(TransferOutcome),
    Ready,
    Cancelled,
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Free text goes through the dispatcher; its remote part runs on a
    //! spawned task so several commands can be in flight at once. Slash
    //! commands drive secure transfer sessions. A renderer task prints every
    //! log change as it happens.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::dispatcher::{Dispatcher, NO_DOCUMENTS};
    use crate::documents::{documents_table, DocumentListView};

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    ///
    /// # Errors
    ///
    /// Returns error if the gateway or the line editor cannot be created
    pub async fn run_chat(config: Config) -> Result<()> {
        let gateway = build_gateway(&config)?;
        let log = ConversationLog::new();
        let renderer = spawn_renderer(&log, config.chat.show_timestamps);

        let dispatcher = Dispatcher::new(log.clone(), gateway.clone(), config.knowledge_base());
        let orchestrator = build_orchestrator(gateway.clone(), &config.downloads.directory);
        let mut documents = DocumentListView::new(gateway);

        dispatcher.welcome(config.chat.user_email.as_deref());
        println!("Type '/help' for available commands, 'exit' to quit\n");

        let mut rl = DefaultEditor::new()?;

        loop {
            match rl.readline("securedoc> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            println!("{}", e.to_string().yellow());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::Upload(files) => {
                            log.append(Message::user(trimmed));
                            let session = TransferSession::upload(files);
                            start_transfer(&mut rl, &orchestrator, &log, session)?;
                        }
                        SpecialCommand::Download(id) => {
                            log.append(Message::user(trimmed));
                            if let Err(e) = documents.refresh().await {
                                log.append(Message::error(e.user_message()));
                                continue;
                            }
                            match documents.get(&id).cloned() {
                                Some(document) => {
                                    let session = TransferSession::download(document);
                                    start_transfer(&mut rl, &orchestrator, &log, session)?;
                                }
                                None => {
                                    log.append(Message::error(format!(
                                        "No document with ID {}",
                                        id
                                    )));
                                }
                            }
                        }
                        SpecialCommand::Email(id) => {
                            log.append(Message::user(trimmed));
                            let file_name = documents.get(&id).map(|d| d.file_name.clone());
                            let session = TransferSession::email(id, file_name);
                            start_transfer(&mut rl, &orchestrator, &log, session)?;
                        }
                        SpecialCommand::Docs(query) => {
                            if let Err(e) = documents.refresh().await {
                                println!("{}", e.user_message().red());
                                continue;
                            }
                            let hits = documents.filter(query.as_deref().unwrap_or(""));
                            if hits.is_empty() {
                                println!("{}", NO_DOCUMENTS);
                            } else {
                                documents_table(&hits).printstd();
                            }
                        }
                        SpecialCommand::ShowStatus => {
                            println!(
                                "{} operation(s) in flight, {} messages in this conversation",
                                log.pending_count(),
                                log.len()
                            );
                        }
                        SpecialCommand::Help => print_help(),
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => {
                            if let Some(pending) = dispatcher.submit(trimmed) {
                                tokio::spawn(async move {
                                    if let Err(e) = pending.run().await {
                                        tracing::error!("Failed to resolve placeholder: {}", e);
                                    }
                                });
                            }
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }

        let pending = log.pending_count();
        if pending > 0 {
            tracing::warn!("Leaving with {} operation(s) still in flight", pending);
        }
        renderer.abort();
        println!("Goodbye!");
        Ok(())
    }

    /// Collect the secret, then run the transfer on a spawned task
    fn start_transfer(
        rl: &mut DefaultEditor,
        orchestrator: &TransferOrchestrator,
        log: &ConversationLog,
        mut session: TransferSession,
    ) -> Result<()> {
        match prepare_session(orchestrator, &mut session, || rl.readline(SECRET_PROMPT))? {
            Prepared::Finished(outcome) => report_outcome(log, &outcome),
            Prepared::Cancelled => {
                log.append(Message::bot(format!(
                    "Cancelled the {}.",
                    session.target().describe()
                )));
            }
            Prepared::Ready => {
                log.append(Message::bot(format!(
                    "Starting the {}...",
                    session.target().describe()
                )));
                let orchestrator = orchestrator.clone();
                let log = log.clone();
                tokio::spawn(async move {
                    match orchestrator.execute(&mut session).await {
                        Ok(outcome) => report_outcome(&log, &outcome),
                        Err(e) => {
                            tracing::error!("Transfer could not start: {}", e);
                            log.append(Message::error(e.to_string()));
                        }
                    }
                });
            }
        }
        Ok(())
    }

    /// Print log changes as they happen
    ///
    /// User messages are skipped; the terminal already shows what was typed.
    fn spawn_renderer(log: &ConversationLog, show_timestamps: bool) -> tokio::task::JoinHandle<()> {
        let mut events = log.subscribe();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    LogEvent::Appended(message) if message.origin == Origin::User => {}
                    LogEvent::Appended(message) | LogEvent::Resolved(message) => {
                        println!("{}", render_message(&message, show_timestamps));
                    }
                }
            }
        })
    }
}

// Document listing command handler
pub mod docs {
    //! Direct document list: fetch, filter, print as a table or JSON.

    use super::*;
    use crate::dispatcher::NO_DOCUMENTS;
    use crate::documents::{documents_json, documents_table, DocumentListView};

    /// List documents
    ///
    /// # Errors
    ///
    /// Returns error if the list cannot be fetched or serialized
    pub async fn list_documents(config: Config, query: Option<String>, json: bool) -> Result<()> {
        let gateway = build_gateway(&config)?;
        let mut view = DocumentListView::new(gateway);
        view.refresh().await?;

        let hits = view.filter(query.as_deref().unwrap_or(""));
        if json {
            println!("{}", documents_json(&hits)?);
        } else if hits.is_empty() {
            println!("{}", NO_DOCUMENTS);
        } else {
            documents_table(&hits).printstd();
            println!("{} document(s)", hits.len());
        }
        Ok(())
    }
}

// One-shot transfer command handlers
pub mod transfer {
    //! Upload, download and email sessions outside of chat.
    //!
    //! Each handler runs exactly one session, prints the messages the outcome
    //! produces and fails when the session did not succeed.

    use std::path::PathBuf;

    use super::*;
    use crate::documents::DocumentListView;
    use crate::error::SecureDocError;

    /// Upload `files`, all secured with one prompted secret
    ///
    /// # Errors
    ///
    /// Returns error if every file failed or the session was cancelled
    pub async fn upload(config: Config, files: Vec<PathBuf>) -> Result<()> {
        let gateway = build_gateway(&config)?;
        let orchestrator = build_orchestrator(gateway, &config.downloads.directory);
        run_session(&config, &orchestrator, TransferSession::upload(files)).await
    }

    /// Download a document by id into `output` or the configured directory
    ///
    /// # Errors
    ///
    /// Returns error if the document is unknown or the download failed
    pub async fn download(config: Config, id: String, output: Option<PathBuf>) -> Result<()> {
        let gateway = build_gateway(&config)?;
        let mut view = DocumentListView::new(gateway.clone());
        view.refresh().await?;
        let document = view.get(&id).cloned().ok_or_else(|| {
            SecureDocError::Session(format!("No document with ID {} in your list", id))
        })?;

        let directory = output.unwrap_or_else(|| config.downloads.directory.clone());
        let orchestrator = build_orchestrator(gateway, &directory);
        run_session(&config, &orchestrator, TransferSession::download(document)).await
    }

    /// Email a document, decrypted with its upload password
    ///
    /// # Errors
    ///
    /// Returns error if the service rejected the request
    pub async fn email(config: Config, id: String) -> Result<()> {
        let gateway = build_gateway(&config)?;
        let orchestrator = build_orchestrator(gateway, &config.downloads.directory);
        run_session(&config, &orchestrator, TransferSession::email(id, None)).await
    }

    async fn run_session(
        config: &Config,
        orchestrator: &TransferOrchestrator,
        mut session: TransferSession,
    ) -> Result<()> {
        let description = session.target().describe();

        // The editor is only needed when a secret has to be typed.
        let mut editor: Option<DefaultEditor> = None;
        let read = || -> std::result::Result<String, ReadlineError> {
            if editor.is_none() {
                editor = Some(DefaultEditor::new()?);
            }
            editor
                .as_mut()
                .map_or(Err(ReadlineError::Eof), |rl| rl.readline(SECRET_PROMPT))
        };

        let outcome = match prepare_session(orchestrator, &mut session, read)? {
            Prepared::Finished(outcome) => outcome,
            Prepared::Cancelled => {
                println!("Cancelled the {}.", description);
                return Ok(());
            }
            Prepared::Ready => orchestrator.execute(&mut session).await?,
        };

        let log = ConversationLog::new();
        report_outcome(&log, &outcome);
        print_log(&log, config.chat.show_timestamps);

        if outcome.is_success() {
            Ok(())
        } else {
            anyhow::bail!("The {} did not complete", description)
        }
    }
}

// Summary command handler
pub mod summary {
    //! One-shot summary, run through the same dispatcher as chat.

    use super::*;
    use crate::dispatcher::Dispatcher;

    /// Print the summary of a document
    ///
    /// # Errors
    ///
    /// Returns error if the service reported a failure
    pub async fn show_summary(config: Config, id: String) -> Result<()> {
        let gateway = build_gateway(&config)?;
        let dispatcher = Dispatcher::new(ConversationLog::new(), gateway, config.knowledge_base());

        let resolved = dispatcher.dispatch(&format!("summarize {}", id)).await?;
        match resolved {
            Some(message) if message.kind == MessageKind::Error => {
                anyhow::bail!("{}", message.text)
            }
            Some(message) => {
                println!("{}", render_message(&message, false));
                Ok(())
            }
            None => Ok(()),
        }
    }
}

// Activity log command handler
pub mod logs {
    //! Activity log page, printed as a table and optionally exported to CSV.

    use std::path::PathBuf;

    use super::*;
    use crate::activity::{activity_table, default_export_name, export_csv, fetch_page};
    use crate::gateway::ActivityQuery;

    /// Show one page of activity logs
    ///
    /// # Errors
    ///
    /// Returns error if the page cannot be fetched or exported
    pub async fn show_logs(
        config: Config,
        query: ActivityQuery,
        csv: Option<Option<PathBuf>>,
    ) -> Result<()> {
        let gateway = build_gateway(&config)?;
        let page = fetch_page(gateway.as_ref(), &query).await?;

        if page.logs.is_empty() {
            println!("No activity found.");
        } else {
            activity_table(&page.logs).printstd();
        }
        println!(
            "Page {} of {} ({} records)",
            page.meta.page,
            page.meta.pages.max(1),
            page.meta.total
        );

        if let Some(path) = csv {
            let path = path.unwrap_or_else(|| PathBuf::from(default_export_name()));
            export_csv(&page.logs, &path)?;
            println!("{}", format!("Exported to {}", path.display()).green());
        }
        Ok(())
    }
}

// Session credential command handlers
pub mod auth {
    //! Keyring login and logout.

    use super::*;
    use crate::session::TokenStore;

    /// Store a bearer token in the system keyring
    ///
    /// # Errors
    ///
    /// Returns error if the token is blank or the keyring write fails
    pub fn login(config: &Config, token: &str) -> Result<()> {
        TokenStore::new(&config.session).save(token)?;
        println!("{}", "Signed in.".green());
        Ok(())
    }

    /// Remove the stored bearer token
    ///
    /// # Errors
    ///
    /// Returns error if the keyring cannot be accessed
    pub fn logout(config: &Config) -> Result<()> {
        TokenStore::new(&config.session).clear()?;
        println!("Signed out.");
        Ok(())
    }
}
