//! SecureDoc - encrypted document client
//!
#![doc = "SecureDoc - encrypted document client"]
#![doc = "Main entry point for the SecureDoc command-line application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use securedoc::cli::{Cli, Commands};
use securedoc::commands;
use securedoc::config::Config;
use securedoc::gateway::ActivityQuery;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration
    let config = Config::load(&cli.config, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat => {
            tracing::info!("Starting interactive chat mode");
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Docs { query, json } => {
            if let Some(q) = &query {
                tracing::debug!("Filtering documents by: {}", q);
            }
            commands::docs::list_documents(config, query, json).await?;
            Ok(())
        }
        Commands::Upload { files } => {
            tracing::info!("Uploading {} file(s)", files.len());
            commands::transfer::upload(config, files).await?;
            Ok(())
        }
        Commands::Download { id, output } => {
            tracing::info!("Downloading document {}", id);
            commands::transfer::download(config, id, output).await?;
            Ok(())
        }
        Commands::Summary { id } => {
            commands::summary::show_summary(config, id).await?;
            Ok(())
        }
        Commands::Email { id } => {
            tracing::info!("Emailing document {}", id);
            commands::transfer::email(config, id).await?;
            Ok(())
        }
        Commands::Logs {
            page,
            limit,
            query,
            action,
            from,
            to,
            csv,
        } => {
            let query = ActivityQuery {
                page,
                limit,
                text: query,
                action,
                from,
                to,
            };
            commands::logs::show_logs(config, query, csv).await?;
            Ok(())
        }
        Commands::Login { token } => {
            commands::auth::login(&config, &token)?;
            Ok(())
        }
        Commands::Logout => {
            commands::auth::logout(&config)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise `securedoc=info`, or
/// `securedoc=debug` with `--verbose`. Logs go to stderr so command output on
/// stdout stays clean.
fn init_tracing(verbose: bool, json_logs: bool) {
    let default_level = if verbose {
        "securedoc=debug"
    } else {
        "securedoc=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let json_layer = json_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}
