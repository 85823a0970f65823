use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dictdoc_auth::{AuthStatus, OAuthIdentity, TokenProvider};
use dictdoc_config::Config;
use dictdoc_dictionary::DictionaryClient;
use dictdoc_docs::SaveTemplate;
use dictdoc_types::{HostMessage, SelectionEvent};
use tracing_subscriber::EnvFilter;

mod context;
mod controller;
mod events;
mod io;
mod modal;
mod service;
mod state;
mod ui;

#[cfg(test)]
mod tests;

use controller::AppController;
use service::SaveService;
use state::AppState;

#[derive(Parser)]
#[command(
    name = "dictdoc",
    about = "Look up English words with a Hindi translation and keep them in a Google Docs dictionary",
    version
)]
struct Cli {
    /// JSON config profile, environment variables still override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    /// Emit JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive overlay on the terminal (default)
    Run,
    /// Look up one word and print it
    Lookup { word: String },
    /// Look up one word and append it to the dictionary document
    Save { word: String },
    /// Check whether a token is available without prompting
    Status,
    /// Request a token interactively
    Connect,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        tracing::error!("{e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }

    // A pending stdin read would otherwise hold the runtime open
    std::process::exit(0);
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::new(),
    };

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run_overlay(config).await,
        Command::Lookup { word } => handle_lookup(&config, &word, cli.json).await,
        Command::Save { word } => handle_save(&config, &word, cli.json).await,
        Command::Status => handle_status(&config, false, cli.json).await,
        Command::Connect => handle_status(&config, true, cli.json).await,
    }
}

async fn run_overlay(config: Config) -> anyhow::Result<()> {
    let dictionary = Arc::new(DictionaryClient::from_config(&config.dictionary, &config.translator));
    let service = Arc::new(SaveService::from_config(
        &config.docs,
        Arc::new(OAuthIdentity::new(&config.auth)),
    ));

    let state = Arc::new(AppState::new(config));
    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks(dictionary, service);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Ok(())) => tracing::info!("Task finished, shutting down"),
                Ok(Err(e)) => tracing::error!("Task failed: {e:#}"),
                Err(e) => tracing::error!("Task panicked: {e}"),
            }
        }
    }

    controller.shutdown();
    tasks.abort_all();
    while tasks.join_next().await.is_some() {}

    Ok(())
}

fn selection(word: &str) -> anyhow::Result<SelectionEvent> {
    SelectionEvent::from_selection(word).context("Nothing to look up")
}

async fn handle_lookup(config: &Config, word: &str, as_json: bool) -> anyhow::Result<()> {
    let selection = selection(word)?;
    let dictionary = DictionaryClient::from_config(&config.dictionary, &config.translator);
    let result = dictionary.lookup(&selection.text).await;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.word);
        println!("English Meaning");
        for line in modal::english_text(&result.definitions).lines() {
            println!("  {line}");
        }
        println!("Hindi Meaning");
        println!("  {}", result.translation);
    }

    Ok(())
}

async fn handle_save(config: &Config, word: &str, as_json: bool) -> anyhow::Result<()> {
    let selection = selection(word)?;
    let dictionary = DictionaryClient::from_config(&config.dictionary, &config.translator);
    let result = dictionary.lookup(&selection.text).await;

    let content = SaveTemplate::default().format(
        &result.word,
        &modal::english_text(&result.definitions),
        &result.translation,
    );
    let service = SaveService::from_config(&config.docs, Arc::new(OAuthIdentity::new(&config.auth)));
    let response = service
        .handle(HostMessage::SaveToGoogleDocs {
            content,
            word: result.word.clone(),
        })
        .await;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    match response.into_result() {
        Ok(receipt) => {
            println!("{}", modal::SAVE_SUCCESS_TEXT);
            println!("Document: {}", receipt.doc_id);
            Ok(())
        }
        Err(e) => anyhow::bail!("{}: {}", modal::SAVE_FAILURE_TEXT, e),
    }
}

async fn handle_status(config: &Config, interactive: bool, as_json: bool) -> anyhow::Result<()> {
    let provider = TokenProvider::new(Arc::new(OAuthIdentity::new(&config.auth)));
    let status = if interactive {
        AuthStatus::connect(&provider).await
    } else {
        AuthStatus::check(&provider).await
    };

    if as_json {
        let value = serde_json::json!({
            "connected": status == AuthStatus::Connected,
            "status": status.detail(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", status.headline());
        println!("{}", status.detail());
    }

    Ok(())
}
