// Solace - Keyword-driven psychology chat backend
// Main entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::prelude::*;

use solace::config::{load_config, Config, LoggingConfig};
use solace::matcher::Classification;
use solace::respond::Reply;
use solace::server::ChatServer;
use solace::Engine;

#[derive(Parser, Debug)]
#[command(name = "solace")]
#[command(about = "Keyword-driven psychology chat backend", version)]
struct Args {
    /// Config file (default: ~/.solace/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Bind address, overrides the config file
        #[arg(long)]
        bind: Option<String>,
    },
    /// Classify a message and print the result as JSON
    Classify { text: String },
    /// Classify a message and print the assembled reply as JSON
    Respond { text: String },
    /// Summarize a message the way the analysis pass does
    Summarize { text: String },
}

#[derive(Serialize)]
struct RespondOutput {
    classification: Classification,
    reply: Reply,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Serve { bind } => run_server(config, bind).await,
        Command::Classify { text } => {
            let engine = one_shot_engine(&config)?;
            print_json(&engine.classify(&text))
        }
        Command::Respond { text } => {
            let engine = one_shot_engine(&config)?;
            let classification = engine.classify(&text);
            let reply = engine.respond_to(&classification);
            print_json(&RespondOutput {
                classification,
                reply,
            })
        }
        Command::Summarize { text } => {
            let engine = one_shot_engine(&config)?;
            print_json(&engine.summarize(&text))
        }
    }
}

async fn run_server(mut config: Config, bind: Option<String>) -> Result<()> {
    init_tracing(&config.logging, "info")?;

    if let Some(bind) = bind {
        config.server.bind_address = bind;
    }

    tracing::info!(
        store = ?config.storage.kind,
        knowledge = config.data.knowledge_enabled,
        "Starting Solace in server mode"
    );

    let server = ChatServer::from_config(&config)?;
    server.serve().await
}

fn one_shot_engine(config: &Config) -> Result<Engine> {
    init_tracing(&config.logging, "warn")?;
    Engine::from_config(&config.data)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Stderr logging, plus an append-only file when configured
fn init_tracing(logging: &LoggingConfig, default_level: &str) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let file_layer = match &logging.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory: {}", parent.display())
                })?;
            }
            let log_file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;

            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(log_file))
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}
