//! qcon — Quest Console client.
//!
//! Connects to a text-adventure game server over WebSocket, renders the
//! game's markup-styled output in the terminal, and relays typed commands
//! back as player events.

mod config;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::error;

use qcon_client::{ConsoleSession, WebSocketTransport};

use crate::config::resolve_target;
use crate::output::AnsiSink;

/// qcon — Quest Console client
#[derive(Parser)]
#[command(name = "qcon", version = "0.1.0", about = "Quest Console — play text adventures served over WebSocket")]
struct Cli {
    /// Game to join: a game identifier, or a full ws:// URL
    target: Option<String>,

    /// Game server host
    #[arg(long)]
    host: Option<String>,

    /// Game server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Config file path
    #[arg(long = "config")]
    config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing.
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("qcon=debug,qcon_cli=debug,qcon_client=debug,qcon_core=debug")
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("qcon=warn,qcon_cli=warn")
            .with_target(false)
            .init();
    }

    // Load config file.
    let config_path = cli.config.clone().unwrap_or_else(|| {
        let home = dirs::home_dir().unwrap_or_default();
        home.join(".qcon").join("config.toml").to_string_lossy().to_string()
    });
    let cfg = config::Config::load(&config_path).unwrap_or_default();

    // Determine effective target, host, and port (CLI overrides config).
    let host = cli.host.unwrap_or(cfg.default.host);
    let port = cli.port.unwrap_or(cfg.default.port);
    let target = cli.target.unwrap_or(cfg.default.game);

    if target.is_empty() {
        eprintln!(
            "Usage: qcon <game>\n       qcon ws://host:port/<game>/\n\nRun `qcon --help` for full usage."
        );
        std::process::exit(1);
    }

    if let Err(e) = run(&target, &host, port).await {
        error!("{:#}", e);
        eprintln!("qcon: {e:#}");
        std::process::exit(1);
    }
}

/// Connect, then shuttle lines between the terminal and the session until
/// either side ends the game.
async fn run(target: &str, host: &str, port: u16) -> Result<()> {
    let (url, game) = resolve_target(target, host, port);
    tracing::info!(url = %url, game = %game, "connecting");

    let transport = WebSocketTransport::connect(&url)
        .await
        .with_context(|| format!("failed to connect to {url}"))?;

    // Feed typed lines to the session. Dropping the sender on stdin EOF is
    // the teardown signal, mirroring the player leaving.
    let (input_tx, input_rx) = mpsc::channel::<String>(8);
    let input_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if input_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    let mut session = ConsoleSession::new(transport, AnsiSink::new(), game);
    let result = session.run(input_rx).await;

    input_handle.abort();
    result.context("session ended with an error")?;

    eprintln!("Connection closed.");
    Ok(())
}
