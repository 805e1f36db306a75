//! pixgen entry point.
//!
//! Reads prompts from the terminal, drives the request controller and prints
//! one line per state change on stdout. Logging goes to stderr.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pixgen_client::{HttpImageDisplay, ImageClient, ImageClientConfig};
use pixgen_core::{AppConfig, GenerationState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

mod command;
mod controller;
mod render;

use command::Command;
use controller::{ControllerConfig, RequestController};
use render::{OutputFormat, TerminalRenderer};

#[derive(Debug, Parser)]
#[command(name = "pixgen", version, about = "Generate images from text prompts")]
struct Cli {
    /// TOML configuration file (overrides PIXGEN_CONFIG_FILE).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output style for state changes.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    output: OutputFormat,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Read prompts and /commands from stdin (default).
    Interactive,
    /// Generate a single prompt and exit.
    Generate {
        prompt: String,
        /// Save the image to the download directory.
        #[arg(long)]
        download: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(Some(path.as_path())),
        None => AppConfig::load(),
    }
    .context("loading configuration")?;

    let controller = build_controller(&config, cli.output)?;

    match cli.mode.unwrap_or(Mode::Interactive) {
        Mode::Interactive => {
            interactive(controller).await;
            Ok(ExitCode::SUCCESS)
        }
        Mode::Generate { prompt, download } => Ok(one_shot(controller, prompt, download).await),
    }
}

fn init_tracing(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_controller(config: &AppConfig, output: OutputFormat) -> Result<RequestController> {
    let source = Arc::new(ImageClient::new(ImageClientConfig::from(config))?);
    let display = Arc::new(HttpImageDisplay::from_config(config)?);
    let renderer = Box::new(TerminalRenderer::new(std::io::stdout(), output));

    Ok(RequestController::new(ControllerConfig::from(config), source, display.clone(), display, renderer))
}

async fn interactive(controller: RequestController) {
    tracing::info!("starting interactive session");
    eprintln!("type a prompt; /submit, /regen, /download, /quit");

    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(read_commands(tx));
    let controller = controller.run(rx).await;

    let cache = controller.cache();
    tracing::info!(
        state = controller.state().name(),
        cached = cache.len(),
        capacity = cache.capacity(),
        "session ended"
    );
}

async fn read_commands(tx: mpsc::Sender<Command>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match line.parse::<Command>() {
                Ok(command) => {
                    let quit = command == Command::Quit;
                    if tx.send(command).await.is_err() || quit {
                        break;
                    }
                }
                Err(e) => eprintln!("{e}"),
            },
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("failed to read stdin: {e}");
                break;
            }
        }
    }
}

async fn one_shot(mut controller: RequestController, prompt: String, download: bool) -> ExitCode {
    controller.dispatch(Command::InputChanged(prompt));
    controller.dispatch(Command::Submit);
    controller.settle().await;

    if download && controller.displayed().is_some() {
        controller.dispatch(Command::Download);
        controller.wait_for_saves().await;
    }

    match controller.state() {
        GenerationState::Error(_) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}
