//! Chatscreen Console - Drive the Engine from a Terminal
//!
//! Reads inbound events from stdin, routes them through the engine and prints
//! every rendered screen. Useful for trying out screen trees without a chat
//! platform.
//!
//! # Usage
//!
//! ```bash
//! # Interactive session with the demo screens
//! chatscreen-console
//!
//! # Scripted session
//! printf 'text 1 1 /start\npress 1 1 screen:settings\n' | chatscreen-console
//!
//! # Custom config and start screen
//! chatscreen-console --config ./chatscreen.toml --start-screen gallery
//!
//! # Verbose logging
//! RUST_LOG=debug chatscreen-console
//! ```
//!
//! # Input
//!
//! - `text <chat> <user> <message...>`: a plain text message
//! - `press <chat> <user> <token>`: a button press
//! - a JSON `InboundEvent` per line
//!
//! # Signals
//!
//! - `SIGINT`: stop reading, drain queued events and exit

mod console_delivery;
mod demo;
mod input;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use chatscreen_core::{load_config, DeliveryClient, ScreenId, ScreenManager, UpdateDispatcher};

use console_delivery::ConsoleDelivery;
use input::LineParser;

/// Chatscreen Console - run a screen tree against stdin/stdout
#[derive(Parser, Debug)]
#[command(name = "chatscreen-console")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "CHATSCREEN_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Screen to use as the main screen instead of the demo menu
    #[arg(short = 's', long, value_name = "SCREEN")]
    start_screen: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "CHATSCREEN_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

/// Initialize logging with the specified level
///
/// Logs go to stderr so they never interleave with rendered screens.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "chatscreen_console={level},chatscreen_core={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Feed stdin lines to the dispatcher until EOF or Ctrl-C
async fn read_events<D: DeliveryClient + 'static>(dispatcher: &UpdateDispatcher<D>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut parser = LineParser::new();

    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            _ = &mut interrupt => {
                info!("Interrupted, stopping input");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    info!("End of input");
                    break;
                };
                match parser.parse(&line) {
                    Ok(Some(event)) => dispatcher.dispatch(event).await?,
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, line = %line, "Ignoring malformed input"),
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!("Chatscreen console starting");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    let delivery = Arc::new(ConsoleDelivery::new());
    let manager = Arc::new(ScreenManager::new(delivery, config));
    demo::register_demo(&manager);

    if let Some(start) = &args.start_screen {
        manager
            .set_main_screen_id(&ScreenId::new(start.as_str()))
            .with_context(|| format!("Cannot start on screen '{start}'"))?;
    }
    manager.main_screen()?;

    let dispatcher = UpdateDispatcher::new(Arc::clone(&manager));
    let result = read_events(&dispatcher).await;
    dispatcher.shutdown().await;

    match result {
        Ok(()) => {
            info!("Console stopped cleanly");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Console stopped with error");
            Err(e)
        }
    }
}
