//! skillswap - terminal front end for the skill exchange marketplace.
//!
//! Every invocation restores the stored session, runs one command through
//! the session controller, and prints the result or the resulting notice.

mod cli;
mod commands;
mod render;

use std::io;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use skillswap_core::{Config, SessionController};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;
use commands::{Failure, Runner};

/// Log file name in the data directory
const LOG_FILE: &str = "skillswap.log";

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` controls the level (default `warn`). Output goes to stderr,
/// and to a log file in the data directory when one can be opened.
fn init_tracing(data_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = data_dir
        .filter(|dir| std::fs::create_dir_all(dir).is_ok())
        .map(|dir| {
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, LOG_FILE));
            (fmt::layer().with_ansi(false).with_writer(writer), guard)
        })
        .unzip();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let _guard = init_tracing(config.data_dir().ok().as_deref());
    info!(command = ?cli.command, "skillswap starting");

    let controller = match SessionController::from_config(&config) {
        Ok(controller) => controller,
        Err(e) => {
            error!(error = %e, "Failed to start");
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    controller.initialize();

    let mut runner = Runner { controller: &controller, config: &mut config, json: cli.json };
    match runner.run(cli.command).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(Failure::Api(e)) => {
            controller.note_error(&e);
            eprintln!("{}", render::failure(&controller.view(), e.requires_login()));
            ExitCode::FAILURE
        }
        Err(Failure::Local(e)) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load()?.with_env_overrides();
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }
    Ok(config)
}
