// pinecache entrypoint
//!
//! Loads configuration, installs logging, opens the store once and runs a
//! single subcommand against it.

use anyhow::Result;
use clap::Parser;
use log::info;
use pinecache::args::Cli;
use pinecache::commands::{execute, Outcome};
use pinecache::{lifecycle, logging};
use pinecache_configs::ServerConfig;
use std::io::Write;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration (fallback to defaults when config file missing)
    let config = ServerConfig::load_or_default(&cli.config)?;

    // Logging before any other side effects
    let log_path = format!("{}/pinecache.log", config.logging.logs_path);
    logging::init_logging(
        &config.logging.level,
        &log_path,
        config.logging.log_to_console,
        Some(&config.logging.targets),
        &config.logging.format,
    )?;
    info!(
        "pinecache v{} (config: {})",
        env!("CARGO_PKG_VERSION"),
        cli.config.display()
    );

    let store = lifecycle::bootstrap(&config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = execute(&store, &cli.command, &mut out);
    out.flush()?;
    drop(out);

    lifecycle::shutdown(&store);

    Ok(match outcome? {
        Outcome::Done => ExitCode::SUCCESS,
        Outcome::NotFound => ExitCode::from(1),
    })
}
