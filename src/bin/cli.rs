//! Cafe stock snapshot CLI
//!
//! One invocation performs one run; scheduling is left to the caller
//! (cron, CI schedule, systemd timer).

use std::path::{Path, PathBuf};

use cafemap::{
    error::Result,
    models::{Config, LoggingConfig},
    pipeline,
    storage::{LocalStorage, SnapshotSink},
};
use clap::{Parser, Subcommand};

/// cafemap - embedded cafe list to compact stock snapshot
#[derive(Parser, Debug)]
#[command(name = "cafemap", version, about = "Cafe stock snapshot crawler")]
struct Cli {
    /// Path to the TOML config file (defaults apply when missing)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the page and write a fresh snapshot (default)
    Run {
        /// Override the snapshot output path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate configuration
    Validate,

    /// Show the current snapshot info
    Info,
}

/// Initialize logging based on verbosity flag. Later calls are ignored.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .try_init();
}

/// Load the config file, or defaults when it does not exist.
///
/// Logging is configured from the loaded file; a broken file is reported
/// through a logger at the default level before the error is returned.
fn load_config(path: &Path, verbose: bool) -> Result<Config> {
    let config = if path.exists() {
        match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                init_logging(verbose, &LoggingConfig::default().level);
                log::error!("Failed to load config {}: {}", path.display(), e);
                return Err(e);
            }
        }
    } else {
        Config::default()
    };
    init_logging(verbose, &config.logging.level);
    Ok(config)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config, cli.verbose)?;

    match cli.command.unwrap_or(Command::Run { output: None }) {
        Command::Run { output } => {
            if let Some(path) = output {
                config.output.path = path;
            }
            pipeline::run_crawler(&config).await?;
        }

        Command::Validate => pipeline::run_validate(&config)?,

        Command::Info => {
            let storage = LocalStorage::new(&config.output.path);
            log::info!("Snapshot path: {}", storage.path().display());

            match storage.load_snapshot().await? {
                Some(snapshot) => {
                    log::info!("Generated: {}", snapshot.generated_at);
                    log::info!(
                        "Records: {} ({} available)",
                        snapshot.total_count,
                        snapshot.available_count
                    );
                }
                None => log::info!("No snapshot found yet."),
            }
        }
    }

    Ok(())
}
