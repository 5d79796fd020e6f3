//! spidersearch: ranked keyword search over a crawled web index
//!
//! Serves queries over a Unix socket and provides a client for them.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use spidersearch::config::{Config, LogFormat, LoggingConfig, DEFAULT_CONFIG_FILE};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::OutputFormat;

#[derive(Parser)]
#[command(name = "spidersearch")]
#[command(about = "Ranked keyword search over a crawled web index")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Unix socket path (overrides the configuration file)
    #[arg(short, long)]
    socket: Option<PathBuf>,

    /// Web index path (overrides the configuration file)
    #[arg(short, long)]
    index: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the web index and serve queries until interrupted
    Serve,

    /// Query a running server
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "10", allow_negative_numbers = true)]
        max_results: i64,

        /// Score by match density instead of raw occurrence counts
        #[arg(short, long)]
        quotient: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Write a default configuration file
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    match cli.command {
        Commands::Init { path } => {
            init_logging(&LoggingConfig::default(), verbose)?;
            commands::init_config(path).await
        }
        Commands::Serve => {
            let config = load_config(&cli.config, cli.socket, cli.index, verbose)?;
            commands::serve(config).await
        }
        Commands::Search {
            query,
            max_results,
            quotient,
            format,
        } => {
            let config = load_config(&cli.config, cli.socket, cli.index, verbose)?;
            commands::search_index(config, query, max_results, quotient, format).await
        }
    }
}

/// Load the config file (defaults if absent), apply CLI overrides, validate,
/// and install logging from the result
fn load_config(
    path: &Path,
    socket: Option<PathBuf>,
    index: Option<PathBuf>,
    verbose: u8,
) -> Result<Config> {
    let file_exists = path.exists();
    let mut config = if file_exists {
        Config::load(path)?
    } else {
        Config::default()
    };

    if let Some(socket) = socket {
        config.server.socket_path = socket;
    }
    if let Some(index) = index {
        config.index.path = index;
    }
    config.validate()?;

    init_logging(&config.logging, verbose)?;
    if !file_exists {
        debug!("No config file at {}, using defaults", path.display());
    }
    Ok(config)
}

/// Install the global subscriber. `RUST_LOG`, when set, wins over the
/// configured level.
fn init_logging(logging: &LoggingConfig, verbose: u8) -> Result<()> {
    let level = logging.level.raised_by(verbose);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match logging.format {
        LogFormat::Json => builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e)),
        LogFormat::Text => builder
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e)),
    }
}
