//! Command-line arguments.

use super::app_config::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments; each one overrides its `config.toml` value.
#[derive(Debug, Parser)]
#[command(
    name = "locapp-photos",
    version,
    about = "Offline photo cache for LocApp welcome booklets",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Booklet server base URL.
    #[arg(long, env = "LOCAPP_SERVER_URL", value_name = "URL")]
    pub server_url: Option<String>,

    /// Bearer token for the mobile API.
    #[arg(long, env = "LOCAPP_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Photo store root directory.
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    /// HTTP request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Maintenance command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Maintenance commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download every photo of a reservation's property.
    Prefetch {
        /// Reservation id.
        #[arg(long)]
        reservation: u64,
        /// Property slug.
        #[arg(long)]
        property: String,
    },
    /// Print the size of the photo store.
    Size,
    /// Delete cached photos.
    Clear {
        /// Only delete this property's photos.
        #[arg(long)]
        property: Option<String>,
    },
    /// Resolve one photo and report where it came from.
    Show {
        /// Property slug.
        #[arg(long)]
        property: String,
        /// Photo file name.
        #[arg(long)]
        filename: String,
        /// Look up an access photo instead of a standard one.
        #[arg(long)]
        access: bool,
    },
}
