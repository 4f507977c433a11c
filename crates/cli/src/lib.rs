//! CLI for the Stash file service.
//!
//! This crate provides the command-line interface:
//! - [`Cli`] - Top-level CLI parser
//! - [`Commands`] - `server`, `upload`, `download` and `list`
//!
//! Server configuration is loaded using Figment with the following priority
//! (highest wins):
//!
//! 1. CLI arguments
//! 2. Config file (TOML)
//! 3. Environment variables (`STASH_` prefix)
//! 4. Defaults

pub mod args;
mod cli;
pub mod commands;
pub mod config;
pub mod logging;

pub use cli::{Cli, Commands};
pub use config::ServerConfig;

use clap::Parser;
use color_eyre::eyre;

/// Run `stash` with the process's command line arguments.
///
/// This is the main entry point that should be called from the binary.
pub async fn run() -> eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging(&cli.logs)?;

    match cli.command {
        Commands::Server(args) => commands::server::run(args).await,
        Commands::Upload(args) => commands::client::upload(args).await,
        Commands::Download(args) => commands::client::download(args).await,
        Commands::List(args) => commands::client::list(args).await,
    }
}
