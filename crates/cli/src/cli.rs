//! Top-level command-line parser.

use clap::{Parser, Subcommand};

use crate::args::{DownloadArgs, ListArgs, LogArgs, ServerArgs, UploadArgs};

/// Stash - stream files to and from a remote store over gRPC
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Logging configuration.
    #[command(flatten)]
    pub logs: LogArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Stash commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the file server.
    Server(ServerArgs),

    /// Upload a local file.
    Upload(UploadArgs),

    /// Download a stored file.
    Download(DownloadArgs),

    /// List stored files.
    List(ListArgs),
}
