//! Client command arguments.

use std::path::PathBuf;

use clap::Args;
use stash_client::DEFAULT_SERVER_ADDR;
use stash_transfer::DEFAULT_CHUNK_SIZE;

/// Connection settings shared by the client commands.
#[derive(Debug, Args, Clone)]
pub struct ClientArgs {
    /// Server URL.
    #[arg(long, value_name = "URL", env = "STASH_ADDR", default_value = DEFAULT_SERVER_ADDR)]
    pub addr: String,
}

/// Arguments for `stash upload`.
#[derive(Debug, Args, Clone)]
pub struct UploadArgs {
    /// Local file to upload. It is stored under its base name.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Size of upload chunks in bytes.
    #[arg(long = "chunk-size", value_name = "BYTES", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    #[command(flatten)]
    pub client: ClientArgs,
}

/// Arguments for `stash download`.
#[derive(Debug, Args, Clone)]
pub struct DownloadArgs {
    /// Name of the stored file.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Where to write the file. Defaults to NAME in the working directory.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub client: ClientArgs,
}

/// Arguments for `stash list`.
#[derive(Debug, Args, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub client: ClientArgs,
}
