//! Server command arguments.
//!
//! Every value is optional: anything left unset falls through to the config
//! file, the environment, and finally the built-in defaults.

use std::path::PathBuf;

use clap::Args;

/// Arguments for `stash server`.
#[derive(Debug, Default, Args, Clone)]
pub struct ServerArgs {
    /// Path to a TOML config file.
    #[arg(long, value_name = "PATH", env = "STASH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory where uploaded files are stored.
    #[arg(long = "storage.dir", value_name = "DIR", help_heading = "Storage")]
    pub storage_dir: Option<PathBuf>,

    /// gRPC server listen address.
    #[arg(long = "grpc.addr", value_name = "ADDR", help_heading = "API")]
    pub grpc_addr: Option<String>,

    /// gRPC server listen port.
    #[arg(long = "grpc.port", value_name = "PORT", help_heading = "API")]
    pub grpc_port: Option<u16>,

    /// Maximum uploads and downloads served at once.
    #[arg(long = "transfer.max-concurrent", value_name = "N", help_heading = "Limits")]
    pub transfer_max_concurrent: Option<usize>,

    /// Maximum listings served at once.
    #[arg(long = "list.max-concurrent", value_name = "N", help_heading = "Limits")]
    pub list_max_concurrent: Option<usize>,

    /// Size of download chunks in bytes.
    #[arg(long = "chunk-size", value_name = "BYTES", help_heading = "Limits")]
    pub chunk_size: Option<usize>,

    /// Enable the Prometheus metrics endpoint.
    #[arg(long = "metrics", help_heading = "Metrics")]
    pub metrics: bool,

    /// Metrics listen address.
    #[arg(long = "metrics.addr", value_name = "ADDR", help_heading = "Metrics")]
    pub metrics_addr: Option<String>,

    /// Metrics listen port.
    #[arg(long = "metrics.port", value_name = "PORT", help_heading = "Metrics")]
    pub metrics_port: Option<u16>,
}
