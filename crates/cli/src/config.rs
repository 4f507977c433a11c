//! Figment-based server configuration.
//!
//! Configuration priority (highest wins):
//! 1. CLI arguments (applied after Figment load)
//! 2. Config file (TOML)
//! 3. Environment variables (`STASH_` prefix, `__` between sections, e.g.
//!    `STASH_GRPC__PORT`)
//! 4. Defaults

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use stash_transfer::{
    DEFAULT_CHUNK_SIZE, DEFAULT_LIST_CAPACITY, DEFAULT_STORAGE_DIR, DEFAULT_TRANSFER_CAPACITY,
    TransferConfig,
};

use crate::args::ServerArgs;

/// Default gRPC listen address (all interfaces).
pub const DEFAULT_GRPC_ADDR: &str = "0.0.0.0";

/// Default gRPC listen port.
pub const DEFAULT_GRPC_PORT: u16 = 50051;

/// Default metrics listen address.
pub const DEFAULT_METRICS_ADDR: &str = "127.0.0.1";

/// Default metrics listen port.
pub const DEFAULT_METRICS_PORT: u16 = 9464;

/// Complete server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub storage: StorageConfig,
    pub grpc: GrpcConfig,
    pub transfer: TransferLimits,
    pub list: ListLimits,
    pub metrics: MetricsConfig,
}

/// Storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory where uploaded files are stored.
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from(DEFAULT_STORAGE_DIR) }
    }
}

/// gRPC listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrpcConfig {
    pub addr: String,
    pub port: u16,
}

impl Default for GrpcConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_GRPC_ADDR.to_string(),
            port: DEFAULT_GRPC_PORT,
        }
    }
}

/// Upload and download limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferLimits {
    /// Uploads and downloads served at once.
    pub max_concurrent: usize,

    /// Download chunk size in bytes.
    pub chunk_size: usize,
}

impl Default for TransferLimits {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_TRANSFER_CAPACITY,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Listing limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListLimits {
    /// Listings served at once.
    pub max_concurrent: usize,
}

impl Default for ListLimits {
    fn default() -> Self {
        Self { max_concurrent: DEFAULT_LIST_CAPACITY }
    }
}

/// Prometheus endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub addr: String,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: DEFAULT_METRICS_ADDR.to_string(),
            port: DEFAULT_METRICS_PORT,
        }
    }
}

impl ServerConfig {
    /// Load configuration from defaults, environment, and config file.
    /// CLI overrides should be applied separately with [`apply_args`](Self::apply_args).
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Env::prefixed("STASH_").ignore(&["config", "addr"]).split("__"));

        if let Some(path) = config_path {
            eyre::ensure!(
                path.exists(),
                "config file {} does not exist",
                path.display()
            );
            figment = figment.merge(Toml::file(path));
        }

        figment.extract().wrap_err("Failed to load configuration")
    }

    /// Override loaded values with whatever was given on the command line.
    pub fn apply_args(&mut self, args: &ServerArgs) {
        if let Some(dir) = &args.storage_dir {
            self.storage.dir = dir.clone();
        }
        if let Some(addr) = &args.grpc_addr {
            self.grpc.addr = addr.clone();
        }
        if let Some(port) = args.grpc_port {
            self.grpc.port = port;
        }
        if let Some(n) = args.transfer_max_concurrent {
            self.transfer.max_concurrent = n;
        }
        if let Some(n) = args.list_max_concurrent {
            self.list.max_concurrent = n;
        }
        if let Some(size) = args.chunk_size {
            self.transfer.chunk_size = size;
        }
        if args.metrics {
            self.metrics.enabled = true;
        }
        if let Some(addr) = &args.metrics_addr {
            self.metrics.addr = addr.clone();
        }
        if let Some(port) = args.metrics_port {
            self.metrics.port = port;
        }
    }

    /// Settings for the transfer layer.
    pub fn transfer_config(&self) -> TransferConfig {
        TransferConfig {
            storage_dir: self.storage.dir.clone(),
            chunk_size: self.transfer.chunk_size,
            transfer_capacity: self.transfer.max_concurrent,
            list_capacity: self.list.max_concurrent,
        }
    }

    /// Get the gRPC server socket address.
    pub fn grpc_socket_addr(&self) -> Result<SocketAddr> {
        socket_addr(&self.grpc.addr, self.grpc.port)
    }

    /// Get the metrics socket address.
    pub fn metrics_socket_addr(&self) -> Result<SocketAddr> {
        socket_addr(&self.metrics.addr, self.metrics.port)
    }
}

fn socket_addr(addr: &str, port: u16) -> Result<SocketAddr> {
    let ip: IpAddr = addr
        .parse()
        .wrap_err_with(|| format!("invalid listen address {addr:?}"))?;
    Ok(SocketAddr::new(ip, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.transfer_config(), TransferConfig::default());
        assert_eq!(
            config.grpc_socket_addr().unwrap(),
            "0.0.0.0:50051".parse().unwrap()
        );
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("stash.toml");

        fs::write(
            &config_path,
            r#"
[storage]
dir = "/srv/stash"

[transfer]
max_concurrent = 4

[grpc]
port = 6000
"#,
        )
        .unwrap();

        let config = ServerConfig::load(Some(&config_path)).unwrap();
        assert_eq!(config.storage.dir, PathBuf::from("/srv/stash"));
        assert_eq!(config.transfer.max_concurrent, 4);
        assert_eq!(config.transfer.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.grpc.port, 6000);
        assert_eq!(config.grpc.addr, DEFAULT_GRPC_ADDR);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        assert!(ServerConfig::load(Some(&config_path)).is_err());
    }

    #[test]
    fn test_env_and_file_priority() {
        Jail::expect_with(|jail| {
            jail.set_env("STASH_GRPC__PORT", "7000");
            jail.set_env("STASH_LIST__MAX_CONCURRENT", "3");
            jail.create_file("stash.toml", "[grpc]\nport = 8000\n")?;

            let config = ServerConfig::load(Some(Path::new("stash.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.grpc.port, 8000);
            assert_eq!(config.list.max_concurrent, 3);
            Ok(())
        });
    }

    #[test]
    fn test_cli_overrides_win() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("stash.toml");
        fs::write(
            &config_path,
            "[transfer]\nmax_concurrent = 4\nchunk_size = 512\n",
        )
        .unwrap();

        let mut config = ServerConfig::load(Some(&config_path)).unwrap();
        config.apply_args(&ServerArgs {
            transfer_max_concurrent: Some(2),
            metrics: true,
            metrics_port: Some(9999),
            ..Default::default()
        });

        // Values absent from the command line keep their loaded value.
        assert_eq!(config.transfer.chunk_size, 512);
        assert_eq!(config.transfer.max_concurrent, 2);
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics_socket_addr().unwrap().port(), 9999);
    }

    #[test]
    fn test_invalid_listen_address() {
        let mut config = ServerConfig::default();
        config.grpc.addr = "not-an-ip".to_string();
        assert!(config.grpc_socket_addr().is_err());
    }
}
