//! Transfer configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::TransferError;

/// Default size of a chunk frame in bytes, shared by upload and download.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Default number of uploads and downloads allowed to run at once.
pub const DEFAULT_TRANSFER_CAPACITY: usize = 10;

/// Default number of listings allowed to run at once.
pub const DEFAULT_LIST_CAPACITY: usize = 100;

/// Default storage directory, relative to the working directory.
pub const DEFAULT_STORAGE_DIR: &str = "./uploads";

/// Limits and locations used by the transfer layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Directory holding stored files.
    pub storage_dir: PathBuf,

    /// Size of outbound chunk frames in bytes.
    pub chunk_size: usize,

    /// Concurrent uploads and downloads (one shared pool).
    pub transfer_capacity: usize,

    /// Concurrent listings.
    pub list_capacity: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            chunk_size: DEFAULT_CHUNK_SIZE,
            transfer_capacity: DEFAULT_TRANSFER_CAPACITY,
            list_capacity: DEFAULT_LIST_CAPACITY,
        }
    }
}

impl TransferConfig {
    /// Check that every limit is usable.
    ///
    /// A zero-sized pool would block every call forever and a zero chunk size
    /// would never make progress, so both are rejected.
    pub fn validate(&self) -> Result<(), TransferError> {
        if self.chunk_size == 0 {
            return Err(TransferError::InvalidConfig(
                "chunk_size must be at least 1".into(),
            ));
        }
        if self.transfer_capacity == 0 {
            return Err(TransferError::InvalidConfig(
                "transfer_capacity must be at least 1".into(),
            ));
        }
        if self.list_capacity == 0 {
            return Err(TransferError::InvalidConfig(
                "list_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TransferConfig::default();
        assert_eq!(config.chunk_size, 1024);
        assert_eq!(config.transfer_capacity, 10);
        assert_eq!(config.list_capacity, 100);
        assert_eq!(config.storage_dir, PathBuf::from("./uploads"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_limits_rejected() {
        let config = TransferConfig {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(TransferError::InvalidConfig(_))));

        let config = TransferConfig {
            transfer_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TransferConfig {
            list_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
