//! Transfer errors.

use std::io;

/// Errors raised while admitting, receiving, sending or listing files.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The peer broke the frame ordering rules.
    #[error("protocol violation: {0}")]
    ProtocolViolation(&'static str),

    /// The announced or requested filename cannot name a stored file.
    #[error("invalid filename {name:?}: {reason}")]
    InvalidFilename {
        /// Offending name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The requested file is not in the store.
    #[error("file not found: {0}")]
    NotFound(String),

    /// Opening, reading or writing a stored file failed.
    #[error("failed to {action} {name:?}: {source}")]
    Io {
        /// Operation that failed (`create`, `write`, ...).
        action: &'static str,
        /// File the operation targeted.
        name: String,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },

    /// Enumerating the store directory failed.
    #[error("failed to read store directory: {0}")]
    Listing(#[source] io::Error),

    /// The inbound stream itself failed.
    #[error("failed to receive data: {0}")]
    Transport(String),

    /// An admission pool was closed while waiting for a slot.
    #[error("admission gate closed")]
    GateClosed,

    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TransferError {
    pub(crate) fn io(
        action: &'static str,
        name: impl Into<String>,
        source: io::Error,
    ) -> Self {
        Self::Io {
            action,
            name: name.into(),
            source,
        }
    }
}
