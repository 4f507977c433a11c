//! Client errors.

use std::io;
use std::path::PathBuf;

/// Errors raised by [`FileClient`](crate::FileClient).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Connecting to the server failed.
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// The server rejected or aborted the call.
    #[error("{}: {}", .0.code(), .0.message())]
    Status(#[from] tonic::Status),

    /// Reading the local source failed.
    #[error("failed to read local file: {0}")]
    Read(#[source] io::Error),

    /// Writing the local destination failed.
    #[error("failed to write local file: {0}")]
    Write(#[source] io::Error),

    /// The local path has no usable file name.
    #[error("path {0:?} has no file name")]
    InvalidPath(PathBuf),
}

impl ClientError {
    /// gRPC status code, if the server produced this error.
    pub fn code(&self) -> Option<tonic::Code> {
        match self {
            Self::Status(status) => Some(status.code()),
            _ => None,
        }
    }
}
