//! Mapping of transfer errors onto gRPC status codes.

use stash_transfer::TransferError;
use tonic::Status;

/// Convert a transfer error into the status reported to the caller.
///
/// | error | code |
/// |---|---|
/// | protocol violation, invalid filename | `INVALID_ARGUMENT` |
/// | missing file | `NOT_FOUND` |
/// | inbound stream failure | `UNKNOWN` |
/// | I/O and everything else | `INTERNAL` |
pub(crate) fn transfer_status(err: TransferError) -> Status {
    match &err {
        TransferError::ProtocolViolation(_) | TransferError::InvalidFilename { .. } => {
            Status::invalid_argument(err.to_string())
        }
        TransferError::NotFound(_) => Status::not_found(err.to_string()),
        TransferError::Transport(_) => Status::unknown(err.to_string()),
        TransferError::Io { .. }
        | TransferError::Listing(_)
        | TransferError::GateClosed
        | TransferError::InvalidConfig(_) => Status::internal(err.to_string()),
    }
}
