//! Streaming transfer core for Stash.
//!
//! This crate holds everything between the wire and the disk:
//!
//! - [`TransferFrame`] - the two-variant frame a file travels in
//! - [`AdmissionGate`] - bounded pools for transfers and listings
//! - [`UploadReceiver`] - rebuilds a file from an inbound frame stream
//! - [`DownloadSender`] - splits a stored file into fixed-size chunks
//! - [`FileRecord`] - listing projection of a stored file
//! - [`FileStore`] / [`DirStore`] - the storage seam and its directory backend
//!
//! [`TransferService`] ties these together with one admission ticket per call.
//!
//! # Usage
//!
//! ```ignore
//! use stash_transfer::{DirStore, TransferConfig, TransferService};
//!
//! let config = TransferConfig::default();
//! let store = DirStore::init(&config.storage_dir).await?;
//! let service = TransferService::new(store, &config)?;
//! let records = service.list().await?;
//! ```

mod config;
mod download;
mod error;
mod frame;
mod gate;
mod listing;
mod metrics;
mod service;
mod store;
mod upload;

pub use config::{
    DEFAULT_CHUNK_SIZE, DEFAULT_LIST_CAPACITY, DEFAULT_STORAGE_DIR, DEFAULT_TRANSFER_CAPACITY,
    TransferConfig,
};
pub use download::{DownloadSender, chunk_stream};
pub use error::TransferError;
pub use frame::TransferFrame;
pub use gate::{AdmissionGate, AdmissionTicket, Pool};
pub use listing::{FileRecord, list_records};
pub use service::{ChunkStream, TransferService};
pub use store::{DirStore, FileStore, StoredEntry, validate_filename};
pub use upload::{UploadOutcome, UploadReceiver, receive_upload};
