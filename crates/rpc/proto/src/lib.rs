//! gRPC schema for the Stash file service.
//!
//! Generated tonic/prost types live in [`file`]. This crate also maps the wire
//! messages onto [`TransferFrame`] so both ends speak the same frame type.

use bytes::Bytes;
use stash_transfer::{FileRecord, TransferFrame};

pub mod file {
    tonic::include_proto!("stash.file.v1");
}

/// File descriptor set for gRPC reflection.
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("stash_descriptor");

use file::{DownloadResponse, FileInfo, UploadRequest, upload_request::Data};

impl From<TransferFrame> for UploadRequest {
    fn from(frame: TransferFrame) -> Self {
        let data = match frame {
            TransferFrame::Announce(name) => Data::Filename(name),
            TransferFrame::Chunk(bytes) => Data::ChunkData(bytes),
        };
        Self { data: Some(data) }
    }
}

impl UploadRequest {
    /// Decode into a frame. A message without a populated field yields `None`.
    pub fn into_frame(self) -> Option<TransferFrame> {
        self.data.map(|data| match data {
            Data::Filename(name) => TransferFrame::Announce(name),
            Data::ChunkData(bytes) => TransferFrame::Chunk(bytes),
        })
    }
}

impl From<Bytes> for DownloadResponse {
    fn from(chunk_data: Bytes) -> Self {
        Self { chunk_data }
    }
}

impl From<FileRecord> for FileInfo {
    fn from(record: FileRecord) -> Self {
        Self {
            created_at: record.created_at_rfc3339(),
            updated_at: record.updated_at_rfc3339(),
            filename: record.name,
        }
    }
}
