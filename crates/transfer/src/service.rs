//! Admission-controlled transfer operations.

use std::fmt::Display;
use std::pin::{Pin, pin};
use std::sync::Arc;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::metrics::TransferMetrics;
use crate::{
    AdmissionGate, DownloadSender, FileRecord, FileStore, Pool, TransferConfig, TransferError,
    TransferFrame, UploadOutcome, list_records, receive_upload,
};

/// Outbound chunk stream of a download.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransferError>> + Send>>;

/// Upload, download and listing behind one [`AdmissionGate`].
///
/// Every operation holds its admission ticket for the whole call: an upload
/// until its response, a download until its stream ends or is dropped.
pub struct TransferService<S> {
    store: Arc<S>,
    gate: AdmissionGate,
    chunk_size: usize,
    metrics: TransferMetrics,
}

impl<S> Clone for TransferService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            gate: self.gate.clone(),
            chunk_size: self.chunk_size,
            metrics: self.metrics.clone(),
        }
    }
}

impl<S> std::fmt::Debug for TransferService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferService")
            .field("gate", &self.gate)
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

impl<S: FileStore> TransferService<S> {
    /// Create a service over `store` using the limits in `config`.
    pub fn new(store: S, config: &TransferConfig) -> Result<Self, TransferError> {
        config.validate()?;
        Ok(Self {
            store: Arc::new(store),
            gate: AdmissionGate::new(config.transfer_capacity, config.list_capacity),
            chunk_size: config.chunk_size,
            metrics: TransferMetrics::default(),
        })
    }

    /// Admission gate shared by all calls.
    pub const fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// Backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Size of outbound chunks.
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Receive one upload from `frames`.
    pub async fn upload<St, E>(&self, frames: St) -> Result<UploadOutcome, TransferError>
    where
        St: Stream<Item = Result<Option<TransferFrame>, E>>,
        E: Display,
    {
        let _ticket = self.gate.acquire(Pool::Transfer).await?;
        let _active = self.metrics.track_active(Pool::Transfer);

        match receive_upload(&*self.store, frames).await {
            Ok(outcome) => {
                self.metrics.uploads_total.increment(1);
                self.metrics.bytes_received_total.increment(outcome.bytes_written);
                info!(
                    filename = outcome.filename.as_deref().unwrap_or_default(),
                    bytes = outcome.bytes_written,
                    "Upload complete"
                );
                Ok(outcome)
            }
            Err(e) => {
                self.metrics.failed_uploads_total.increment(1);
                warn!(error = %e, "Upload failed");
                Err(e)
            }
        }
    }

    /// Open `name` and stream it in chunks.
    ///
    /// Missing or invalid names fail here, before any chunk is produced.
    pub async fn download(&self, name: &str) -> Result<ChunkStream, TransferError> {
        let ticket = self.gate.acquire(Pool::Transfer).await?;
        let active = self.metrics.track_active(Pool::Transfer);

        let sender = DownloadSender::open(&*self.store, name, self.chunk_size).await?;
        self.metrics.downloads_total.increment(1);

        let bytes_sent = self.metrics.bytes_sent_total.clone();
        let filename = name.to_owned();
        let chunks = sender.into_stream();

        Ok(Box::pin(async_stream::stream! {
            let _ticket = ticket;
            let _active = active;
            let mut chunks = pin!(chunks);
            let mut sent = 0u64;

            while let Some(chunk) = chunks.next().await {
                match &chunk {
                    Ok(data) => {
                        sent += data.len() as u64;
                        bytes_sent.increment(data.len() as u64);
                    }
                    Err(e) => warn!(%filename, error = %e, "Download aborted"),
                }
                yield chunk;
            }

            debug!(%filename, bytes = sent, "Download stream finished");
        }))
    }

    /// List every stored file.
    pub async fn list(&self) -> Result<Vec<FileRecord>, TransferError> {
        let _ticket = self.gate.acquire(Pool::List).await?;
        let _active = self.metrics.track_active(Pool::List);

        let records = list_records(&*self.store).await?;
        self.metrics.listings_total.increment(1);
        debug!(count = records.len(), "Listed files");
        Ok(records)
    }
}
