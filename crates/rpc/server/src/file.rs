//! File service implementation.

use std::pin::Pin;

use futures::{Stream, StreamExt, TryStreamExt};
use stash_rpc_proto::file::{
    DownloadRequest, DownloadResponse, FileInfo, ListFilesRequest, ListFilesResponse,
    UploadRequest, UploadResponse, file_service_server::FileService,
};
use stash_transfer::{FileStore, TransferService};
use tonic::{Request, Response, Status, Streaming};
use tracing::debug;

use crate::status::transfer_status;

/// gRPC front of a [`TransferService`].
pub struct FileGrpcService<S> {
    transfers: TransferService<S>,
}

impl<S> FileGrpcService<S> {
    /// Serve `transfers` over gRPC.
    pub fn new(transfers: TransferService<S>) -> Self {
        Self { transfers }
    }
}

#[tonic::async_trait]
impl<S: FileStore> FileService for FileGrpcService<S> {
    async fn upload_file(
        &self,
        request: Request<Streaming<UploadRequest>>,
    ) -> Result<Response<UploadResponse>, Status> {
        debug!(peer = ?request.remote_addr(), "Upload started");

        let frames = request.into_inner().map_ok(UploadRequest::into_frame);
        let outcome = self
            .transfers
            .upload(frames)
            .await
            .map_err(transfer_status)?;

        Ok(Response::new(UploadResponse {
            success: true,
            message: outcome.message().to_owned(),
        }))
    }

    type DownloadFileStream =
        Pin<Box<dyn Stream<Item = Result<DownloadResponse, Status>> + Send>>;

    async fn download_file(
        &self,
        request: Request<DownloadRequest>,
    ) -> Result<Response<Self::DownloadFileStream>, Status> {
        let DownloadRequest { filename } = request.into_inner();
        debug!(%filename, "Download requested");

        let chunks = self
            .transfers
            .download(&filename)
            .await
            .map_err(transfer_status)?;
        let stream = chunks.map(|chunk| {
            chunk
                .map(DownloadResponse::from)
                .map_err(transfer_status)
        });

        Ok(Response::new(Box::pin(stream)))
    }

    async fn list_files(
        &self,
        _request: Request<ListFilesRequest>,
    ) -> Result<Response<ListFilesResponse>, Status> {
        let records = self.transfers.list().await.map_err(transfer_status)?;

        Ok(Response::new(ListFilesResponse {
            files: records.into_iter().map(FileInfo::from).collect(),
        }))
    }
}
