//! Client driver for the Stash file service.
//!
//! [`FileClient`] frames uploads from a reader or local file, writes download
//! streams into a writer or local file, and fetches listings.

mod error;

use std::path::Path;
use std::pin::pin;

use futures::StreamExt;
use stash_rpc_proto::file::{
    DownloadRequest, DownloadResponse, FileInfo, ListFilesRequest, UploadRequest, UploadResponse,
    file_service_client::FileServiceClient,
};
use stash_transfer::{DEFAULT_CHUNK_SIZE, TransferFrame, chunk_stream};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::Streaming;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, warn};

pub use error::ClientError;

/// Default server address.
pub const DEFAULT_SERVER_ADDR: &str = "http://127.0.0.1:50051";

/// Frames buffered between the local reader and the upload call.
const UPLOAD_BUFFER: usize = 16;

/// Connection to a Stash server.
#[derive(Debug, Clone)]
pub struct FileClient {
    inner: FileServiceClient<Channel>,
    chunk_size: usize,
}

impl FileClient {
    /// Connect to the server at `addr` (e.g. `http://127.0.0.1:50051`).
    pub async fn connect(addr: impl Into<String>) -> Result<Self, ClientError> {
        let channel = Endpoint::from_shared(addr.into())?.connect().await?;
        Ok(Self::new(channel))
    }

    /// Use an existing channel.
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: FileServiceClient::new(channel),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the upload chunk size. Zero is treated as one byte.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Upload chunk size.
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Upload everything `reader` yields under `name`.
    ///
    /// A local read failure cancels the call; the server keeps whatever it had
    /// already written.
    pub async fn upload<R>(&self, name: &str, reader: R) -> Result<UploadResponse, ClientError>
    where
        R: AsyncRead + Unpin,
    {
        let (tx, rx) = mpsc::channel::<UploadRequest>(UPLOAD_BUFFER);

        let mut inner = self.inner.clone();
        let call = async move {
            let response = inner.upload_file(ReceiverStream::new(rx)).await?;
            Ok::<_, ClientError>(response.into_inner())
        };

        let announce = TransferFrame::announce(name);
        let chunk_size = self.chunk_size;
        let feed = async move {
            if tx.send(announce.into()).await.is_err() {
                return Ok(());
            }

            let mut chunks = pin!(chunk_stream(reader, chunk_size));
            while let Some(chunk) = chunks.next().await {
                let chunk = chunk.map_err(ClientError::Read)?;
                // The call ended early; its result carries the reason.
                if tx.send(TransferFrame::Chunk(chunk).into()).await.is_err() {
                    break;
                }
            }
            Ok::<_, ClientError>(())
        };

        let (response, ()) = tokio::try_join!(call, feed)?;
        debug!(%name, message = %response.message, "Upload acknowledged");
        Ok(response)
    }

    /// Upload the local file at `path` under its base name.
    pub async fn upload_file(&self, path: &Path) -> Result<UploadResponse, ClientError> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ClientError::InvalidPath(path.to_path_buf()))?;

        let file = fs::File::open(path).await.map_err(ClientError::Read)?;
        self.upload(name, file).await
    }

    async fn open_download(&self, name: &str) -> Result<Streaming<DownloadResponse>, ClientError> {
        let request = DownloadRequest { filename: name.to_owned() };
        Ok(self.inner.clone().download_file(request).await?.into_inner())
    }

    /// Download `name` into `writer`, returning the number of bytes written.
    pub async fn download<W>(&self, name: &str, writer: &mut W) -> Result<u64, ClientError>
    where
        W: AsyncWrite + Unpin,
    {
        let stream = self.open_download(name).await?;
        write_chunks(stream, writer).await
    }

    /// Download `name` into the local file `dest`.
    ///
    /// The file is created only once the server accepted the request, and is
    /// removed again if the stream fails part way.
    pub async fn download_file(&self, name: &str, dest: &Path) -> Result<u64, ClientError> {
        let stream = self.open_download(name).await?;
        let mut file = fs::File::create(dest).await.map_err(ClientError::Write)?;

        match write_chunks(stream, &mut file).await {
            Ok(written) => Ok(written),
            Err(e) => {
                drop(file);
                if let Err(remove) = fs::remove_file(dest).await {
                    warn!(
                        path = %dest.display(),
                        error = %remove,
                        "Failed to remove partial download"
                    );
                }
                Err(e)
            }
        }
    }

    /// List the files held by the server.
    pub async fn list(&self) -> Result<Vec<FileInfo>, ClientError> {
        let response = self.inner.clone().list_files(ListFilesRequest {}).await?;
        Ok(response.into_inner().files)
    }
}

async fn write_chunks<W>(
    mut stream: Streaming<DownloadResponse>,
    writer: &mut W,
) -> Result<u64, ClientError>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0u64;
    while let Some(response) = stream.message().await? {
        writer.write_all(&response.chunk_data).await.map_err(ClientError::Write)?;
        written += response.chunk_data.len() as u64;
    }
    writer.flush().await.map_err(ClientError::Write)?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn lazy_client() -> FileClient {
        let channel = Endpoint::from_static("http://127.0.0.1:1").connect_lazy();
        FileClient::new(channel)
    }

    #[tokio::test]
    async fn test_chunk_size_floor() {
        let client = lazy_client();
        assert_eq!(client.chunk_size(), DEFAULT_CHUNK_SIZE);
        assert_eq!(client.with_chunk_size(0).chunk_size(), 1);
    }

    #[tokio::test]
    async fn test_upload_path_without_name() {
        let client = lazy_client();
        let err = client.upload_file(Path::new("/")).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidPath(path) if path == PathBuf::from("/")));
    }

    #[tokio::test]
    async fn test_upload_missing_local_file() {
        let client = lazy_client();
        let temp_dir = tempfile::TempDir::new().unwrap();

        let err = client
            .upload_file(&temp_dir.path().join("absent"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Read(_)));
    }
}
