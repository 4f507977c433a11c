//! Download sender.

use std::io;

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::{FileStore, TransferError, validate_filename};

/// Split `reader` into chunks of exactly `chunk_size` bytes, the last one
/// possibly shorter. An empty reader yields no chunks.
///
/// Short reads from the underlying reader are coalesced, so chunk boundaries
/// depend only on the byte count. A `chunk_size` of zero is treated as one.
pub fn chunk_stream<R>(mut reader: R, chunk_size: usize) -> impl Stream<Item = io::Result<Bytes>>
where
    R: AsyncRead + Unpin,
{
    let chunk_size = chunk_size.max(1);
    async_stream::try_stream! {
        loop {
            let mut buf = BytesMut::zeroed(chunk_size);
            let filled = read_full(&mut reader, &mut buf).await?;
            if filled == 0 {
                break;
            }

            buf.truncate(filled);
            yield buf.freeze();

            if filled < chunk_size {
                break;
            }
        }
    }
}

/// Read until `buf` is full or the reader is exhausted.
async fn read_full<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while let Some(rest) = buf.get_mut(filled..).filter(|rest| !rest.is_empty()) {
        match reader.read(rest).await? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Server side of one download session.
#[derive(Debug)]
pub struct DownloadSender<R> {
    name: String,
    source: R,
    chunk_size: usize,
}

impl<R: AsyncRead + Unpin> DownloadSender<R> {
    /// Open `name` in `store`.
    ///
    /// Fails before anything is streamed if the name is invalid, the file
    /// is missing, or `chunk_size` is zero.
    pub async fn open<S>(store: &S, name: &str, chunk_size: usize) -> Result<Self, TransferError>
    where
        S: FileStore<Source = R>,
    {
        if chunk_size == 0 {
            return Err(TransferError::InvalidConfig(
                "chunk_size must be at least 1".into(),
            ));
        }
        validate_filename(name)?;
        let source = store.open(name).await?;
        debug!(filename = %name, chunk_size, "Download source opened");
        Ok(Self {
            name: name.to_owned(),
            source,
            chunk_size,
        })
    }

    /// Name of the file being sent.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stream the file as chunks; a read failure is the last item.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, TransferError>> {
        let Self { name, source, chunk_size } = self;
        chunk_stream(source, chunk_size)
            .map(move |chunk| chunk.map_err(|e| TransferError::io("read", name.as_str(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DirStore;
    use futures::TryStreamExt;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tempfile::TempDir;
    use tokio::io::ReadBuf;

    async fn collect(data: &[u8], chunk_size: usize) -> Vec<Bytes> {
        chunk_stream(data, chunk_size).try_collect().await.unwrap()
    }

    #[tokio::test]
    async fn test_chunk_sizes() {
        assert!(collect(b"", 4).await.is_empty());

        let chunks = collect(b"abc", 4).await;
        assert_eq!(chunks, [Bytes::from_static(b"abc")]);

        let chunks = collect(b"abcd", 4).await;
        assert_eq!(chunks, [Bytes::from_static(b"abcd")]);

        let chunks = collect(b"abcdefghij", 4).await;
        assert_eq!(
            chunks,
            [
                Bytes::from_static(b"abcd"),
                Bytes::from_static(b"efgh"),
                Bytes::from_static(b"ij")
            ]
        );

        let chunks = collect(b"abcdefgh", 4).await;
        assert_eq!(chunks.len(), 2);
    }

    #[tokio::test]
    async fn test_zero_chunk_size_keeps_data() {
        let chunks = collect(b"hey", 0).await;
        assert_eq!(
            chunks,
            [
                Bytes::from_static(b"h"),
                Bytes::from_static(b"e"),
                Bytes::from_static(b"y")
            ]
        );
    }

    /// Reader handing out at most one byte per read.
    struct Trickle(Vec<u8>);

    impl AsyncRead for Trickle {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if !self.0.is_empty() {
                let byte = self.0.remove(0);
                buf.put_slice(&[byte]);
            }
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_short_reads_coalesced() {
        let chunks: Vec<Bytes> = chunk_stream(Trickle(b"hello world".to_vec()), 5)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(
            chunks,
            [
                Bytes::from_static(b"hello"),
                Bytes::from_static(b" worl"),
                Bytes::from_static(b"d")
            ]
        );
    }

    /// Reader failing after its first chunk.
    struct FailAfter(Option<Vec<u8>>);

    impl AsyncRead for FailAfter {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            match self.0.take() {
                Some(data) => {
                    buf.put_slice(&data);
                    Poll::Ready(Ok(()))
                }
                None => Poll::Ready(Err(io::Error::other("bad sector"))),
            }
        }
    }

    #[tokio::test]
    async fn test_read_failure_ends_stream() {
        let sender = DownloadSender {
            name: "f".to_owned(),
            source: FailAfter(Some(b"ab".to_vec())),
            chunk_size: 2,
        };
        let items: Vec<_> = sender.into_stream().collect().await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), &Bytes::from_static(b"ab"));
        assert!(matches!(&items[1], Err(TransferError::Io { action: "read", .. })));
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = DirStore::init(temp_dir.path()).await.unwrap();

        let err = DownloadSender::open(&store, "nope", 1024).await.unwrap_err();
        assert!(matches!(err, TransferError::NotFound(_)));

        let err = DownloadSender::open(&store, "../nope", 1024).await.unwrap_err();
        assert!(matches!(err, TransferError::InvalidFilename { .. }));
    }

    #[tokio::test]
    async fn test_open_rejects_zero_chunk_size() {
        let temp_dir = TempDir::new().unwrap();
        let store = DirStore::init(temp_dir.path()).await.unwrap();
        std::fs::write(temp_dir.path().join("f"), b"hello").unwrap();

        let err = DownloadSender::open(&store, "f", 0).await.unwrap_err();
        assert!(matches!(err, TransferError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_stream_stored_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = DirStore::init(temp_dir.path()).await.unwrap();
        let content: Vec<u8> = (0..2500u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(temp_dir.path().join("blob"), &content).unwrap();

        let sender = DownloadSender::open(&store, "blob", 1024).await.unwrap();
        assert_eq!(sender.name(), "blob");

        let chunks: Vec<Bytes> = sender.into_stream().try_collect().await.unwrap();
        let sizes: Vec<usize> = chunks.iter().map(Bytes::len).collect();
        assert_eq!(sizes, [1024, 1024, 452]);
        assert_eq!(chunks.concat(), content);
    }
}
