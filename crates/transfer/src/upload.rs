//! Upload receiver.
//!
//! Rebuilds a file from an inbound frame stream. The receiver starts out
//! waiting for a filename; the announcement opens the sink, after which every
//! chunk is appended in arrival order. Ending the stream closes the sink.
//!
//! Nothing is rolled back on failure: a session that errors half way leaves a
//! truncated file under the announced name.

use std::fmt::Display;
use std::pin::pin;

use futures::{Stream, StreamExt};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::{FileStore, TransferError, TransferFrame, validate_filename};

/// Result of a completed upload session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Announced filename, if the peer sent one.
    pub filename: Option<String>,
    /// Bytes written to the sink.
    pub bytes_written: u64,
}

impl UploadOutcome {
    /// Human-readable acknowledgement for the peer.
    pub const fn message(&self) -> &'static str {
        match self.filename {
            Some(_) => "File uploaded successfully",
            None => "no file announced",
        }
    }
}

enum State<W> {
    AwaitingName,
    Receiving { name: String, sink: W },
}

/// Server side of one upload session.
pub struct UploadReceiver<'a, S: FileStore> {
    store: &'a S,
    state: State<S::Sink>,
    bytes_written: u64,
}

impl<'a, S: FileStore> UploadReceiver<'a, S> {
    /// Start a session writing into `store`.
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            state: State::AwaitingName,
            bytes_written: 0,
        }
    }

    /// Announced filename, once received.
    pub fn filename(&self) -> Option<&str> {
        match &self.state {
            State::AwaitingName => None,
            State::Receiving { name, .. } => Some(name),
        }
    }

    /// Bytes written so far.
    pub const fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Apply one inbound frame.
    ///
    /// `None` stands for a message without a populated frame and is ignored,
    /// as is an empty chunk before the filename.
    pub async fn receive(&mut self, frame: Option<TransferFrame>) -> Result<(), TransferError> {
        let Some(frame) = frame else {
            return Ok(());
        };

        match frame {
            TransferFrame::Announce(name) => {
                if matches!(self.state, State::Receiving { .. }) {
                    return Err(TransferError::ProtocolViolation("filename already announced"));
                }
                validate_filename(&name)?;

                let sink = self.store.create(&name).await?;
                debug!(filename = %name, "Upload sink opened");
                self.state = State::Receiving { name, sink };
            }
            TransferFrame::Chunk(data) => {
                let State::Receiving { name, sink } = &mut self.state else {
                    if data.is_empty() {
                        return Ok(());
                    }
                    return Err(TransferError::ProtocolViolation(
                        "filename not provided before chunk data",
                    ));
                };

                if !data.is_empty() {
                    sink.write_all(&data)
                        .await
                        .map_err(|e| TransferError::io("write", name.as_str(), e))?;
                    self.bytes_written += data.len() as u64;
                }
            }
        }

        Ok(())
    }

    /// End of stream: flush and close the sink.
    pub async fn finish(self) -> Result<UploadOutcome, TransferError> {
        let filename = match self.state {
            State::AwaitingName => None,
            State::Receiving { name, mut sink } => {
                sink.shutdown()
                    .await
                    .map_err(|e| TransferError::io("close", name.as_str(), e))?;
                Some(name)
            }
        };

        Ok(UploadOutcome {
            filename,
            bytes_written: self.bytes_written,
        })
    }
}

/// Drive a whole upload session from an inbound stream.
///
/// Each item is either a decoded frame (`None` for an untagged message) or a
/// transport error, which ends the session with [`TransferError::Transport`].
pub async fn receive_upload<S, St, E>(
    store: &S,
    frames: St,
) -> Result<UploadOutcome, TransferError>
where
    S: FileStore,
    St: Stream<Item = Result<Option<TransferFrame>, E>>,
    E: Display,
{
    let mut frames = pin!(frames);
    let mut receiver = UploadReceiver::new(store);

    while let Some(frame) = frames.next().await {
        let frame = frame.map_err(|e| TransferError::Transport(e.to_string()))?;
        receiver.receive(frame).await?;
    }

    receiver.finish().await
}
