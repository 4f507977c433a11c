//! Transfer frames.
//!
//! A file travels as one [`TransferFrame::Announce`] naming it, followed by any
//! number of [`TransferFrame::Chunk`] frames in file order. Downloads carry
//! chunks only; the end of the stream marks the end of the file.

use bytes::Bytes;

/// One message of a transfer stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferFrame {
    /// Names the file the following chunks belong to.
    Announce(String),
    /// Raw file bytes. May be empty, which writes nothing.
    Chunk(Bytes),
}

impl TransferFrame {
    /// Frame announcing `name`.
    pub fn announce(name: impl Into<String>) -> Self {
        Self::Announce(name.into())
    }

    /// Frame carrying `data`.
    pub fn chunk(data: impl Into<Bytes>) -> Self {
        Self::Chunk(data.into())
    }

    /// Whether this frame is a filename announcement.
    pub const fn is_announcement(&self) -> bool {
        matches!(self, Self::Announce(_))
    }

    /// Payload length; zero for announcements.
    pub fn len(&self) -> usize {
        match self {
            Self::Announce(_) => 0,
            Self::Chunk(data) => data.len(),
        }
    }

    /// Whether the frame carries no file bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_kinds() {
        let announce = TransferFrame::announce("a.txt");
        assert!(announce.is_announcement());
        assert!(announce.is_empty());

        let chunk = TransferFrame::chunk(&b"hello"[..]);
        assert!(!chunk.is_announcement());
        assert_eq!(chunk.len(), 5);

        assert!(TransferFrame::chunk(Bytes::new()).is_empty());
    }
}
