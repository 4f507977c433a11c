//! File store seam and its directory-backed implementation.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::TransferError;

/// A stored file as seen by an enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    /// File name within the store.
    pub name: String,
    /// Last modification time.
    pub modified: SystemTime,
}

/// Storage backend for transferred files.
///
/// Names handed to a store have already passed [`validate_filename`].
#[async_trait]
pub trait FileStore: Send + Sync + 'static {
    /// Write endpoint for an upload.
    type Sink: AsyncWrite + Unpin + Send + 'static;
    /// Read endpoint for a download.
    type Source: AsyncRead + Unpin + Send + 'static;

    /// Create (or truncate) `name` for writing.
    async fn create(&self, name: &str) -> Result<Self::Sink, TransferError>;

    /// Open `name` for reading, failing with [`TransferError::NotFound`] if absent.
    async fn open(&self, name: &str) -> Result<Self::Source, TransferError>;

    /// Enumerate stored files. Entries whose metadata cannot be read are skipped.
    async fn entries(&self) -> Result<Vec<StoredEntry>, TransferError>;
}

/// Check that `name` names a single file directly inside the store.
pub fn validate_filename(name: &str) -> Result<(), TransferError> {
    let reason = if name.is_empty() {
        Some("empty name")
    } else if name == "." || name == ".." {
        Some("relative path component")
    } else if name.contains(['/', '\\']) {
        Some("path separators are not allowed")
    } else if name.contains('\0') {
        Some("NUL byte")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(TransferError::InvalidFilename {
            name: name.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Store keeping each file as a plain file in one directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Use `root` as the store directory, creating it if missing.
    pub async fn init(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        debug!(root = %root.display(), "Opened file store");
        Ok(Self { root })
    }

    /// Store directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

#[async_trait]
impl FileStore for DirStore {
    type Sink = fs::File;
    type Source = fs::File;

    async fn create(&self, name: &str) -> Result<Self::Sink, TransferError> {
        fs::File::create(self.path(name))
            .await
            .map_err(|e| TransferError::io("create", name, e))
    }

    async fn open(&self, name: &str) -> Result<Self::Source, TransferError> {
        let file = match fs::File::open(self.path(name)).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(TransferError::NotFound(name.to_owned()));
            }
            Err(e) => return Err(TransferError::io("open", name, e)),
        };

        // Only regular files are stored entries, matching `entries`.
        let metadata = file
            .metadata()
            .await
            .map_err(|e| TransferError::io("open", name, e))?;
        if !metadata.is_file() {
            return Err(TransferError::NotFound(name.to_owned()));
        }
        Ok(file)
    }

    async fn entries(&self) -> Result<Vec<StoredEntry>, TransferError> {
        let mut dir = fs::read_dir(&self.root)
            .await
            .map_err(TransferError::Listing)?;
        let mut entries = Vec::new();

        loop {
            let entry = match dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => return Err(TransferError::Listing(e)),
            };

            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    debug!(name = ?raw, "Skipping entry with a non UTF-8 name");
                    continue;
                }
            };
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) => {
                    debug!(%name, error = %e, "Skipping entry with unreadable metadata");
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }
            let modified = match metadata.modified() {
                Ok(modified) => modified,
                Err(e) => {
                    debug!(%name, error = %e, "Skipping entry without modification time");
                    continue;
                }
            };

            entries.push(StoredEntry { name, modified });
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[test]
    fn test_validate_filename() {
        assert!(validate_filename("a.txt").is_ok());
        assert!(validate_filename(".hidden").is_ok());
        assert!(validate_filename("name with spaces").is_ok());

        for bad in ["", ".", "..", "../etc/passwd", "dir/file", "dir\\file", "nul\0byte"] {
            assert!(
                matches!(validate_filename(bad), Err(TransferError::InvalidFilename { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_open_creates_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("nested").join("store");

        let store = DirStore::init(&root).await.unwrap();
        assert!(root.is_dir());
        assert_eq!(store.root(), root.as_path());
    }

    #[tokio::test]
    async fn test_create_then_open() {
        let temp_dir = TempDir::new().unwrap();
        let store = DirStore::init(temp_dir.path()).await.unwrap();

        let mut sink = store.create("a.txt").await.unwrap();
        sink.write_all(b"hello").await.unwrap();
        sink.flush().await.unwrap();
        drop(sink);

        let mut source = store.open("a.txt").await.unwrap();
        let mut content = Vec::new();
        source.read_to_end(&mut content).await.unwrap();
        assert_eq!(content, b"hello");
    }

    #[tokio::test]
    async fn test_open_missing_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = DirStore::init(temp_dir.path()).await.unwrap();

        let err = store.open("missing.bin").await.unwrap_err();
        assert!(matches!(err, TransferError::NotFound(name) if name == "missing.bin"));
    }

    #[tokio::test]
    async fn test_entries_skip_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = DirStore::init(temp_dir.path()).await.unwrap();

        std::fs::write(temp_dir.path().join("one"), b"1").unwrap();
        std::fs::write(temp_dir.path().join("two"), b"22").unwrap();
        std::fs::create_dir(temp_dir.path().join("subdir")).unwrap();

        let mut names: Vec<_> = store
            .entries()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        names.sort();
        assert_eq!(names, ["one", "two"]);
    }

    #[tokio::test]
    async fn test_open_directory_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = DirStore::init(temp_dir.path()).await.unwrap();
        std::fs::create_dir(temp_dir.path().join("subdir")).unwrap();

        let err = store.open("subdir").await.unwrap_err();
        assert!(matches!(err, TransferError::NotFound(name) if name == "subdir"));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_entries_skip_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let store = DirStore::init(temp_dir.path()).await.unwrap();

        std::fs::write(temp_dir.path().join("plain"), b"1").unwrap();
        let bad_name = OsStr::from_bytes(b"bad\xff");
        std::fs::write(temp_dir.path().join(bad_name), b"2").unwrap();

        let entries = store.entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "plain");
    }

    #[tokio::test]
    async fn test_entries_missing_root_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = DirStore::init(temp_dir.path().join("store")).await.unwrap();
        std::fs::remove_dir(store.root()).unwrap();

        assert!(matches!(store.entries().await, Err(TransferError::Listing(_))));
    }
}
