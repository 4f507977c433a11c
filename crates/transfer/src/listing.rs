//! Listing responder.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{FileStore, StoredEntry, TransferError};

/// Read-only view of a stored file.
///
/// The store only tracks modification time, so `created_at` carries the same
/// instant as `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// File name within the store.
    pub name: String,
    /// Creation time (modification time, see above).
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl FileRecord {
    /// `created_at` as an RFC 3339 string.
    pub fn created_at_rfc3339(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// `updated_at` as an RFC 3339 string.
    pub fn updated_at_rfc3339(&self) -> String {
        self.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl From<StoredEntry> for FileRecord {
    fn from(entry: StoredEntry) -> Self {
        let modified = DateTime::<Utc>::from(entry.modified);
        Self {
            name: entry.name,
            created_at: modified,
            updated_at: modified,
        }
    }
}

/// Project every stored file into a [`FileRecord`], in enumeration order.
pub async fn list_records<S: FileStore>(store: &S) -> Result<Vec<FileRecord>, TransferError> {
    let entries = store.entries().await?;
    Ok(entries.into_iter().map(FileRecord::from).collect())
}
