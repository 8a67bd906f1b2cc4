//! Directory Source abstraction
//!
//! A source produces the complete, ordered entry list of one sync. Paging,
//! connection handling and authentication all happen behind this trait.

use async_trait::async_trait;
use std::path::Path;

use crate::entry::Entry;
use crate::error::{DirectoryError, DirectoryResult};

/// Collaborator that fetches directory entries.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    /// Get the display name for this source (for logs).
    fn display_name(&self) -> &str;

    /// Fetch every entry under the configured bases, in fetch order.
    ///
    /// Pages and search bases are concatenated into one list.
    async fn fetch_entries(&self) -> DirectoryResult<Vec<Entry>>;
}

/// A source backed by entries already in memory, such as an offline dump.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    name: String,
    entries: Vec<Entry>,
}

impl StaticSource {
    /// Create a source serving `entries`.
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            name: "static".to_string(),
            entries,
        }
    }

    /// Set the display name using builder pattern.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Parse a JSON array of entries.
    pub fn from_json(json: &str) -> DirectoryResult<Self> {
        let entries: Vec<Entry> =
            serde_json::from_str(json).map_err(|e| DirectoryError::InvalidData {
                message: format!("entry dump is not a JSON array of entries: {e}"),
            })?;
        Ok(Self::new(entries))
    }

    /// Read a JSON entry dump from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> DirectoryResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| DirectoryError::InvalidData {
            message: format!("cannot read entry dump {}: {e}", path.display()),
        })?;
        Ok(Self::from_json(&content)?.with_name(path.display().to_string()))
    }

    /// Number of entries served.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the source is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl DirectorySource for StaticSource {
    fn display_name(&self) -> &str {
        &self.name
    }

    async fn fetch_entries(&self) -> DirectoryResult<Vec<Entry>> {
        Ok(self.entries.clone())
    }
}
