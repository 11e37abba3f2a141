//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::storage::{Document, Storage, StorageError, StorageErrorKind};

/// Mock storage for testing.
///
/// Stores documents and content in memory. Use the builder methods
/// to configure the mock with test data. Documents enumerate in insertion
/// order.
///
/// # Example
///
/// ```ignore
/// use splice_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("NoteA.md", "hello")
///     .with_binary("diagram.png");
///
/// let doc = storage.find_by_name("NoteA").unwrap().unwrap();
/// let content = storage.read(&doc).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    documents: Vec<Document>,
    contents: HashMap<PathBuf, String>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a textual document with content.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path: PathBuf = path.into();
        self.documents.push(Document::new(path.clone(), true));
        self.contents.insert(path, content.into());
        self
    }

    /// Add a non-textual document (e.g., an image attachment).
    #[must_use]
    pub fn with_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.documents.push(Document::new(path, false));
        self
    }

    /// Add a textual document that is listed by `scan()` but cannot be read.
    #[must_use]
    pub fn with_unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        self.documents.push(Document::new(path, true));
        self
    }

    /// Set creation and modification times for a previously added path.
    ///
    /// Times are seconds since Unix epoch.
    #[must_use]
    pub fn with_times(mut self, path: impl Into<PathBuf>, created: f64, modified: f64) -> Self {
        let path: PathBuf = path.into();
        for doc in self.documents.iter_mut().filter(|d| d.path == path) {
            doc.created = Some(created);
            doc.modified = Some(modified);
        }
        self
    }
}

impl Storage for MockStorage {
    fn scan(&self) -> Result<Vec<Document>, StorageError> {
        Ok(self.documents.clone())
    }

    fn read(&self, document: &Document) -> Result<String, StorageError> {
        self.contents.get(&document.path).cloned().ok_or_else(|| {
            StorageError::new(StorageErrorKind::NotFound)
                .with_path(&document.path)
                .with_backend("Mock")
        })
    }
}
