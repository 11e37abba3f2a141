//! Storage trait and error types.
//!
//! Provides the core [`Storage`] trait for document lookup and retrieval,
//! along with [`StorageError`] for unified error handling across backends.
//!
//! # Name Convention
//!
//! Documents are addressed the way a note-taking vault addresses them:
//! - `"NoteA"` - file stem, extension omitted
//! - `"NoteA.md"` - file name
//! - `"projects/NoteA"` - path relative to the storage root, extension omitted
//! - `"projects/NoteA.md"` - full relative path

use std::path::{Path, PathBuf};

/// Document known to a storage backend.
///
/// Holds identity and ordering information only; content is fetched through
/// [`Storage::read`].
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Path relative to the storage root (e.g., "projects/Proj-Alpha.md").
    pub path: PathBuf,
    /// File name including extension (e.g., "Proj-Alpha.md").
    pub name: String,
    /// True if the document holds embeddable markdown text.
    pub textual: bool,
    /// Creation time as seconds since Unix epoch, if known.
    pub created: Option<f64>,
    /// Modification time as seconds since Unix epoch, if known.
    pub modified: Option<f64>,
}

impl Document {
    /// Create a document from its relative path.
    ///
    /// The name is derived from the last path component.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, textual: bool) -> Self {
        let path: PathBuf = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            name,
            textual,
            created: None,
            modified: None,
        }
    }

    /// Attach creation and modification times.
    #[must_use]
    pub fn with_times(mut self, created: Option<f64>, modified: Option<f64>) -> Self {
        self.created = created;
        self.modified = modified;
        self
    }

    /// Check whether the document holds embeddable text.
    #[must_use]
    pub fn is_textual(&self) -> bool {
        self.textual
    }

    /// File name without extension.
    #[must_use]
    pub fn stem(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map_or(self.name.as_str(), |(stem, _)| stem)
    }

    /// Relative path with `/` separators and without extension.
    fn path_without_extension(&self) -> String {
        let path = slash_path(&self.path);
        match path.rsplit_once('.') {
            Some((base, ext)) if !ext.contains('/') => base.to_owned(),
            _ => path,
        }
    }

    /// Rank how well `name` addresses this document.
    ///
    /// Lower is better: full path, path without extension, file name, stem.
    /// Returns `None` when the name does not address the document at all.
    #[must_use]
    pub fn match_rank(&self, name: &str) -> Option<u8> {
        if slash_path(&self.path) == name {
            Some(0)
        } else if self.path_without_extension() == name {
            Some(1)
        } else if self.name == name {
            Some(2)
        } else if self.stem() == name {
            Some(3)
        } else {
            None
        }
    }
}

/// Render a relative path with forward slashes.
fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Resource does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Invalid path, name or prefix.
    InvalidPath,
    /// Operation timed out.
    Timeout,
    /// Other/unknown error category.
    Other,
}

/// Storage error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StorageError {
    /// Semantic error category.
    pub kind: StorageErrorKind,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Create an error for a blank prefix lookup.
    #[must_use]
    pub fn empty_prefix() -> Self {
        Self::new(StorageErrorKind::InvalidPath).with_source(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "prefix cannot be empty",
        ))
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            std::io::ErrorKind::TimedOut => StorageErrorKind::Timeout,
            _ => StorageErrorKind::Other,
        };
        let mut error = Self::new(kind).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::PermissionDenied => "Permission denied",
            StorageErrorKind::InvalidPath => "Invalid path",
            StorageErrorKind::Timeout => "Timeout",
            StorageErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Storage abstraction for document lookup and retrieval.
///
/// Backends implement [`scan`](Self::scan) and [`read`](Self::read); the
/// lookups used by the embed engine have default implementations over the
/// scan result. Backends with an index of their own can override them.
///
/// The engine treats storage as read-only and may call it from several
/// threads at once.
pub trait Storage: Send + Sync {
    /// Return all documents, in the backend's natural enumeration order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if scanning fails (e.g., permission denied).
    fn scan(&self) -> Result<Vec<Document>, StorageError>;

    /// Read full content of a document.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the document doesn't exist or can't be read.
    fn read(&self, document: &Document) -> Result<String, StorageError>;

    /// Find the document addressed by `name`.
    ///
    /// Any document kind can be returned; callers check
    /// [`Document::is_textual`]. When several documents match, the best
    /// [`Document::match_rank`] wins and ties go to enumeration order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if scanning fails.
    fn find_by_name(&self, name: &str) -> Result<Option<Document>, StorageError> {
        let found = self
            .scan()?
            .into_iter()
            .filter_map(|doc| doc.match_rank(name).map(|rank| (rank, doc)))
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, doc)| doc);

        tracing::debug!(query = name, found = found.is_some(), "Looked up document by name");
        Ok(found)
    }

    /// Find all textual documents whose file name starts with `prefix`.
    ///
    /// Matching is case-sensitive; results keep enumeration order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::InvalidPath`] for a blank prefix, or any
    /// error from scanning.
    fn find_by_prefix(&self, prefix: &str) -> Result<Vec<Document>, StorageError> {
        if prefix.trim().is_empty() {
            return Err(StorageError::empty_prefix());
        }

        let documents: Vec<Document> = self
            .scan()?
            .into_iter()
            .filter(|doc| doc.is_textual() && doc.name.starts_with(prefix))
            .collect();

        tracing::debug!(prefix, count = documents.len(), "Looked up documents by prefix");
        Ok(documents)
    }
}
