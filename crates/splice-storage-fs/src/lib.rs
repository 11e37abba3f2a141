//! Filesystem storage implementation for Splice embed resolution.
//!
//! This crate provides [`FsStorage`], a filesystem-based implementation of the
//! [`Storage`](splice_storage::Storage) trait. It handles:
//!
//! - Recursive directory scanning of a vault directory
//! - Classifying files as textual by extension
//! - Caching the scan so repeated lookups during one run stay cheap
//! - Rejecting paths that escape the vault
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use splice_storage::Storage;
//! use splice_storage_fs::FsStorage;
//!
//! let storage = FsStorage::new(PathBuf::from("vault"));
//! if let Some(doc) = storage.find_by_name("NoteA")? {
//!     println!("{}", storage.read(&doc)?);
//! }
//! ```

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use splice_storage::{Document, Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Directories that never hold notes.
const SKIPPED_DIRS: &[&str] = &["node_modules", "target", "dist", "build", "vendor", "__pycache__"];

/// Convert a filesystem timestamp to seconds since Unix epoch.
fn epoch_seconds(time: std::io::Result<SystemTime>) -> Option<f64> {
    time.ok()?
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs_f64())
}

/// Filesystem storage implementation.
///
/// Scans a vault directory recursively. Every regular file becomes a
/// [`Document`]; files whose extension is in the textual set are marked
/// embeddable. The scan result is cached until [`invalidate`](Self::invalidate)
/// is called.
pub struct FsStorage {
    /// Root directory of the vault.
    source_dir: PathBuf,
    /// Lowercased extensions (without dot) of textual documents.
    extensions: Vec<String>,
    /// Cached scan result.
    index: Mutex<Option<Arc<Vec<Document>>>>,
}

impl FsStorage {
    /// Create a new filesystem storage treating `.md` files as textual.
    #[must_use]
    pub fn new(source_dir: PathBuf) -> Self {
        Self::with_extensions(source_dir, vec!["md".to_owned()])
    }

    /// Create a new filesystem storage with a custom textual extension set.
    ///
    /// Extensions are matched case-insensitively and may be given with or
    /// without a leading dot.
    #[must_use]
    pub fn with_extensions(source_dir: PathBuf, extensions: Vec<String>) -> Self {
        let extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();

        Self {
            source_dir,
            extensions,
            index: Mutex::new(None),
        }
    }

    /// Drop the cached scan so the next lookup re-reads the directory tree.
    pub fn invalidate(&self) {
        *self.index.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Validate that a path doesn't escape the source directory.
    ///
    /// Rejects absolute paths and paths containing parent directory
    /// components (`..`).
    fn validate_path(path: &Path) -> Result<(), StorageError> {
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        if escapes {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }
        Ok(())
    }

    fn is_textual(&self, path: &Path) -> bool {
        path.extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .is_some_and(|e| self.extensions.contains(&e))
    }

    /// Scan directory recursively and collect documents.
    fn scan_directory(&self, dir_path: &Path, base_path: &Path, documents: &mut Vec<Document>) {
        let Ok(entries) = fs::read_dir(dir_path) else {
            return;
        };

        // Collect entries with cached file_type to avoid repeated stat calls in sort.
        let mut entries: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|e| {
                let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
                let name_lower = e.file_name().to_string_lossy().to_lowercase();
                (e, is_dir, name_lower)
            })
            .collect();

        // Sort: directories first, then alphabetical by name
        entries.sort_by(|(_, a_is_dir, a_name), (_, b_is_dir, b_name)| {
            b_is_dir.cmp(a_is_dir).then_with(|| a_name.cmp(b_name))
        });

        for (entry, is_dir, name_lower) in entries {
            if name_lower.starts_with('.') {
                continue;
            }
            if is_dir && SKIPPED_DIRS.contains(&name_lower.as_str()) {
                continue;
            }

            let rel_path = base_path.join(entry.file_name());
            if is_dir {
                self.scan_directory(&entry.path(), &rel_path, documents);
                continue;
            }

            let metadata = entry.metadata().ok();
            let created = metadata.as_ref().and_then(|m| epoch_seconds(m.created()));
            let modified = metadata.as_ref().and_then(|m| epoch_seconds(m.modified()));
            let textual = self.is_textual(&rel_path);
            documents.push(Document::new(rel_path, textual).with_times(created, modified));
        }
    }
}

impl Storage for FsStorage {
    fn scan(&self) -> Result<Vec<Document>, StorageError> {
        let mut index = self.index.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(documents) = index.as_ref() {
            return Ok(documents.as_ref().clone());
        }

        if !self.source_dir.is_dir() {
            return Err(StorageError::not_found(&self.source_dir).with_backend(BACKEND));
        }

        let mut documents = Vec::new();
        self.scan_directory(&self.source_dir, Path::new(""), &mut documents);
        tracing::debug!(
            source_dir = %self.source_dir.display(),
            document_count = documents.len(),
            "Vault scan completed"
        );

        *index = Some(Arc::new(documents.clone()));
        Ok(documents)
    }

    fn read(&self, document: &Document) -> Result<String, StorageError> {
        Self::validate_path(&document.path)?;
        let full_path = self.source_dir.join(&document.path);
        fs::read_to_string(&full_path)
            .map_err(|e| StorageError::io(e, Some(document.path.clone())).with_backend(BACKEND))
    }
}
