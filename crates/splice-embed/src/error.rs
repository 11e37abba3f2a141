//! Error types for embed resolution.

use splice_storage::StorageError;

/// What an embed request pointed at that does not exist.
#[derive(Debug, thiserror::Error)]
pub enum Missing {
    /// No document answers to the name.
    #[error("File '{0}' not found")]
    File(String),
    /// The document exists but has no such section.
    #[error("Section '{section}' not found in '{file}'")]
    Section {
        /// Document name.
        file: String,
        /// Requested section.
        section: String,
    },
    /// No textual document starts with the prefix.
    #[error("No markdown files found with prefix '{0}'")]
    Prefix(String),
}

/// Failure of a single embed request.
///
/// Request failures never abort a block: each one becomes an inline marker in
/// the aggregate.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    /// Document, section or prefix group not found.
    #[error(transparent)]
    NotFound(#[from] Missing),

    /// The document is not embeddable text.
    #[error("Invalid file type for '{0}', expected Markdown")]
    WrongType(String),

    /// The section exists but holds no text.
    #[error("Section '{section}' in '{file}' is empty")]
    EmptySection {
        /// Document name.
        file: String,
        /// Requested section.
        section: String,
    },

    /// Nested resolution went deeper than allowed.
    #[error("Maximum embed depth ({max_depth}) exceeded for '{name}'")]
    DepthExceeded {
        /// Document whose embed hit the bound.
        name: String,
        /// Configured bound.
        max_depth: usize,
    },

    /// The request has a blank name or prefix.
    #[error("Invalid embed request '{0}'")]
    InvalidRequest(String),

    /// The storage backend failed.
    #[error("Could not read '{name}': {source}")]
    Storage {
        /// Document name or prefix being resolved.
        name: String,
        #[source]
        source: StorageError,
    },
}

impl EmbedError {
    pub(crate) fn storage(name: &str, source: StorageError) -> Self {
        Self::Storage {
            name: name.to_owned(),
            source,
        }
    }

    /// Inline marker shown in place of the failed content.
    #[must_use]
    pub fn marker(&self) -> String {
        format!("**Error:** {self}.")
    }
}

/// Block-level failure: the whole directive block produced nothing usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BlockError {
    /// Only comments, or nothing at all.
    #[error("No valid embed requests after filtering comments.")]
    NoRequests,
    /// Text that forms no valid request.
    #[error("Invalid format. Use [[file]], [[file#section]], or prefix:prefix_name")]
    InvalidFormat,
    /// Every request failed or resolved to blank text.
    #[error("No valid content found.")]
    NoContent,
}
