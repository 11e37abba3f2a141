//! CLI error types.

use std::path::PathBuf;

use splice_config::ConfigError;
use splice_embed::{BlockError, UnknownSortOrder};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{0}")]
    Block(#[from] BlockError),

    #[error("{0}")]
    Sort(#[from] UnknownSortOrder),

    #[error("{0}")]
    Validation(String),
}
