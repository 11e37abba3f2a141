//! Embed directive resolution for Splice.
//!
//! Turns directive blocks such as
//!
//! ```text
//! [[NoteA]]
//! [[NoteB#Intro!]]
//! ```
//!
//! into the text they point at. The pipeline:
//!
//! 1. [`parse`] turns a block into [`EmbedRequest`]s.
//! 2. [`EmbedResolver`] fetches documents through a [`Storage`] backend,
//!    narrows them to sections and expands nested embed regions.
//! 3. [`aggregate`] joins the fragments, inlining an error marker for each
//!    failed request.
//!
//! [`EmbedEngine`] wires the steps together and also rewrites whole markdown
//! documents, replacing every ` ```embed ` block with its resolved content.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use splice_embed::{EmbedConfig, EmbedEngine};
//! use splice_storage::MockStorage;
//!
//! let storage = MockStorage::new().with_file("NoteA.md", "hello");
//! let engine = EmbedEngine::new(Arc::new(storage), EmbedConfig::default());
//!
//! assert_eq!(engine.render_block("[[NoteA]]"), "\n\nhello\n\n---\n\n");
//! ```
//!
//! [`Storage`]: splice_storage::Storage

mod aggregate;
mod block;
mod directive;
mod engine;
mod error;
mod resolver;
mod sort;

pub use aggregate::{AggregateResult, ResolvedFragment, aggregate};
pub use directive::{
    EmbedRequest, Syntax, detect_syntax, parse, parse_with_sort, strip_comments,
};
pub use engine::{DEFAULT_KEYWORD, DEFAULT_MAX_DEPTH, EmbedConfig, EmbedEngine};
pub use error::{BlockError, EmbedError, Missing};
pub use resolver::EmbedResolver;
pub use sort::{SortOrder, UnknownSortOrder};
