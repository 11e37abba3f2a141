//! Storage abstraction for Splice embed resolution.
//!
//! This crate provides a [`Storage`] trait for looking up documents by name or
//! filename prefix and reading their content. The embed engine only ever reads
//! through this trait, which keeps it independent of where documents live:
//!
//! - **Unit testing** without touching the real filesystem
//! - **Backend flexibility** (filesystem vault, in-memory, remote stores)
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `scan()` and `read()`, plus name and prefix lookups
//!   built on top of `scan()`
//! - [`Document`] describing one stored file
//! - [`strip_front_matter`] for dropping a leading YAML block before embedding
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use splice_storage::{MockStorage, Storage};
//!
//! let storage = MockStorage::new().with_file("NoteA.md", "hello");
//! let doc = storage.find_by_name("NoteA")?.unwrap();
//! assert_eq!(storage.read(&doc)?, "hello");
//! ```

mod front_matter;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use front_matter::strip_front_matter;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{Document, Storage, StorageError, StorageErrorKind};
