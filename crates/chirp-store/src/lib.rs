//! Snapshot storage for Chirp.
//!
//! The entire application state (posts, accounts, revoked tokens) lives in a
//! single JSON document. Every read loads the whole document and every write
//! replaces it wholesale; there is no cache between calls.
//!
//! # Storage Backends
//!
//! All backends implement the [`SnapshotStore`] trait:
//!
//! - [`FileSnapshotStore`] -- one JSON file on disk, replaced atomically
//! - [`InMemorySnapshotStore`] -- encoded bytes held in memory for tests and embedding
//!
//! # Design Rules
//!
//! 1. Reads take a shared lock, writes take an exclusive lock.
//! 2. A reader sees either the old or the new document, never a torn one.
//! 3. [`SnapshotStore::update`] holds the exclusive lock across load, mutate
//!    and save, so mutations in one process never lose each other's writes.
//! 4. All I/O and codec errors are propagated, never retried.

pub mod codec;
pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::FileSnapshotStore;
pub use memory::InMemorySnapshotStore;
pub use traits::SnapshotStore;
