//! Mergeline Store - In-process document store for canonical entities
//!
//! Keyed document collections with external-id indexing, atomic
//! per-document updates, explicit-close cursors, and JSONL persistence.
//! The query surface is deliberately small: point lookups by external
//! identifier (first match wins, caller-ordered), predicate lookups, and
//! snapshot cursors.

pub mod collection;
pub mod cursor;
pub mod error;
pub mod key;
pub mod persist;

// Re-exports for convenience
pub use collection::{Collection, Record, Stored};
pub use cursor::Cursor;
pub use error::StoreError;
pub use key::{DocId, IdValue};
pub use persist::{JsonlBatch, read_jsonl};
