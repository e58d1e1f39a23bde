//! Error taxonomy for record processing
//!
//! Per-record errors are isolated: workers log and count them, the batch
//! continues. Configuration and store-open errors are fatal at startup
//! and surface through `anyhow` at the runner edges.

use mergeline_store::StoreError;

/// Error from processing a single source record.
#[derive(Debug)]
pub enum RecordError {
    Store(StoreError),
    /// Record-level irregularity worth surfacing (counted, never fatal).
    Malformed(String),
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(e) => write!(f, "store: {e}"),
            Self::Malformed(msg) => write!(f, "malformed record: {msg}"),
        }
    }
}

impl std::error::Error for RecordError {}

impl From<StoreError> for RecordError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}
