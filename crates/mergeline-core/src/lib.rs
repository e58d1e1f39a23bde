//! Mergeline Core - Record reconciliation engine for bibliometric sources
//!
//! This crate provides the shared machinery the source connectors build on:
//! field normalization, typed canonical documents, identity extraction,
//! deterministic and fuzzy resolution, field-level merge rules, and the
//! partitioned orchestration loop.

pub mod db;
pub mod document;
pub mod error;
pub mod identity;
pub mod logging;
pub mod merge;
pub mod normalize;
pub mod orchestrate;
pub mod resolve;
pub mod shutdown;
pub mod similarity;
pub mod stats;

// Re-exports for convenience
pub use db::CanonicalStore;
pub use error::RecordError;
pub use logging::init_logging;
pub use orchestrate::Orchestrator;
pub use resolve::{Thresholds, resolve_source};
pub use shutdown::{is_shutdown_requested, request_shutdown, shutdown_flag};
pub use similarity::{SearchHit, Similarity, TitleIndex};
pub use stats::{Outcome, RunCounters, RunStats};
