//! Publisher connector for the OpenAlex snapshot
//!
//! Insert-only: a publisher already known under any of its external
//! identifiers is left alone; unknown ones are synthesized with their
//! linked entities resolved (institution names and metadata, lineage
//! parent, canonical subject links).

pub mod config;
pub mod process;
pub mod record;
pub mod runner;

pub use config::Config;
pub use record::PublisherRow;
pub use runner::run;
