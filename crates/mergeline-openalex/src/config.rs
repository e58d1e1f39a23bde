//! Connector configuration

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSONL shard of the snapshot's publishers entity.
    pub input: PathBuf,
    pub num_jobs: usize,
    pub verbose: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from("openalex_publishers.jsonl"),
            num_jobs: 1,
            verbose: 0,
        }
    }
}
