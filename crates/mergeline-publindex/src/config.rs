//! Connector configuration

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSONL export of the journal-index collection.
    pub input: PathBuf,
    /// Worker threads for the reconciliation loop.
    pub num_jobs: usize,
    pub verbose: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from("publindex.jsonl"),
            num_jobs: 1,
            verbose: 0,
        }
    }
}
