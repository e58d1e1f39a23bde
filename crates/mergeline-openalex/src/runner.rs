//! Connector runner

use anyhow::{Context, Result};
use indicatif::MultiProgress;

use mergeline_core::stats::RunStats;
use mergeline_core::{CanonicalStore, Orchestrator};
use mergeline_store::read_jsonl;

use crate::config::Config;
use crate::process::{self, SOURCE};
use crate::record::PublisherRow;

/// Run the snapshot publisher ingest against `store`.
pub fn run(
    config: &Config,
    store: &CanonicalStore,
    multi: Option<&MultiProgress>,
) -> Result<RunStats> {
    let batch = read_jsonl::<PublisherRow>(&config.input)
        .with_context(|| format!("openalex: cannot read {}", config.input.display()))?;
    log::info!(
        "openalex: {} publishers ({} malformed lines)",
        batch.records.len(),
        batch.malformed
    );

    let stats = Orchestrator::new(SOURCE, config.num_jobs)
        .with_progress(multi)
        .run(batch.records, process::partition_key, |row| {
            process::process_publisher(row, store)
        });

    Ok(stats)
}
