//! Connector runner: read, seed the similarity index, reconcile

use anyhow::{Context as _, Result};
use indicatif::MultiProgress;

use mergeline_core::stats::RunStats;
use mergeline_core::{CanonicalStore, Orchestrator, TitleIndex};
use mergeline_store::read_jsonl;

use crate::config::Config;
use crate::parser::SOURCE;
use crate::process::{self, Context};
use crate::record::OpendataRecord;

/// Run the open-data product reconciliation against `store`.
pub fn run(
    config: &Config,
    store: &CanonicalStore,
    multi: Option<&MultiProgress>,
) -> Result<RunStats> {
    let batch = read_jsonl::<OpendataRecord>(&config.input)
        .with_context(|| format!("minciencias: cannot read {}", config.input.display()))?;
    log::info!(
        "minciencias: {} products ({} malformed lines)",
        batch.records.len(),
        batch.malformed
    );

    // the similarity index starts from every work already known
    let index = TitleIndex::from_works(&store.works);
    log::debug!("minciencias: similarity index seeded with {} titles", index.len());

    let ctx = Context::new(store, &index, config.thresholds);

    let stats = Orchestrator::new(SOURCE, config.num_jobs)
        .with_progress(multi)
        .run(
            batch.records,
            process::partition_key,
            |record| process::process_record(record, &ctx),
        );

    Ok(stats)
}
