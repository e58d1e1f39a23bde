//! Connector runner: read, partition, reconcile

use anyhow::{Context, Result};
use indicatif::MultiProgress;

use mergeline_core::document::SourceDoc;
use mergeline_core::normalize::epoch_now;
use mergeline_core::resolve::resolve_source;
use mergeline_core::stats::{Outcome, RunStats};
use mergeline_core::{CanonicalStore, Orchestrator};
use mergeline_store::read_jsonl;

use crate::config::Config;
use crate::record::JournalRecord;
use crate::transform::{self, extract_identity};

/// Run the journal-index reconciliation against `store`.
pub fn run(
    config: &Config,
    store: &CanonicalStore,
    multi: Option<&MultiProgress>,
) -> Result<RunStats> {
    let batch = read_jsonl::<JournalRecord>(&config.input)
        .with_context(|| format!("publindex: cannot read {}", config.input.display()))?;
    log::info!(
        "publindex: {} records ({} malformed lines)",
        batch.records.len(),
        batch.malformed
    );

    let stats = Orchestrator::new(transform::SOURCE, config.num_jobs)
        .with_progress(multi)
        .run(
            batch.records,
            |record| extract_identity(record).partition_key(),
            |record| {
                let identity = extract_identity(&record);
                let now = epoch_now();
                match resolve_source(&store.sources, &identity) {
                    Some(hit) => {
                        store
                            .sources
                            .update_one(hit.id, |doc| transform::apply(&record, doc, now))?;
                        Ok(Outcome::Updated)
                    }
                    None => {
                        let mut doc = SourceDoc::default();
                        transform::apply(&record, &mut doc, now);
                        store.sources.insert_one(doc);
                        Ok(Outcome::Inserted)
                    }
                }
            },
        );

    Ok(stats)
}
