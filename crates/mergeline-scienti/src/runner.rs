//! Group products by ISSN and reconcile journal classifications

use anyhow::{Context, Result};
use indicatif::MultiProgress;
use rustc_hash::FxHashMap;

use mergeline_core::document::{PublisherRef, SourceDoc};
use mergeline_core::merge::{self, RankingSpans};
use mergeline_core::normalize::{
    detect_lang, epoch_now, normalize_issn, normalize_numeric_id, normalize_text,
    parse_creation_date,
};
use mergeline_core::stats::{Outcome, RunStats};
use mergeline_core::{CanonicalStore, Orchestrator};
use mergeline_store::{IdValue, read_jsonl};

use crate::config::Config;
use crate::record::ProductRecord;

pub const SOURCE: &str = "scienti";

/// All products observed for one journal identifier.
struct IssnGroup {
    issn: String,
    products: Vec<ProductRecord>,
}

/// Run the research-CV journal reconciliation against `store`.
pub fn run(
    config: &Config,
    store: &CanonicalStore,
    multi: Option<&MultiProgress>,
) -> Result<RunStats> {
    let batch = read_jsonl::<ProductRecord>(&config.input)
        .with_context(|| format!("scienti: cannot read {}", config.input.display()))?;
    log::info!(
        "scienti: {} products ({} malformed lines)",
        batch.records.len(),
        batch.malformed
    );

    let groups = group_by_issn(batch.records);
    let stats = Orchestrator::new(SOURCE, config.num_jobs)
        .with_progress(multi)
        .run(
            groups,
            |group| {
                if group.issn.is_empty() {
                    None
                } else {
                    Some(group.issn.clone())
                }
            },
            |group| {
                let now = epoch_now();
                let spans = collect_spans(&group.products);
                match store.sources.find_one(&IdValue::plain(group.issn.clone())) {
                    Some(hit) => {
                        store
                            .sources
                            .update_one(hit.id, |doc| apply(&group, &spans, doc, now))?;
                        Ok(Outcome::Updated)
                    }
                    None => {
                        let mut doc = SourceDoc::default();
                        synthesize(&group, &spans, &mut doc, now);
                        store.sources.insert_one(doc);
                        Ok(Outcome::Inserted)
                    }
                }
            },
        );

    Ok(stats)
}

/// Distinct journal identifiers, each with every product observed for
/// it. Products without a parseable ISSN become unkeyed singletons so
/// the orchestrator counts them skipped.
fn group_by_issn(products: Vec<ProductRecord>) -> Vec<IssnGroup> {
    let mut groups: Vec<IssnGroup> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();

    for product in products {
        let issn = product
            .journal()
            .map(|(_, journal)| normalize_issn(&journal.issn))
            .unwrap_or_default();
        if issn.is_empty() {
            groups.push(IssnGroup {
                issn: String::new(),
                products: vec![product],
            });
            continue;
        }
        let slot = *index.entry(issn.clone()).or_insert_with(|| {
            groups.push(IssnGroup {
                issn,
                products: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].products.push(product);
    }

    groups
}

/// Fold every classification observation in the group into per-rank
/// spans: the span for a rank covers min..max of the creation dates
/// that carried it, regardless of observation order.
fn collect_spans(products: &[ProductRecord]) -> RankingSpans {
    let mut spans = RankingSpans::new();
    for product in products {
        let Some((article, journal)) = product.journal() else {
            continue;
        };
        let rank = normalize_text(&journal.classification);
        if rank.is_empty() {
            continue;
        }
        spans.observe(&rank, parse_creation_date(&article.created));
    }
    spans
}

/// Merge one group's journal facts into an existing source document.
fn apply(group: &IssnGroup, spans: &RankingSpans, doc: &mut SourceDoc, now: i64) {
    let Some((_, journal)) = group.products.iter().find_map(|p| p.journal()) else {
        return;
    };

    merge::upsert_updated(&mut doc.updated, SOURCE, now);
    merge::append_type(&mut doc.types, SOURCE, &normalize_text(&journal.journal_type));
    merge::append_external_id(
        &mut doc.external_ids,
        SOURCE,
        IdValue::plain(normalize_numeric_id(&journal.code)),
    );
    spans.merge_into(&mut doc.ranking, SOURCE);
}

/// Build a new source document from the group's journal facts.
fn synthesize(group: &IssnGroup, spans: &RankingSpans, doc: &mut SourceDoc, now: i64) {
    apply(group, spans, doc, now);

    let Some((_, journal)) = group.products.iter().find_map(|p| p.journal()) else {
        return;
    };
    let name = normalize_text(&journal.name);
    merge::append_name(&mut doc.names, &name, detect_lang(&name), SOURCE);
    merge::append_external_id(
        &mut doc.external_ids,
        "issn",
        IdValue::plain(group.issn.clone()),
    );
    if let Some(editorial) = journal.editorial.first() {
        merge::merge_publisher(
            &mut doc.publisher,
            PublisherRef {
                id: None,
                name: normalize_text(&editorial.name),
                country_code: String::new(),
            },
        );
    }
}
