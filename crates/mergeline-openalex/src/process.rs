//! Publisher synthesis with linked-entity resolution

use mergeline_core::document::{
    HierarchyLevel, LineageEntry, PublisherDoc, Relation, SubjectRef, UrlEntry,
};
use mergeline_core::error::RecordError;
use mergeline_core::merge;
use mergeline_core::normalize::epoch_now;
use mergeline_core::stats::Outcome;
use mergeline_core::CanonicalStore;
use mergeline_store::IdValue;

use crate::record::PublisherRow;

pub const SOURCE: &str = "openalex";

/// Partition key: first external identifier, else the display name.
pub fn partition_key(row: &PublisherRow) -> Option<String> {
    if let Some((_, value)) = row.id_pairs().into_iter().next() {
        return Some(value);
    }
    row.display_name
        .as_ref()
        .filter(|name| !name.is_empty())
        .cloned()
}

/// Insert-only reconciliation: known publishers are left untouched.
pub fn process_publisher(
    row: PublisherRow,
    store: &CanonicalStore,
) -> Result<Outcome, RecordError> {
    let keys: Vec<IdValue> = row
        .id_pairs()
        .into_iter()
        .map(|(_, value)| IdValue::plain(value))
        .collect();

    if let Some(hit) = store.publishers.find_one_in(&keys) {
        log::debug!(
            "{SOURCE}: publisher already known as {} — leaving first writer's facts",
            hit.id
        );
        return Ok(Outcome::Skipped);
    }

    let doc = synthesize(&row, store, epoch_now());
    store.publishers.insert_one(doc);
    Ok(Outcome::Inserted)
}

/// Build the canonical publisher from the snapshot row plus whatever
/// linked entities resolve: the institution role contributes names,
/// types, abbreviations, and addresses; concepts link to canonical
/// subjects; the lineage entry matching `parent_publisher` is flagged.
fn synthesize(row: &PublisherRow, store: &CanonicalStore, now: i64) -> PublisherDoc {
    let mut doc = PublisherDoc::default();
    merge::upsert_updated(&mut doc.updated, SOURCE, now);

    doc.relations = row
        .roles
        .iter()
        .filter(|role| !role.role.is_empty() && !role.id.is_empty())
        .map(|role| Relation {
            id: None,
            external_id: role.id.clone(),
            name: String::new(),
            types: Vec::new(),
            source: SOURCE.to_string(),
            role: role.role.clone(),
        })
        .collect();

    let institution = row
        .institution_id()
        .and_then(|id| store.affiliations.find_one(&IdValue::plain(id)));

    match &institution {
        Some(inst) => {
            doc.names = inst.doc.names.clone();
            doc.types = inst.doc.types.clone();
            doc.abbreviations = inst.doc.abbreviations.clone();
            doc.addresses = inst.doc.addresses.clone();
        }
        None => {
            if let Some(name) = row.display_name.as_deref() {
                merge::append_name(&mut doc.names, name, "en", SOURCE);
            }
        }
    }

    let parent_id = row.parent_publisher.as_ref().map(|p| p.id.as_str());
    doc.lineage = row
        .lineage
        .iter()
        .map(|id| LineageEntry {
            source: SOURCE.to_string(),
            id: id.clone(),
            parent: parent_id == Some(id.as_str()),
        })
        .collect();

    doc.hierarchy_level.push(HierarchyLevel {
        source: SOURCE.to_string(),
        level: row.hierarchy_level,
    });

    for (source, value) in row.id_pairs() {
        // URL-shaped ids from other registries are links, not join keys
        if value.contains("http") && !value.contains("openalex") {
            continue;
        }
        merge::append_external_id(&mut doc.external_ids, &source, IdValue::plain(value));
    }

    for (source, value) in row.id_pairs() {
        doc.external_urls.push(UrlEntry {
            source,
            url: value,
        });
    }
    if let Some(url) = row.homepage_url.as_deref().filter(|u| !u.is_empty()) {
        doc.external_urls.push(UrlEntry {
            source: "site".to_string(),
            url: url.to_string(),
        });
    }
    if let Some(url) = row.image_url.as_deref().filter(|u| !u.is_empty()) {
        doc.external_urls.push(UrlEntry {
            source: "logo".to_string(),
            url: url.to_string(),
        });
    }

    let concepts: Vec<SubjectRef> = row
        .x_concepts
        .iter()
        .filter(|concept| !concept.display_name.is_empty())
        .map(|concept| SubjectRef {
            id: store
                .subjects
                .find_one(&IdValue::plain(concept.id.clone()))
                .map(|subject| subject.id),
            name: concept.display_name.clone(),
            level: concept.level.to_string(),
            external_ids: vec![mergeline_core::document::ExternalId {
                source: SOURCE.to_string(),
                id: IdValue::plain(concept.id.clone()),
            }],
        })
        .collect();
    merge::merge_subjects(&mut doc.subjects, SOURCE, concepts);

    doc
}
