//! Per-record reconciliation: composite-key match, fuzzy duplicate
//! policy, author and group merging

use mergeline_core::document::{AffiliationDoc, AffiliationRef, Author, GroupRef, WorkDoc};
use mergeline_core::error::RecordError;
use mergeline_core::merge;
use mergeline_core::normalize::epoch_now;
use mergeline_core::resolve::find_duplicate;
use mergeline_core::similarity::fold;
use mergeline_core::stats::Outcome;
use mergeline_core::{CanonicalStore, Similarity, Thresholds};
use mergeline_store::{DocId, IdValue, Stored};

use crate::parser::{ParsedProduct, SOURCE, parse_record};
use crate::record::OpendataRecord;

/// Shared state for one connector run.
pub struct Context<'a> {
    pub store: &'a CanonicalStore,
    pub index: &'a dyn Similarity,
    pub thresholds: Thresholds,
    /// Serializes the fuzzy check-then-insert section: two records that
    /// alias one work only through their titles live in different
    /// partitions, so the duplicate lookup and the insert must not
    /// interleave.
    pub insert_gate: std::sync::Mutex<()>,
}

impl<'a> Context<'a> {
    pub fn new(store: &'a CanonicalStore, index: &'a dyn Similarity, thresholds: Thresholds) -> Self {
        Self {
            store,
            index,
            thresholds,
            insert_gate: std::sync::Mutex::new(()),
        }
    }
}

/// A resolved research group, ready to attach.
struct GroupLink {
    group: GroupRef,
    relations: Vec<mergeline_core::document::Relation>,
}

/// Partition key: the composite product key when the id parses, else
/// the folded title (fuzzy-matching records with one title must not
/// merge concurrently), else nothing — the record is unusable.
pub fn partition_key(record: &OpendataRecord) -> Option<String> {
    if let Some(key) = mergeline_core::identity::ProductKey::parse(&record.product_id) {
        return Some(format!("{}-{}", key.person_code, key.product_code));
    }
    let title = fold(&record.title);
    if title.is_empty() { None } else { Some(title) }
}

pub fn process_record(record: OpendataRecord, ctx: &Context) -> Result<Outcome, RecordError> {
    let parsed = parse_record(&record);
    let now = epoch_now();

    if let Some(key) = &parsed.key {
        if let Some(hit) = ctx.store.works.find_one(&key.id_value()) {
            return merge_into_existing(hit, &parsed, ctx, now);
        }
    }

    insert_or_merge_duplicate(parsed, ctx, now)
}

/// The update path: the product already has a canonical work.
fn merge_into_existing(
    hit: Stored<WorkDoc>,
    parsed: &ParsedProduct,
    ctx: &Context,
    now: i64,
) -> Result<Outcome, RecordError> {
    if merge::has_update_from(&hit.doc.updated, SOURCE) {
        // this product was already merged from the portal
        return Ok(Outcome::Skipped);
    }

    let author = resolve_author(parsed, ctx);
    let group = resolve_group(parsed, ctx);
    apply_observation(hit.id, parsed, author, group, ctx, now)?;
    Ok(Outcome::Updated)
}

/// The insert path, guarded by the fuzzy duplicate policy.
fn insert_or_merge_duplicate(
    parsed: ParsedProduct,
    ctx: &Context,
    now: i64,
) -> Result<Outcome, RecordError> {
    let author = resolve_author(&parsed, ctx);
    let group = resolve_group(&parsed, ctx);

    let author_names: Vec<String> = author
        .iter()
        .filter(|a| !a.full_name.is_empty())
        .map(|a| a.full_name.clone())
        .collect();

    let _gate = ctx
        .insert_gate
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(duplicate) = find_duplicate(ctx.index, &parsed.title, &author_names, &ctx.thresholds)
    {
        log::debug!("{SOURCE}: '{}' matches existing work {duplicate}", parsed.title);
        apply_observation(duplicate, &parsed, author, group, ctx, now)?;
        return Ok(Outcome::Updated);
    }

    let mut doc = parsed.work.clone();
    merge::upsert_updated(&mut doc.updated, SOURCE, now);
    if let Some(author) = author {
        merge::merge_author(&mut doc.authors, author);
    }
    doc.author_count = doc.authors.len();
    if let Some(link) = group {
        merge::append_group(&mut doc.groups, link.group);
        if let Some(author_id) = doc.authors.iter().find_map(|a| a.id) {
            merge::attach_education_relations(&mut doc.authors, author_id, &link.relations);
        }
    }

    let id = ctx.store.works.insert_one(doc);
    ctx.index.insert(id, &parsed.title, author_names);
    Ok(Outcome::Inserted)
}

/// Merge one observation into the work with `id`, under the collection
/// write lock.
fn apply_observation(
    id: DocId,
    parsed: &ParsedProduct,
    author: Option<Author>,
    group: Option<GroupLink>,
    ctx: &Context,
    now: i64,
) -> Result<(), RecordError> {
    ctx.store.works.update_one(id, |doc| {
        merge::upsert_updated(&mut doc.updated, SOURCE, now);

        // one title per source from the portal
        if let Some(incoming) = parsed.work.titles.first() {
            if !doc.titles.iter().any(|t| t.source == SOURCE) {
                doc.titles.push(incoming.clone());
            }
        }
        for ext in &parsed.work.external_ids {
            merge::append_external_id(&mut doc.external_ids, &ext.source, ext.id.clone());
        }
        for t in &parsed.work.types {
            merge::append_type(&mut doc.types, &t.source, &t.value);
        }
        if doc.year_published.is_none() {
            doc.year_published = parsed.work.year_published;
        }

        let author_id = author.as_ref().and_then(|a| a.id);
        if let Some(author) = author {
            merge::merge_author(&mut doc.authors, author);
            doc.author_count = doc.authors.len();
        }
        if let Some(link) = group {
            merge::append_group(&mut doc.groups, link.group);
            if let Some(author_id) = author_id {
                merge::attach_education_relations(&mut doc.authors, author_id, &link.relations);
            }
        }
    })?;
    Ok(())
}

/// Resolve the product's author: the researcher code looks up the
/// canonical person, the group code the affiliation attached to them.
/// A missing person is a data-quality gap, logged and tolerated.
fn resolve_author(parsed: &ParsedProduct, ctx: &Context) -> Option<Author> {
    let key = parsed.key.as_ref()?;
    let person = match ctx
        .store
        .person
        .find_one(&IdValue::plain(key.person_code.clone()))
    {
        Some(person) => person,
        None => {
            log::warn!(
                "{SOURCE}: no person for researcher code {}",
                key.person_code
            );
            return None;
        }
    };

    let affiliations = find_group_affiliation(parsed, ctx)
        .map(|aff| {
            vec![AffiliationRef {
                id: aff.id,
                name: aff
                    .doc
                    .names
                    .first()
                    .map(|n| n.name.trim().to_string())
                    .unwrap_or_default(),
                types: aff.doc.types.clone(),
            }]
        })
        .unwrap_or_default();

    Some(Author {
        id: Some(person.id),
        full_name: person.doc.full_name.clone(),
        affiliations,
        external_ids: vec![mergeline_core::document::ExternalId {
            source: "scienti".to_string(),
            id: IdValue::plain(key.person_code.clone()),
        }],
    })
}

/// The research group, if it exists in the affiliations collection.
fn resolve_group(parsed: &ParsedProduct, ctx: &Context) -> Option<GroupLink> {
    let aff = find_group_affiliation(parsed, ctx)?;
    Some(GroupLink {
        group: GroupRef {
            id: aff.id,
            name: aff
                .doc
                .names
                .first()
                .map(|n| n.name.clone())
                .unwrap_or_default(),
        },
        relations: aff.doc.relations.clone(),
    })
}

/// Vendor-tagged external id first, then any source.
fn find_group_affiliation(parsed: &ParsedProduct, ctx: &Context) -> Option<Stored<AffiliationDoc>> {
    if parsed.group_code.is_empty() {
        return None;
    }
    let code = IdValue::plain(parsed.group_code.clone());
    ctx.store
        .affiliations
        .find_one_where(|doc| {
            doc.external_ids
                .iter()
                .any(|e| e.source == "scienti" && e.id == code)
        })
        .or_else(|| ctx.store.affiliations.find_one(&code))
}
