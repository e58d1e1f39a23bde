//! Typed canonical documents
//!
//! One explicit record type per entity, plus the shared sub-document
//! shapes. `Default` gives the empty-document template for each entity:
//! every list field empty, every optional field absent. The merge rules
//! in [`crate::merge`] are written against these types, so the insert
//! path (merge into a default) and the update path (merge into a stored
//! document) share one set of semantics.

use serde::{Deserialize, Serialize};

use mergeline_store::{DocId, IdValue, Record};

/// One contributing source system and the time it last touched the
/// document. At most one entry per source; re-processing refreshes the
/// timestamp in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Updated {
    pub source: String,
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NameEntry {
    pub name: String,
    pub lang: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TitleEntry {
    pub title: String,
    pub lang: String,
    pub source: String,
}

/// External identifier, the primary join key across sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalId {
    pub source: String,
    pub id: IdValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TypeEntry {
    pub source: String,
    #[serde(rename = "type")]
    pub value: String,
}

/// Time-interval-tagged classification record. At most one per
/// (source, from_date, to_date) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RankingEntry {
    pub from_date: Option<i64>,
    pub to_date: Option<i64>,
    pub rank: String,
    pub order: Option<i32>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SubjectRef {
    pub id: Option<DocId>,
    pub name: String,
    pub level: String,
    pub external_ids: Vec<ExternalId>,
}

/// Source-tagged block of subject entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SubjectBlock {
    pub source: String,
    pub subjects: Vec<SubjectRef>,
}

/// Publisher attached to a source document. First writer wins; later
/// sources fill only absent sub-fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PublisherRef {
    pub id: Option<DocId>,
    pub name: String,
    pub country_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliationRef {
    pub id: DocId,
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeEntry>,
}

/// Work author. `id` stays `None` until the person is resolved against
/// the canonical person collection; a resolved id appears at most once
/// in a document's author list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Author {
    pub id: Option<DocId>,
    pub full_name: String,
    pub affiliations: Vec<AffiliationRef>,
    pub external_ids: Vec<ExternalId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: DocId,
    pub name: String,
}

/// Relation to another entity. `id` is set when the relation resolves
/// to a canonical document; `external_id` carries the raw source
/// identifier otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Relation {
    pub id: Option<DocId>,
    pub external_id: String,
    pub name: String,
    pub types: Vec<TypeEntry>,
    pub source: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UrlEntry {
    pub source: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LineageEntry {
    pub source: String,
    pub id: String,
    pub parent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HierarchyLevel {
    pub source: String,
    pub level: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Address {
    pub city: String,
    pub state: String,
    pub country: String,
    pub country_code: String,
    pub postcode: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

// === Entity documents ===

/// Journal / publication venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SourceDoc {
    pub updated: Vec<Updated>,
    pub names: Vec<NameEntry>,
    pub types: Vec<TypeEntry>,
    pub external_ids: Vec<ExternalId>,
    pub external_urls: Vec<UrlEntry>,
    pub keywords: Vec<String>,
    pub subjects: Vec<SubjectBlock>,
    pub ranking: Vec<RankingEntry>,
    pub publisher: Option<PublisherRef>,
}

/// Research product (article, event output, report).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WorkDoc {
    pub updated: Vec<Updated>,
    pub titles: Vec<TitleEntry>,
    pub types: Vec<TypeEntry>,
    pub external_ids: Vec<ExternalId>,
    pub authors: Vec<Author>,
    pub author_count: usize,
    pub groups: Vec<GroupRef>,
    pub subjects: Vec<SubjectBlock>,
    pub ranking: Vec<RankingEntry>,
    pub year_published: Option<i32>,
}

/// Institution or research group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AffiliationDoc {
    pub updated: Vec<Updated>,
    pub names: Vec<NameEntry>,
    pub abbreviations: Vec<String>,
    pub types: Vec<TypeEntry>,
    pub relations: Vec<Relation>,
    pub addresses: Vec<Address>,
    pub external_ids: Vec<ExternalId>,
    pub external_urls: Vec<UrlEntry>,
    pub subjects: Vec<SubjectBlock>,
    pub year_established: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PublisherDoc {
    pub updated: Vec<Updated>,
    pub names: Vec<NameEntry>,
    pub abbreviations: Vec<String>,
    pub types: Vec<TypeEntry>,
    pub relations: Vec<Relation>,
    pub lineage: Vec<LineageEntry>,
    pub hierarchy_level: Vec<HierarchyLevel>,
    pub addresses: Vec<Address>,
    pub external_ids: Vec<ExternalId>,
    pub external_urls: Vec<UrlEntry>,
    pub subjects: Vec<SubjectBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PersonDoc {
    pub updated: Vec<Updated>,
    pub full_name: String,
    pub first_names: Vec<String>,
    pub last_names: Vec<String>,
    pub initials: String,
    pub affiliations: Vec<AffiliationRef>,
    pub external_ids: Vec<ExternalId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SubjectDoc {
    pub updated: Vec<Updated>,
    pub names: Vec<NameEntry>,
    pub level: Option<i32>,
    pub external_ids: Vec<ExternalId>,
    pub external_urls: Vec<UrlEntry>,
}

fn external_keys(ids: &[ExternalId]) -> Vec<IdValue> {
    ids.iter().map(|e| e.id.clone()).collect()
}

impl Record for SourceDoc {
    fn index_keys(&self) -> Vec<IdValue> {
        external_keys(&self.external_ids)
    }
}

impl Record for WorkDoc {
    fn index_keys(&self) -> Vec<IdValue> {
        external_keys(&self.external_ids)
    }
}

impl Record for AffiliationDoc {
    fn index_keys(&self) -> Vec<IdValue> {
        external_keys(&self.external_ids)
    }
}

impl Record for PublisherDoc {
    fn index_keys(&self) -> Vec<IdValue> {
        external_keys(&self.external_ids)
    }
}

impl Record for PersonDoc {
    fn index_keys(&self) -> Vec<IdValue> {
        external_keys(&self.external_ids)
    }
}

impl Record for SubjectDoc {
    fn index_keys(&self) -> Vec<IdValue> {
        external_keys(&self.external_ids)
    }
}
