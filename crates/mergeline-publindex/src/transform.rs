//! Journal record → source document field construction
//!
//! One `apply` covers both reconciliation paths: the update path runs it
//! against the stored document, the synthesizer runs it against the
//! empty template. Both go through the same merge rules, so the insert
//! and update semantics cannot drift.

use mergeline_core::document::{ExternalId, PublisherRef, RankingEntry, SourceDoc, SubjectRef};
use mergeline_core::identity::SourceIdentity;
use mergeline_core::merge;
use mergeline_core::normalize::{normalize_issn, normalize_numeric_id, normalize_text, year_bounds};
use mergeline_store::IdValue;

use crate::record::JournalRecord;

pub const SOURCE: &str = "publindex";

/// Subject entries carrying this sentinel are placeholders, not data.
const NO_ENTRY: &str = "no registra";

pub fn extract_identity(record: &JournalRecord) -> SourceIdentity {
    SourceIdentity {
        name: normalize_text(&record.name),
        issn_p: normalize_issn(&record.issn_print),
        issn_l: normalize_issn(&record.issn_linking),
        vendor_id: normalize_numeric_id(&record.vendor_id),
    }
}

/// Build the subject hierarchy the record carries: broad area, area,
/// specialty, and the numeric area code attached to the most specific
/// level present (or standing alone when no level is named).
pub fn build_subjects(record: &JournalRecord) -> Vec<SubjectRef> {
    let mut subjects = Vec::new();

    for (value, level) in [
        (&record.broad_area, "gran_area"),
        (&record.area, "area"),
        (&record.specialty, "especialidad"),
    ] {
        let name = normalize_text(value);
        if !name.is_empty() && name.to_lowercase() != NO_ENTRY {
            subjects.push(SubjectRef {
                id: None,
                name,
                level: level.to_string(),
                external_ids: Vec::new(),
            });
        }
    }

    let area_code = normalize_numeric_id(&record.area_code);
    if !area_code.is_empty() {
        let ext = ExternalId {
            source: "publindex_area".to_string(),
            id: IdValue::plain(area_code.clone()),
        };
        match subjects.last_mut() {
            Some(last) => last.external_ids.push(ext),
            None => subjects.push(SubjectRef {
                id: None,
                name: area_code,
                level: "area_code".to_string(),
                external_ids: vec![ext],
            }),
        }
    }

    subjects
}

pub fn build_publisher(record: &JournalRecord) -> Option<PublisherRef> {
    let name = normalize_text(&record.publisher_name);
    if name.is_empty() {
        return None;
    }
    let country = normalize_text(&record.publisher_country);
    let country_code = if country.eq_ignore_ascii_case("colombia") {
        "CO".to_string()
    } else {
        String::new()
    };
    Some(PublisherRef {
        id: None,
        name,
        country_code,
    })
}

/// Apply one journal observation to a source document.
pub fn apply(record: &JournalRecord, doc: &mut SourceDoc, now: i64) {
    let identity = extract_identity(record);

    merge::upsert_updated(&mut doc.updated, SOURCE, now);
    merge::append_name(&mut doc.names, &identity.name, "es", SOURCE);
    merge::append_external_id(
        &mut doc.external_ids,
        "issn",
        IdValue::plain(identity.issn_p.clone()),
    );
    merge::append_external_id(
        &mut doc.external_ids,
        "issn_l",
        IdValue::plain(identity.issn_l.clone()),
    );
    merge::append_external_id(
        &mut doc.external_ids,
        SOURCE,
        IdValue::plain(identity.vendor_id.clone()),
    );

    let (from_date, to_date) = year_bounds(&record.year);
    merge::upsert_ranking(
        &mut doc.ranking,
        RankingEntry {
            from_date,
            to_date,
            rank: normalize_text(&record.rank),
            order: None,
            source: SOURCE.to_string(),
        },
    );

    if let Some(publisher) = build_publisher(record) {
        merge::merge_publisher(&mut doc.publisher, publisher);
    }

    merge::merge_subjects(&mut doc.subjects, SOURCE, build_subjects(record));
}
