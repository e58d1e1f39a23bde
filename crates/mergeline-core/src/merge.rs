//! Field-level merge rules
//!
//! Every rule is idempotent: applying it twice with the same input
//! yields the same document as applying it once. The synthesizer path is
//! the same set of rules applied to a `Default` template, so insert and
//! update can never drift apart.
//!
//! Rules per field group:
//! - `updated`: upsert-by-source (refresh timestamp in place).
//! - tagged value lists (`names`, `titles`, `external_ids`, `types`):
//!   append only if no element carries the same identity pair.
//! - `ranking`: upsert-by-(source, from, to) for single observations;
//!   bound expansion by (source, rank) when folding historical
//!   observations.
//! - `subjects`: two-level merge — find-or-create the per-source block,
//!   then append entries new by (name, level, external_ids).
//! - `publisher`: first writer wins, later sources fill absent fields.
//! - `authors`: match by resolved person id, else fuzzy name plus a
//!   shared affiliation; append otherwise.
//! - `groups`: append by id; "education" relations of a matched group
//!   also attach to the matched author.

use mergeline_store::{DocId, IdValue};
use rustc_hash::FxHashSet;

use crate::document::{
    AffiliationRef, Author, ExternalId, GroupRef, NameEntry, PublisherRef, RankingEntry,
    Relation, SubjectBlock, SubjectRef, TitleEntry, TypeEntry, Updated,
};
use crate::similarity::{fold, partial_ratio};

/// Name similarity at or above which two author entries may be merged
/// (still requires a shared affiliation).
pub const AUTHOR_NAME_MATCH: f64 = 90.0;

/// Refresh the entry for `source` or append a new one.
pub fn upsert_updated(updated: &mut Vec<Updated>, source: &str, time: i64) {
    for entry in updated.iter_mut() {
        if entry.source == source {
            entry.time = time;
            return;
        }
    }
    updated.push(Updated {
        source: source.to_string(),
        time,
    });
}

pub fn has_update_from(updated: &[Updated], source: &str) -> bool {
    updated.iter().any(|u| u.source == source)
}

/// Append a name unless the (name, source) pair is already present.
/// Empty names are dropped.
pub fn append_name(names: &mut Vec<NameEntry>, name: &str, lang: &str, source: &str) {
    if name.is_empty() {
        return;
    }
    if names.iter().any(|n| n.name == name && n.source == source) {
        return;
    }
    names.push(NameEntry {
        name: name.to_string(),
        lang: lang.to_string(),
        source: source.to_string(),
    });
}

/// Append a title unless the (title, source) pair is already present.
pub fn append_title(titles: &mut Vec<TitleEntry>, title: &str, lang: &str, source: &str) {
    if title.is_empty() {
        return;
    }
    if titles.iter().any(|t| t.title == title && t.source == source) {
        return;
    }
    titles.push(TitleEntry {
        title: title.to_string(),
        lang: lang.to_string(),
        source: source.to_string(),
    });
}

/// Append an external id unless the exact (source, id) pair is present.
/// Empty identifiers are never stored.
pub fn append_external_id(ids: &mut Vec<ExternalId>, source: &str, id: IdValue) {
    if id.is_empty() {
        return;
    }
    if ids.iter().any(|e| e.source == source && e.id == id) {
        return;
    }
    ids.push(ExternalId {
        source: source.to_string(),
        id,
    });
}

/// Append a type entry unless this source already contributed one.
pub fn append_type(types: &mut Vec<TypeEntry>, source: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    if types.iter().any(|t| t.source == source) {
        return;
    }
    types.push(TypeEntry {
        source: source.to_string(),
        value: value.to_string(),
    });
}

/// Upsert a ranking observation by (source, from_date, to_date):
/// re-observing the same interval updates `rank` in place.
pub fn upsert_ranking(ranking: &mut Vec<RankingEntry>, entry: RankingEntry) {
    if entry.rank.is_empty() {
        return;
    }
    for existing in ranking.iter_mut() {
        if existing.source == entry.source
            && existing.from_date == entry.from_date
            && existing.to_date == entry.to_date
        {
            existing.rank = entry.rank;
            existing.order = entry.order;
            return;
        }
    }
    ranking.push(entry);
}

/// Widen the interval for (source, rank) to cover `from..to`, or append
/// a fresh entry when the rank was never observed for this source.
///
/// Null bounds never shrink an interval; an entry created from an
/// unparseable observation starts unbounded and picks up real bounds on
/// the next dated observation.
pub fn expand_ranking(
    ranking: &mut Vec<RankingEntry>,
    source: &str,
    rank: &str,
    from: Option<i64>,
    to: Option<i64>,
) {
    if rank.is_empty() {
        return;
    }
    for existing in ranking.iter_mut() {
        if existing.source == source && existing.rank == rank {
            existing.from_date = min_bound(existing.from_date, from);
            existing.to_date = max_bound(existing.to_date, to);
            return;
        }
    }
    ranking.push(RankingEntry {
        from_date: from,
        to_date: to,
        rank: rank.to_string(),
        order: None,
        source: source.to_string(),
    });
}

fn min_bound(a: Option<i64>, b: Option<i64>) -> Option<i64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

fn max_bound(a: Option<i64>, b: Option<i64>) -> Option<i64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

/// Accumulates classification observations for one identifier and folds
/// them into per-rank spans: `[min(t), max(t)]` over every observation
/// sharing the rank value, in first-seen rank order.
#[derive(Debug, Default)]
pub struct RankingSpans {
    spans: Vec<(String, Option<i64>, Option<i64>)>,
}

impl RankingSpans {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, rank: &str, at: Option<i64>) {
        if rank.is_empty() {
            return;
        }
        for (existing, from, to) in self.spans.iter_mut() {
            if existing == rank {
                *from = min_bound(*from, at);
                *to = max_bound(*to, at);
                return;
            }
        }
        self.spans.push((rank.to_string(), at, at));
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Fold the accumulated spans into a ranking list.
    pub fn merge_into(&self, ranking: &mut Vec<RankingEntry>, source: &str) {
        for (rank, from, to) in &self.spans {
            expand_ranking(ranking, source, rank, *from, *to);
        }
    }
}

fn subject_key(subject: &SubjectRef) -> (String, String, Vec<(String, IdValue)>) {
    let mut ids: Vec<(String, IdValue)> = subject
        .external_ids
        .iter()
        .map(|e| (e.source.clone(), e.id.clone()))
        .collect();
    ids.sort();
    (subject.name.clone(), subject.level.clone(), ids)
}

/// Two-level subject merge: find-or-create the block for `source`, then
/// append entries that are new by (name, level, external_ids).
pub fn merge_subjects(subjects: &mut Vec<SubjectBlock>, source: &str, incoming: Vec<SubjectRef>) {
    if incoming.is_empty() {
        return;
    }
    let slot = match subjects.iter().position(|b| b.source == source) {
        Some(slot) => slot,
        None => {
            subjects.push(SubjectBlock {
                source: source.to_string(),
                subjects: Vec::new(),
            });
            subjects.len() - 1
        }
    };
    let block = &mut subjects[slot];

    let mut seen: Vec<_> = block.subjects.iter().map(subject_key).collect();
    for subject in incoming {
        let key = subject_key(&subject);
        if !seen.contains(&key) {
            block.subjects.push(subject);
            seen.push(key);
        }
    }
}

/// First writer wins; later sources only fill absent sub-fields.
pub fn merge_publisher(slot: &mut Option<PublisherRef>, incoming: PublisherRef) {
    if incoming.name.is_empty() && incoming.id.is_none() {
        return;
    }
    match slot {
        None => *slot = Some(incoming),
        Some(existing) => {
            if existing.name.is_empty() {
                existing.name = incoming.name;
            }
            if existing.country_code.is_empty() {
                existing.country_code = incoming.country_code;
            }
            if existing.id.is_none() {
                existing.id = incoming.id;
            }
        }
    }
}

/// Append an affiliation unless one with the same id is attached.
/// Returns whether anything was appended.
pub fn append_affiliation(affiliations: &mut Vec<AffiliationRef>, aff: AffiliationRef) -> bool {
    if affiliations.iter().any(|a| a.id == aff.id) {
        return false;
    }
    affiliations.push(aff);
    true
}

/// Merge an incoming author into the author list.
///
/// Match by resolved person id first; otherwise an existing author is
/// the same person only when the folded names are similar and at least
/// one affiliation id is shared. On a match, new affiliations are
/// attached (deduplicated by id) and an unresolved entry adopts the
/// incoming id and full name. Otherwise the author is appended, keeping
/// the invariant that a resolved id appears at most once.
pub fn merge_author(authors: &mut Vec<Author>, incoming: Author) -> bool {
    if let Some(id) = incoming.id {
        if let Some(existing) = authors.iter_mut().find(|a| a.id == Some(id)) {
            if existing.full_name.is_empty() {
                existing.full_name = incoming.full_name;
            }
            for aff in incoming.affiliations {
                append_affiliation(&mut existing.affiliations, aff);
            }
            return true;
        }
    }

    let incoming_affs: FxHashSet<DocId> =
        incoming.affiliations.iter().map(|a| a.id).collect();
    let incoming_name = fold(&incoming.full_name);

    for existing in authors.iter_mut() {
        if existing.full_name.is_empty() || incoming_name.is_empty() {
            continue;
        }
        // two distinct resolved persons never merge, however similar
        if existing.id.is_some() && incoming.id.is_some() && existing.id != incoming.id {
            continue;
        }
        let name_score = partial_ratio(&fold(&existing.full_name), &incoming_name);
        let shared_affiliation = existing
            .affiliations
            .iter()
            .any(|a| incoming_affs.contains(&a.id));
        if name_score >= AUTHOR_NAME_MATCH && shared_affiliation {
            if existing.id.is_none() {
                existing.id = incoming.id;
                existing.full_name = incoming.full_name;
            }
            for aff in incoming.affiliations {
                append_affiliation(&mut existing.affiliations, aff);
            }
            return true;
        }
    }

    authors.push(incoming);
    false
}

/// Append a group unless its id is already present.
pub fn append_group(groups: &mut Vec<GroupRef>, group: GroupRef) {
    if groups.iter().any(|g| g.id == group.id) {
        return;
    }
    groups.push(group);
}

/// Attach a matched group's "education" relations to the author with
/// `author_id` as additional affiliations, deduplicated by id.
pub fn attach_education_relations(
    authors: &mut [Author],
    author_id: DocId,
    relations: &[Relation],
) {
    let Some(author) = authors.iter_mut().find(|a| a.id == Some(author_id)) else {
        return;
    };
    for relation in relations {
        let is_education = relation
            .types
            .iter()
            .any(|t| t.value.eq_ignore_ascii_case("education"));
        if !is_education {
            continue;
        }
        let Some(rel_id) = relation.id else {
            continue;
        };
        append_affiliation(
            &mut author.affiliations,
            AffiliationRef {
                id: rel_id,
                name: relation.name.clone(),
                types: relation.types.clone(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking(source: &str, from: Option<i64>, to: Option<i64>, rank: &str) -> RankingEntry {
        RankingEntry {
            from_date: from,
            to_date: to,
            rank: rank.to_string(),
            order: None,
            source: source.to_string(),
        }
    }

    #[test]
    fn upsert_updated_refreshes_in_place() {
        let mut updated = Vec::new();
        upsert_updated(&mut updated, "publindex", 100);
        upsert_updated(&mut updated, "scienti", 200);
        upsert_updated(&mut updated, "publindex", 300);
        assert_eq!(updated.len(), 2);
        assert_eq!(updated[0].time, 300);
        assert_eq!(updated[1].time, 200);
    }

    #[test]
    fn append_name_dedups_by_value_and_source() {
        let mut names = Vec::new();
        append_name(&mut names, "Revista A", "es", "publindex");
        append_name(&mut names, "Revista A", "es", "publindex");
        append_name(&mut names, "Revista A", "es", "scienti");
        append_name(&mut names, "", "es", "scienti");
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn append_external_id_dedups_exact_pair() {
        let mut ids = Vec::new();
        append_external_id(&mut ids, "issn", IdValue::plain("1234-5678"));
        append_external_id(&mut ids, "issn", IdValue::plain("1234-5678"));
        assert_eq!(ids.len(), 1);
        append_external_id(&mut ids, "issn_l", IdValue::plain("1234-5678"));
        assert_eq!(ids.len(), 2);
        append_external_id(&mut ids, "scienti", IdValue::plain(""));
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn append_type_dedups_by_source() {
        let mut types = Vec::new();
        append_type(&mut types, "scienti", "Revista");
        append_type(&mut types, "scienti", "Otra");
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].value, "Revista");
    }

    #[test]
    fn upsert_ranking_updates_rank_in_place() {
        let mut list = Vec::new();
        upsert_ranking(&mut list, ranking("publindex", Some(1), Some(2), "A"));
        upsert_ranking(&mut list, ranking("publindex", Some(1), Some(2), "B"));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].rank, "B");
        upsert_ranking(&mut list, ranking("publindex", Some(3), Some(4), "B"));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn upsert_ranking_ignores_empty_rank() {
        let mut list = Vec::new();
        upsert_ranking(&mut list, ranking("publindex", Some(1), Some(2), ""));
        assert!(list.is_empty());
    }

    #[test]
    fn expand_ranking_widens_bounds() {
        let mut list = Vec::new();
        expand_ranking(&mut list, "scienti", "A1", Some(100), Some(100));
        expand_ranking(&mut list, "scienti", "A1", Some(50), Some(50));
        expand_ranking(&mut list, "scienti", "A1", Some(75), Some(75));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].from_date, Some(50));
        assert_eq!(list[0].to_date, Some(100));
    }

    #[test]
    fn expand_ranking_null_bounds_never_shrink() {
        let mut list = Vec::new();
        expand_ranking(&mut list, "scienti", "A1", Some(10), Some(20));
        expand_ranking(&mut list, "scienti", "A1", None, None);
        assert_eq!(list[0].from_date, Some(10));
        assert_eq!(list[0].to_date, Some(20));
    }

    #[test]
    fn ranking_spans_interval_is_order_independent() {
        let (t1, t2) = (1_451_606_400i64, 1_483_228_799i64);

        let mut forward = RankingSpans::new();
        forward.observe("B", Some(t1));
        forward.observe("B", Some(t2));

        let mut backward = RankingSpans::new();
        backward.observe("B", Some(t2));
        backward.observe("B", Some(t1));

        let mut a = Vec::new();
        forward.merge_into(&mut a, "scienti");
        let mut b = Vec::new();
        backward.merge_into(&mut b, "scienti");

        assert_eq!(a, b);
        assert_eq!(a[0].from_date, Some(t1));
        assert_eq!(a[0].to_date, Some(t2));
    }

    #[test]
    fn ranking_spans_keep_rank_order_and_null_dates() {
        let mut spans = RankingSpans::new();
        spans.observe("C", None);
        spans.observe("A1", Some(10));
        spans.observe("C", Some(5));

        let mut list = Vec::new();
        spans.merge_into(&mut list, "scienti");
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].rank, "C");
        assert_eq!(list[0].from_date, Some(5));
        assert_eq!(list[1].rank, "A1");
    }

    fn subject(name: &str, level: &str) -> SubjectRef {
        SubjectRef {
            id: None,
            name: name.to_string(),
            level: level.to_string(),
            external_ids: Vec::new(),
        }
    }

    #[test]
    fn merge_subjects_two_level() {
        let mut subjects = Vec::new();
        merge_subjects(
            &mut subjects,
            "publindex",
            vec![subject("Ciencias", "gran_area")],
        );
        assert_eq!(subjects.len(), 1);
        // same entry again: no growth
        merge_subjects(
            &mut subjects,
            "publindex",
            vec![subject("Ciencias", "gran_area"), subject("Biología", "area")],
        );
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].subjects.len(), 2);
        // other source gets its own block
        merge_subjects(&mut subjects, "openalex", vec![subject("Ciencias", "0")]);
        assert_eq!(subjects.len(), 2);
    }

    #[test]
    fn merge_subjects_distinguishes_external_ids() {
        let mut subjects = Vec::new();
        let mut tagged = subject("Ciencias", "area");
        tagged.external_ids.push(ExternalId {
            source: "publindex_area".to_string(),
            id: IdValue::plain("170"),
        });
        merge_subjects(&mut subjects, "publindex", vec![subject("Ciencias", "area")]);
        merge_subjects(&mut subjects, "publindex", vec![tagged]);
        assert_eq!(subjects[0].subjects.len(), 2);
    }

    #[test]
    fn publisher_first_writer_wins_then_fills() {
        let mut slot = None;
        merge_publisher(
            &mut slot,
            PublisherRef {
                id: None,
                name: "Editorial UdeA".to_string(),
                country_code: String::new(),
            },
        );
        merge_publisher(
            &mut slot,
            PublisherRef {
                id: None,
                name: "Otro Editor".to_string(),
                country_code: "CO".to_string(),
            },
        );
        let publisher = slot.unwrap();
        assert_eq!(publisher.name, "Editorial UdeA");
        assert_eq!(publisher.country_code, "CO");
    }

    #[test]
    fn publisher_empty_incoming_is_ignored() {
        let mut slot = None;
        merge_publisher(&mut slot, PublisherRef::default());
        assert!(slot.is_none());
    }

    fn aff(raw: u64, name: &str) -> AffiliationRef {
        AffiliationRef {
            id: doc_id(raw),
            name: name.to_string(),
            types: Vec::new(),
        }
    }

    fn doc_id(raw: u64) -> DocId {
        // round-trip through serde to build ids in tests
        serde_json::from_str(&raw.to_string()).expect("valid id")
    }

    #[test]
    fn merge_author_by_resolved_id() {
        let mut authors = vec![Author {
            id: Some(doc_id(1)),
            full_name: "Maria Garcia".to_string(),
            affiliations: vec![aff(10, "UdeA")],
            external_ids: Vec::new(),
        }];
        let matched = merge_author(
            &mut authors,
            Author {
                id: Some(doc_id(1)),
                full_name: "Maria Garcia".to_string(),
                affiliations: vec![aff(10, "UdeA"), aff(11, "Grupo X")],
                external_ids: Vec::new(),
            },
        );
        assert!(matched);
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].affiliations.len(), 2);
    }

    #[test]
    fn merge_author_fuzzy_requires_shared_affiliation() {
        let mut authors = vec![Author {
            id: None,
            full_name: "Maria Garcia Lopez".to_string(),
            affiliations: vec![aff(10, "UdeA")],
            external_ids: Vec::new(),
        }];
        // similar name, no shared affiliation → appended as new
        merge_author(
            &mut authors,
            Author {
                id: Some(doc_id(2)),
                full_name: "Maria Garcia".to_string(),
                affiliations: vec![aff(99, "Otra")],
                external_ids: Vec::new(),
            },
        );
        assert_eq!(authors.len(), 2);

        // similar name and shared affiliation → merged, id adopted
        let mut authors = vec![Author {
            id: None,
            full_name: "Maria Garcia Lopez".to_string(),
            affiliations: vec![aff(10, "UdeA")],
            external_ids: Vec::new(),
        }];
        let matched = merge_author(
            &mut authors,
            Author {
                id: Some(doc_id(2)),
                full_name: "Maria Garcia".to_string(),
                affiliations: vec![aff(10, "UdeA"), aff(11, "Grupo X")],
                external_ids: Vec::new(),
            },
        );
        assert!(matched);
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].id, Some(doc_id(2)));
        assert_eq!(authors[0].affiliations.len(), 2);
    }

    #[test]
    fn merge_author_idempotent() {
        let incoming = Author {
            id: Some(doc_id(3)),
            full_name: "Juan Perez".to_string(),
            affiliations: vec![aff(20, "Grupo Y")],
            external_ids: Vec::new(),
        };
        let mut authors = Vec::new();
        merge_author(&mut authors, incoming.clone());
        let once = authors.clone();
        merge_author(&mut authors, incoming);
        assert_eq!(authors, once);
    }

    #[test]
    fn append_group_dedups_by_id() {
        let mut groups = Vec::new();
        append_group(
            &mut groups,
            GroupRef {
                id: doc_id(5),
                name: "Grupo A".to_string(),
            },
        );
        append_group(
            &mut groups,
            GroupRef {
                id: doc_id(5),
                name: "Grupo A (renamed)".to_string(),
            },
        );
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Grupo A");
    }

    #[test]
    fn education_relations_attach_to_matched_author() {
        let mut authors = vec![Author {
            id: Some(doc_id(1)),
            full_name: "Maria Garcia".to_string(),
            affiliations: vec![aff(10, "Grupo X")],
            external_ids: Vec::new(),
        }];
        let relations = vec![
            Relation {
                id: Some(doc_id(30)),
                name: "Universidad de Antioquia".to_string(),
                types: vec![TypeEntry {
                    source: "scienti".to_string(),
                    value: "Education".to_string(),
                }],
                ..Default::default()
            },
            Relation {
                id: Some(doc_id(31)),
                name: "Hospital".to_string(),
                types: vec![TypeEntry {
                    source: "scienti".to_string(),
                    value: "health".to_string(),
                }],
                ..Default::default()
            },
        ];
        attach_education_relations(&mut authors, doc_id(1), &relations);
        assert_eq!(authors[0].affiliations.len(), 2);
        assert!(authors[0].affiliations.iter().any(|a| a.id == doc_id(30)));

        // re-applying changes nothing
        attach_education_relations(&mut authors, doc_id(1), &relations);
        assert_eq!(authors[0].affiliations.len(), 2);

        // unknown author id is a no-op
        attach_education_relations(&mut authors, doc_id(99), &relations);
        assert_eq!(authors.len(), 1);
    }
}
