//! Match-or-create resolution
//!
//! Deterministic resolution walks the candidate's non-empty external
//! identifiers in a fixed order and falls back to an exact-name lookup.
//! The fuzzy path asks the similarity oracle for ranked candidates and
//! applies the dual-threshold duplicate policy: author agreement is
//! strong corroborating evidence that permits a looser title match,
//! while title alone must clear a stricter bar.

use serde::Deserialize;

use mergeline_store::{Collection, DocId, Stored};

use crate::document::SourceDoc;
use crate::identity::SourceIdentity;
use crate::similarity::{Similarity, best_partial_score, fold, ratio};

/// Fuzzy duplicate-policy thresholds, on the [0, 100] score scale.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct Thresholds {
    /// Author partial-ratio at or above which an author is considered
    /// matched.
    pub author: f64,
    /// Title ratio accepted when an author matched.
    pub low: f64,
    /// Title ratio required when no author matched.
    pub high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            author: 70.0,
            low: 90.0,
            high: 95.0,
        }
    }
}

/// Resolve a journal candidate against the sources collection.
///
/// External identifiers first (print ISSN, linking ISSN, vendor id —
/// first hit wins), then an exact display-name lookup. `None` is an
/// explicit "not found", not an error; it drives the insert path.
pub fn resolve_source(
    sources: &Collection<SourceDoc>,
    identity: &SourceIdentity,
) -> Option<Stored<SourceDoc>> {
    let keys = identity.lookup_keys();
    if let Some(hit) = sources.find_one_in(&keys) {
        return Some(hit);
    }
    if identity.name.is_empty() {
        return None;
    }
    sources.find_one_where(|doc| doc.names.iter().any(|n| n.name == identity.name))
}

/// Apply the dual-threshold policy to one ranked candidate.
///
/// `authors` are the incoming record's author names; the original
/// compares the lead author only, and so do we.
pub fn is_duplicate(
    candidate_title: &str,
    candidate_authors: &[String],
    title: &str,
    authors: &[String],
    thresholds: &Thresholds,
) -> bool {
    let author_matched = authors
        .first()
        .filter(|name| !name.is_empty())
        .and_then(|name| best_partial_score(name, candidate_authors))
        .is_some_and(|score| score >= thresholds.author);

    if candidate_title.is_empty() {
        return false;
    }
    let title_score = ratio(&fold(title), &fold(candidate_title));
    if author_matched {
        title_score >= thresholds.low
    } else {
        title_score >= thresholds.high
    }
}

/// Search the oracle and return the first ranked candidate that passes
/// the duplicate policy.
pub fn find_duplicate(
    index: &dyn Similarity,
    title: &str,
    authors: &[String],
    thresholds: &Thresholds,
) -> Option<DocId> {
    if fold(title).is_empty() {
        return None;
    }
    index
        .search(title)
        .iter()
        .find(|hit| is_duplicate(&hit.title, &hit.authors, title, authors, thresholds))
        .map(|hit| hit.id)
}
