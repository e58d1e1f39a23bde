//! Fuzzy scoring oracle and title search index
//!
//! Scores are on the [0, 100] scale the matching thresholds are written
//! against. The search side is behind the [`Similarity`] trait; the
//! bundled [`TitleIndex`] is a linear in-memory index seeded from the
//! canonical works collection and kept current as inserts happen.

use std::sync::RwLock;

use mergeline_store::{Collection, DocId};

use crate::document::WorkDoc;

/// How many ranked candidates a search returns.
const SEARCH_LIMIT: usize = 10;

/// Normalize a string for fuzzy comparison: lowercase, drop periods,
/// fold the common Latin diacritics, collapse whitespace.
pub fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let folded = match c {
            'á' | 'à' | 'ä' | 'â' | 'Á' | 'À' | 'Ä' | 'Â' => 'a',
            'é' | 'è' | 'ë' | 'ê' | 'É' | 'È' | 'Ë' | 'Ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' | 'Í' | 'Ì' | 'Ï' | 'Î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'Ó' | 'Ò' | 'Ö' | 'Ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' | 'Ú' | 'Ù' | 'Ü' | 'Û' => 'u',
            'ñ' | 'Ñ' => 'n',
            'ç' | 'Ç' => 'c',
            '.' => continue,
            _ => c,
        };
        out.extend(folded.to_lowercase());
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Full-string similarity in [0, 100].
pub fn ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Best similarity of the shorter string against every same-length
/// window of the longer one, in [0, 100]. High when one string is
/// contained (approximately) in the other.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }

    let long_chars: Vec<char> = long.chars().collect();
    let window = short.chars().count();
    let mut best = 0.0f64;
    for start in 0..=(long_chars.len() - window) {
        let slice: String = long_chars[start..start + window].iter().collect();
        best = best.max(ratio(short, &slice));
        if best >= 100.0 {
            break;
        }
    }
    best
}

/// Best partial-ratio of `needle` against any of `candidates`, after
/// folding both sides. `None` when there is nothing to compare.
pub fn best_partial_score(needle: &str, candidates: &[String]) -> Option<f64> {
    let needle = fold(needle);
    if needle.is_empty() || candidates.is_empty() {
        return None;
    }
    candidates
        .iter()
        .map(|c| partial_ratio(&needle, &fold(c)))
        .fold(None, |acc: Option<f64>, s| {
            Some(acc.map_or(s, |a| a.max(s)))
        })
}

/// One ranked candidate from a title search.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: DocId,
    pub title: String,
    pub authors: Vec<String>,
    pub score: f64,
}

/// Rank-ordered candidate retrieval over work titles.
pub trait Similarity: Send + Sync {
    /// Candidates for `title`, best first.
    fn search(&self, title: &str) -> Vec<SearchHit>;

    /// Make a newly inserted work findable by later records in the same
    /// run.
    fn insert(&self, id: DocId, title: &str, authors: Vec<String>);
}

struct IndexEntry {
    id: DocId,
    title: String,
    folded_title: String,
    authors: Vec<String>,
}

/// In-memory similarity index over work titles.
///
/// Linear scoring with [`ratio`]; callers treat it as the rank-ordered
/// oracle it is. Seeded from the canonical works collection, extended on
/// insert, safe to share across workers.
pub struct TitleIndex {
    entries: RwLock<Vec<IndexEntry>>,
}

impl TitleIndex {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Seed from every work currently in the collection.
    pub fn from_works(works: &Collection<WorkDoc>) -> Self {
        let index = Self::new();
        let cursor = works.cursor();
        for entry in cursor {
            let Some(title) = entry.doc.titles.first() else {
                continue;
            };
            let authors = entry
                .doc
                .authors
                .iter()
                .filter(|a| !a.full_name.is_empty())
                .map(|a| a.full_name.clone())
                .collect();
            index.insert(entry.id, &title.title, authors);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<IndexEntry>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for TitleIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl Similarity for TitleIndex {
    fn search(&self, title: &str) -> Vec<SearchHit> {
        let folded = fold(title);
        if folded.is_empty() {
            return Vec::new();
        }
        let entries = self.read();
        let mut hits: Vec<SearchHit> = entries
            .iter()
            .map(|e| SearchHit {
                id: e.id,
                title: e.title.clone(),
                authors: e.authors.clone(),
                score: ratio(&folded, &e.folded_title),
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(SEARCH_LIMIT);
        hits
    }

    fn insert(&self, id: DocId, title: &str, authors: Vec<String>) {
        let folded_title = fold(title);
        if folded_title.is_empty() {
            return;
        }
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.push(IndexEntry {
            id,
            title: title.to_string(),
            folded_title,
            authors,
        });
    }
}
