//! Canonical store: one collection per entity type

use std::path::Path;

use anyhow::{Context, Result};
use mergeline_store::Collection;

use crate::document::{
    AffiliationDoc, PersonDoc, PublisherDoc, SourceDoc, SubjectDoc, WorkDoc,
};

/// The shared normalized document store all connectors reconcile into.
///
/// Held behind a shared reference and threaded through the pipeline as a
/// parameter — there is no ambient store handle. Collections serialize
/// their own mutations, so workers may share one `CanonicalStore`.
pub struct CanonicalStore {
    pub works: Collection<WorkDoc>,
    pub sources: Collection<SourceDoc>,
    pub affiliations: Collection<AffiliationDoc>,
    pub publishers: Collection<PublisherDoc>,
    pub person: Collection<PersonDoc>,
    pub subjects: Collection<SubjectDoc>,
}

impl CanonicalStore {
    pub fn new() -> Self {
        Self {
            works: Collection::new("works"),
            sources: Collection::new("sources"),
            affiliations: Collection::new("affiliations"),
            publishers: Collection::new("publishers"),
            person: Collection::new("person"),
            subjects: Collection::new("subjects"),
        }
    }

    /// Open a store directory, loading any collection snapshots present.
    ///
    /// A missing directory or missing snapshot files mean an empty store;
    /// an unreadable file is a configuration error and aborts the run.
    pub fn open(dir: &Path) -> Result<Self> {
        let store = Self::new();
        if !dir.exists() {
            log::debug!("store dir {} does not exist, starting empty", dir.display());
            return Ok(store);
        }

        load_if_present(&store.works, dir)?;
        load_if_present(&store.sources, dir)?;
        load_if_present(&store.affiliations, dir)?;
        load_if_present(&store.publishers, dir)?;
        load_if_present(&store.person, dir)?;
        load_if_present(&store.subjects, dir)?;
        Ok(store)
    }

    /// Write every collection snapshot under `dir`.
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create store dir {}", dir.display()))?;
        self.works.save_jsonl(&dir.join("works.jsonl"))?;
        self.sources.save_jsonl(&dir.join("sources.jsonl"))?;
        self.affiliations
            .save_jsonl(&dir.join("affiliations.jsonl"))?;
        self.publishers.save_jsonl(&dir.join("publishers.jsonl"))?;
        self.person.save_jsonl(&dir.join("person.jsonl"))?;
        self.subjects.save_jsonl(&dir.join("subjects.jsonl"))?;
        Ok(())
    }

    /// Collection names and document counts, in a fixed display order.
    pub fn counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("works", self.works.len()),
            ("sources", self.sources.len()),
            ("affiliations", self.affiliations.len()),
            ("publishers", self.publishers.len()),
            ("person", self.person.len()),
            ("subjects", self.subjects.len()),
        ]
    }
}

impl Default for CanonicalStore {
    fn default() -> Self {
        Self::new()
    }
}

fn load_if_present<T>(collection: &Collection<T>, dir: &Path) -> Result<()>
where
    T: mergeline_store::Record + serde::Serialize + serde::de::DeserializeOwned,
{
    let path = dir.join(format!("{}.jsonl", collection.name()));
    if path.exists() {
        let count = collection
            .load_jsonl(&path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        log::info!("{}: {} documents", collection.name(), count);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ExternalId, SourceDoc};
    use mergeline_store::IdValue;

    #[test]
    fn open_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CanonicalStore::open(&dir.path().join("nope")).unwrap();
        assert!(store.sources.is_empty());
    }

    #[test]
    fn save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = CanonicalStore::new();
        let id = store.sources.insert_one(SourceDoc {
            external_ids: vec![ExternalId {
                source: "issn".to_string(),
                id: IdValue::plain("1234-5678"),
            }],
            ..Default::default()
        });
        store.save(dir.path()).unwrap();

        let reopened = CanonicalStore::open(dir.path()).unwrap();
        assert_eq!(reopened.sources.len(), 1);
        assert_eq!(
            reopened
                .sources
                .find_one(&IdValue::plain("1234-5678"))
                .unwrap()
                .id,
            id
        );
    }

    #[test]
    fn counts_cover_all_collections() {
        let store = CanonicalStore::new();
        let counts = store.counts();
        assert_eq!(counts.len(), 6);
        assert!(counts.iter().all(|(_, n)| *n == 0));
    }
}
