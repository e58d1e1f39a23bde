//! Keyed document collection with external-id indexing

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cursor::Cursor;
use crate::error::StoreError;
use crate::key::{DocId, IdValue};

/// A document type that can live in a [`Collection`].
///
/// `index_keys` returns the external identifier values the store indexes
/// for keyed lookup. Empty values are dropped at indexing time, so an
/// empty identifier can never match another empty identifier.
pub trait Record: Clone + Default + Send + Sync + 'static {
    fn index_keys(&self) -> Vec<IdValue>;
}

/// A document together with its store-assigned id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stored<T> {
    #[serde(rename = "_id")]
    pub id: DocId,
    #[serde(flatten)]
    pub doc: T,
}

struct Inner<T> {
    docs: BTreeMap<DocId, T>,
    // external id value → ids in insertion order
    by_external: FxHashMap<IdValue, Vec<DocId>>,
}

impl<T> Default for Inner<T> {
    fn default() -> Self {
        Self {
            docs: BTreeMap::new(),
            by_external: FxHashMap::default(),
        }
    }
}

/// In-process document collection.
///
/// Lookups take the read lock; insert/update take the write lock, so a
/// per-document mutation never interleaves with another writer. The
/// external-id index is maintained on every mutation.
pub struct Collection<T> {
    name: String,
    inner: RwLock<Inner<T>>,
    next_id: AtomicU64,
    open_cursors: Arc<AtomicUsize>,
}

impl<T: Record> Collection<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: RwLock::new(Inner::default()),
            next_id: AtomicU64::new(1),
            open_cursors: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.read().docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a new document and return its store-assigned id.
    pub fn insert_one(&self, doc: T) -> DocId {
        let id = DocId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut inner = self.write();
        index_doc(&mut inner.by_external, &doc, id);
        inner.docs.insert(id, doc);
        id
    }

    pub fn find_by_id(&self, id: DocId) -> Option<T> {
        self.read().docs.get(&id).cloned()
    }

    /// Find the first document indexed under `key` (insertion order).
    pub fn find_one(&self, key: &IdValue) -> Option<Stored<T>> {
        if key.is_empty() {
            return None;
        }
        let inner = self.read();
        let id = *inner.by_external.get(key)?.first()?;
        inner.docs.get(&id).map(|doc| Stored {
            id,
            doc: doc.clone(),
        })
    }

    /// Check candidate keys in caller order; first hit wins.
    ///
    /// This is the deterministic "any of these identifiers" lookup the
    /// resolver builds on: callers fix the order, the store fixes the
    /// tie-break within one key.
    pub fn find_one_in(&self, keys: &[IdValue]) -> Option<Stored<T>> {
        keys.iter().find_map(|k| self.find_one(k))
    }

    /// Linear predicate lookup, lowest id first.
    pub fn find_one_where(&self, pred: impl Fn(&T) -> bool) -> Option<Stored<T>> {
        let inner = self.read();
        inner
            .docs
            .iter()
            .find(|(_, doc)| pred(doc))
            .map(|(id, doc)| Stored {
                id: *id,
                doc: doc.clone(),
            })
    }

    /// Mutate one document under the collection write lock.
    ///
    /// The closure runs while the lock is held; no other reader or writer
    /// observes a partially applied update. Index entries are refreshed
    /// after the closure returns.
    pub fn update_one(&self, id: DocId, apply: impl FnOnce(&mut T)) -> Result<(), StoreError> {
        let mut inner = self.write();
        let Some(doc) = inner.docs.get(&id).cloned() else {
            return Err(StoreError::UnknownId {
                collection: self.name.clone(),
                id,
            });
        };
        unindex_doc(&mut inner.by_external, &doc, id);
        let mut doc = doc;
        apply(&mut doc);
        index_doc(&mut inner.by_external, &doc, id);
        inner.docs.insert(id, doc);
        Ok(())
    }

    /// Replace one document wholesale under the write lock.
    pub fn replace_one(&self, id: DocId, doc: T) -> Result<(), StoreError> {
        self.update_one(id, |slot| *slot = doc)
    }

    /// Snapshot cursor over the collection.
    ///
    /// The cursor never times out and holds no lock; it must be closed,
    /// which happens on drop, so scoped use is safe on every exit path.
    pub fn cursor(&self) -> Cursor<T> {
        let inner = self.read();
        let items: Vec<Stored<T>> = inner
            .docs
            .iter()
            .map(|(id, doc)| Stored {
                id: *id,
                doc: doc.clone(),
            })
            .collect();
        drop(inner);
        Cursor::open(items, Arc::clone(&self.open_cursors))
    }

    /// Number of cursors currently open on this collection.
    pub fn open_cursor_count(&self) -> usize {
        self.open_cursors.load(Ordering::Relaxed)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner<T>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner<T>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn restore(&self, stored: Vec<Stored<T>>) {
        let mut inner = self.write();
        let mut max_raw = 0u64;
        for entry in stored {
            max_raw = max_raw.max(entry.id.raw());
            index_doc(&mut inner.by_external, &entry.doc, entry.id);
            inner.docs.insert(entry.id, entry.doc);
        }
        drop(inner);
        let floor = max_raw + 1;
        self.next_id.fetch_max(floor, Ordering::Relaxed);
    }
}

fn index_doc<T: Record>(index: &mut FxHashMap<IdValue, Vec<DocId>>, doc: &T, id: DocId) {
    for key in doc.index_keys() {
        if key.is_empty() {
            continue;
        }
        let ids = index.entry(key).or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
}

fn unindex_doc<T: Record>(index: &mut FxHashMap<IdValue, Vec<DocId>>, doc: &T, id: DocId) {
    for key in doc.index_keys() {
        if let Some(ids) = index.get_mut(&key) {
            ids.retain(|existing| *existing != id);
            if ids.is_empty() {
                index.remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Doc {
        keys: Vec<String>,
        payload: String,
    }

    impl Record for Doc {
        fn index_keys(&self) -> Vec<IdValue> {
            self.keys.iter().map(|k| IdValue::plain(k.clone())).collect()
        }
    }

    fn doc(keys: &[&str], payload: &str) -> Doc {
        Doc {
            keys: keys.iter().map(|s| s.to_string()).collect(),
            payload: payload.to_string(),
        }
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let coll = Collection::new("test");
        let a = coll.insert_one(doc(&["a"], "first"));
        let b = coll.insert_one(doc(&["b"], "second"));
        assert!(a < b);
        assert_eq!(coll.len(), 2);
    }

    #[test]
    fn find_one_by_external_id() {
        let coll = Collection::new("test");
        coll.insert_one(doc(&["1234-5678"], "journal"));
        let hit = coll.find_one(&IdValue::plain("1234-5678")).unwrap();
        assert_eq!(hit.doc.payload, "journal");
        assert!(coll.find_one(&IdValue::plain("0000-0000")).is_none());
    }

    #[test]
    fn empty_key_never_matches() {
        let coll = Collection::new("test");
        coll.insert_one(doc(&[""], "unkeyed"));
        assert!(coll.find_one(&IdValue::plain("")).is_none());
    }

    #[test]
    fn find_one_in_respects_caller_order() {
        let coll = Collection::new("test");
        coll.insert_one(doc(&["issn-a"], "by-issn"));
        coll.insert_one(doc(&["vendor-7"], "by-vendor"));
        let hit = coll
            .find_one_in(&[
                IdValue::plain("vendor-7"),
                IdValue::plain("issn-a"),
            ])
            .unwrap();
        assert_eq!(hit.doc.payload, "by-vendor");
    }

    #[test]
    fn find_one_first_inserted_wins() {
        let coll = Collection::new("test");
        coll.insert_one(doc(&["dup"], "older"));
        coll.insert_one(doc(&["dup"], "newer"));
        let hit = coll.find_one(&IdValue::plain("dup")).unwrap();
        assert_eq!(hit.doc.payload, "older");
    }

    #[test]
    fn update_one_reindexes() {
        let coll = Collection::new("test");
        let id = coll.insert_one(doc(&["old-key"], "x"));
        coll.update_one(id, |d| {
            d.keys = vec!["new-key".to_string()];
        })
        .unwrap();
        assert!(coll.find_one(&IdValue::plain("old-key")).is_none());
        assert_eq!(coll.find_one(&IdValue::plain("new-key")).unwrap().id, id);
    }

    #[test]
    fn update_unknown_id_errors() {
        let coll: Collection<Doc> = Collection::new("test");
        let err = coll.update_one(DocId::from_raw(99), |_| {}).unwrap_err();
        assert!(matches!(err, StoreError::UnknownId { .. }));
    }

    #[test]
    fn find_one_where_predicate() {
        let coll = Collection::new("test");
        coll.insert_one(doc(&["k1"], "alpha"));
        coll.insert_one(doc(&["k2"], "beta"));
        let hit = coll.find_one_where(|d| d.payload == "beta").unwrap();
        assert_eq!(hit.doc.keys, vec!["k2".to_string()]);
        assert!(coll.find_one_where(|d| d.payload == "gamma").is_none());
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Product {
        person: String,
        product: String,
    }

    impl Record for Product {
        fn index_keys(&self) -> Vec<IdValue> {
            vec![IdValue::composite([
                ("COD_RH", self.person.clone()),
                ("COD_PRODUCTO", self.product.clone()),
            ])]
        }
    }

    #[test]
    fn composite_keys_match_exactly() {
        let products: Collection<Product> = Collection::new("products");
        products.insert_one(Product {
            person: "0000123456".to_string(),
            product: "12".to_string(),
        });

        let key = IdValue::composite([("COD_RH", "0000123456"), ("COD_PRODUCTO", "12")]);
        assert!(products.find_one(&key).is_some());
        let other = IdValue::composite([("COD_RH", "0000123456"), ("COD_PRODUCTO", "13")]);
        assert!(products.find_one(&other).is_none());
    }

    #[test]
    fn cursor_snapshot_and_close() {
        let coll = Collection::new("test");
        coll.insert_one(doc(&["a"], "1"));
        coll.insert_one(doc(&["b"], "2"));

        let mut cursor = coll.cursor();
        assert_eq!(coll.open_cursor_count(), 1);
        // inserts after the snapshot are not visible
        coll.insert_one(doc(&["c"], "3"));
        assert_eq!(cursor.by_ref().count(), 2);
        cursor.close();
        assert_eq!(coll.open_cursor_count(), 0);
    }

    #[test]
    fn cursor_closes_on_drop() {
        let coll = Collection::new("test");
        coll.insert_one(doc(&["a"], "1"));
        {
            let _cursor = coll.cursor();
            assert_eq!(coll.open_cursor_count(), 1);
        }
        assert_eq!(coll.open_cursor_count(), 0);
    }
}
