//! Snapshot cursors with explicit close semantics

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::collection::Stored;

/// Snapshot cursor over a collection.
///
/// The cursor holds no lock and never expires. It must be closed when the
/// caller is done; closing also happens on drop, so a cursor opened inside
/// a scope is released on every exit path, including panics.
pub struct Cursor<T> {
    items: std::vec::IntoIter<Stored<T>>,
    open_count: Arc<AtomicUsize>,
    closed: bool,
}

impl<T> Cursor<T> {
    pub(crate) fn open(items: Vec<Stored<T>>, open_count: Arc<AtomicUsize>) -> Self {
        open_count.fetch_add(1, Ordering::Relaxed);
        Self {
            items: items.into_iter(),
            open_count,
            closed: false,
        }
    }

    /// Documents remaining in the snapshot.
    pub fn remaining(&self) -> usize {
        self.items.len()
    }

    /// Close the cursor explicitly.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.open_count.fetch_sub(1, Ordering::Relaxed);
        }
    }
}

impl<T> Iterator for Cursor<T> {
    type Item = Stored<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<T> Drop for Cursor<T> {
    fn drop(&mut self) {
        self.release();
    }
}
