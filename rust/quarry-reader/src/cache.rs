//! Per-worker caches.
//!
//! A [`WorkerCacheSet`] is owned by exactly one worker and is never shared or
//! synchronized across workers. Each of its four containers is created
//! lazily on first mutable access, and all of them are emptied together by
//! [`WorkerCacheSet::clear_all`], the single invalidation primitive.

use std::sync::Arc;

use ahash::AHashMap;
use quarry_bits::BitSet;

use crate::{document::MaterializedDocument, norms::NormArray};

/// A term: a field name plus its text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Term {
    pub field: String,
    pub text: String,
}

impl Term {
    pub fn new(field: impl Into<String>, text: impl Into<String>) -> Term {
        Term {
            field: field.into(),
            text: text.into(),
        }
    }
}

/// Sizes of the caches, `None` for a cache not yet created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub documents: Option<usize>,
    pub term_cursors: Option<usize>,
    pub field_norms: Option<usize>,
    pub observed: Option<usize>,
}

/// The document, term-cursor, field-norm and observed-ordinal caches of one
/// worker.
///
/// `C` is the opaque term cursor type of the term enumeration collaborator;
/// this set stores and returns cursors but never inspects them.
pub struct WorkerCacheSet<C> {
    capacity_bound: usize,
    documents: Option<AHashMap<u32, Arc<MaterializedDocument>>>,
    term_cursors: Option<AHashMap<Term, C>>,
    field_norms: Option<AHashMap<String, NormArray>>,
    observed: Option<BitSet>,
}

impl<C> WorkerCacheSet<C> {
    /// Creates an empty cache set whose observed-ordinal bit set will hold
    /// `capacity_bound` bits once created.
    pub fn new(capacity_bound: usize) -> WorkerCacheSet<C> {
        WorkerCacheSet {
            capacity_bound,
            documents: None,
            term_cursors: None,
            field_norms: None,
            observed: None,
        }
    }

    pub fn capacity_bound(&self) -> usize {
        self.capacity_bound
    }

    pub fn documents_mut(&mut self) -> &mut AHashMap<u32, Arc<MaterializedDocument>> {
        self.documents.get_or_insert_with(AHashMap::new)
    }

    pub fn term_cursors_mut(&mut self) -> &mut AHashMap<Term, C> {
        self.term_cursors.get_or_insert_with(AHashMap::new)
    }

    pub fn field_norms_mut(&mut self) -> &mut AHashMap<String, NormArray> {
        self.field_norms.get_or_insert_with(AHashMap::new)
    }

    pub fn observed_mut(&mut self) -> &mut BitSet {
        let capacity = self.capacity_bound;
        self.observed.get_or_insert_with(|| BitSet::new(capacity))
    }

    /// Cached document for `ordinal`. A cache not yet created reads as empty.
    pub fn document(&self, ordinal: u32) -> Option<&Arc<MaterializedDocument>> {
        self.documents.as_ref()?.get(&ordinal)
    }

    pub fn contains_document(&self, ordinal: u32) -> bool {
        self.document(ordinal).is_some()
    }

    pub fn check_term_cursor(&self, term: &Term) -> Option<&C> {
        self.term_cursors.as_ref()?.get(term)
    }

    pub fn put_term_cursor(&mut self, term: Term, cursor: C) {
        self.term_cursors_mut().insert(term, cursor);
    }

    pub fn norms(&self, field: &str) -> Option<&NormArray> {
        self.field_norms.as_ref()?.get(field)
    }

    /// Returns `true` if `ordinal` was observed during norm accumulation in
    /// the current epoch.
    pub fn is_observed(&self, ordinal: u32) -> bool {
        self.observed
            .as_ref()
            .is_some_and(|bits| bits.contains(ordinal as usize))
    }

    /// Number of ordinals observed in the current epoch.
    pub fn observed_count(&self) -> usize {
        self.observed.as_ref().map_or(0, BitSet::count_ones)
    }

    /// Empties every cache and resets the observed bits up to the capacity
    /// bound. Idempotent.
    pub fn clear_all(&mut self) {
        if let Some(documents) = self.documents.as_mut() {
            documents.clear();
        }
        if let Some(cursors) = self.term_cursors.as_mut() {
            cursors.clear();
        }
        if let Some(norms) = self.field_norms.as_mut() {
            norms.clear();
        }
        if let Some(observed) = self.observed.as_mut() {
            observed.reset_range(0..self.capacity_bound);
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            documents: self.documents.as_ref().map(|c| c.len()),
            term_cursors: self.term_cursors.as_ref().map(|c| c.len()),
            field_norms: self.field_norms.as_ref().map(|c| c.len()),
            observed: self.observed.as_ref().map(BitSet::count_ones),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{FieldValue, StoredField};

    fn doc(ordinal: u32) -> Arc<MaterializedDocument> {
        Arc::new(MaterializedDocument::new(
            ordinal,
            vec![StoredField::new("id", FieldValue::Text(ordinal.to_string()))],
        ))
    }

    #[test]
    fn test_caches_are_created_lazily_and_independently() {
        let mut caches = WorkerCacheSet::<u32>::new(16);
        assert_eq!(caches.stats(), CacheStats::default());
        assert!(caches.document(3).is_none());
        assert!(caches.norms("title").is_none());
        assert!(caches.check_term_cursor(&Term::new("f", "t")).is_none());
        assert!(!caches.is_observed(3));
        assert_eq!(caches.stats(), CacheStats::default());

        caches.documents_mut();
        assert_eq!(
            caches.stats(),
            CacheStats {
                documents: Some(0),
                ..Default::default()
            }
        );

        caches.observed_mut().set(15);
        assert_eq!(caches.stats().observed, Some(1));
        assert_eq!(caches.stats().term_cursors, None);
        assert_eq!(caches.observed_mut().len(), 16);
    }

    #[test]
    fn test_clear_all_empties_every_cache() {
        let mut caches = WorkerCacheSet::<u32>::new(8);
        caches.documents_mut().insert(1, doc(1));
        caches.put_term_cursor(Term::new("title", "rust"), 7);
        caches
            .field_norms_mut()
            .insert("title".to_string(), NormArray::new(4));
        caches.observed_mut().set(0);
        caches.observed_mut().set(7);

        assert!(caches.contains_document(1));
        assert_eq!(caches.check_term_cursor(&Term::new("title", "rust")), Some(&7));
        assert!(caches.norms("title").is_some());
        assert_eq!(caches.observed_count(), 2);

        caches.clear_all();

        assert!(!caches.contains_document(1));
        assert!(caches.check_term_cursor(&Term::new("title", "rust")).is_none());
        assert!(caches.norms("title").is_none());
        assert!(!caches.is_observed(0));
        assert_eq!(caches.observed_count(), 0);
        assert_eq!(
            caches.stats(),
            CacheStats {
                documents: Some(0),
                term_cursors: Some(0),
                field_norms: Some(0),
                observed: Some(0),
            }
        );
    }

    #[test]
    fn test_clear_all_is_idempotent() {
        let mut caches = WorkerCacheSet::<()>::new(4);
        caches.clear_all();
        caches.clear_all();
        assert_eq!(caches.stats(), CacheStats::default());
    }
}
