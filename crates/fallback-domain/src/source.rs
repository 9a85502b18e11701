//! Queryable sources: the single point of interaction with a backing store.

use crate::predicate::Predicate;
use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};

/// A dataset that can be filtered and materialized in one request.
///
/// `fetch` is the round trip. Implementations return matching elements in the
/// backend's own order and must not impose an order of their own unless they
/// were configured to.
pub trait QuerySource<F: ?Sized> {
    type Item;
    type Error;

    fn fetch(&self, filter: &F) -> Result<Vec<Self::Item>, Self::Error>;
}

impl<F: ?Sized, S: QuerySource<F> + ?Sized> QuerySource<F> for &S {
    type Item = S::Item;
    type Error = S::Error;

    fn fetch(&self, filter: &F) -> Result<Vec<Self::Item>, Self::Error> {
        (**self).fetch(filter)
    }
}

/// In-process source over a vector; fetch preserves insertion order.
#[derive(Clone, Debug, Default)]
pub struct MemorySource<T> {
    items: Vec<T>,
}

impl<T> MemorySource<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }
}

impl<T> FromIterator<T> for MemorySource<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T: Clone, F: Predicate<T> + ?Sized> QuerySource<F> for MemorySource<T> {
    type Item = T;
    type Error = Infallible;

    fn fetch(&self, filter: &F) -> Result<Vec<T>, Infallible> {
        Ok(self
            .items
            .iter()
            .filter(|item| filter.evaluate(item))
            .cloned()
            .collect())
    }
}

/// Wraps a source and counts fetches and materialized rows.
///
/// Counters are atomics so the wrapper is as shareable as the source it wraps.
#[derive(Debug, Default)]
pub struct CountingSource<S> {
    inner: S,
    fetches: AtomicU64,
    rows: AtomicU64,
}

impl<S> CountingSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fetches: AtomicU64::new(0),
            rows: AtomicU64::new(0),
        }
    }

    /// Fetches issued so far, successful or not.
    pub fn fetches(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Rows returned by successful fetches so far.
    pub fn rows_fetched(&self) -> u64 {
        self.rows.load(Ordering::Relaxed)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<F: ?Sized, S: QuerySource<F>> QuerySource<F> for CountingSource<S> {
    type Item = S::Item;
    type Error = S::Error;

    fn fetch(&self, filter: &F) -> Result<Vec<Self::Item>, Self::Error> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let rows = self.inner.fetch(filter)?;
        self.rows.fetch_add(rows.len() as u64, Ordering::Relaxed);
        Ok(rows)
    }
}
