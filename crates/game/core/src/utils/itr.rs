//! Lazy iterator wrapper used by every collection accessor in the core.
//!
//! `Itr` adapts any [`Iterator`] and exposes the small combinator vocabulary
//! the logic tree is written against. Adapters (`map`, `filter`, `take`,
//! `drop`) are lazy; consumers (`reduce`, `find`, `some`, `every`,
//! `for_each`, `to_vec`) drive the underlying iterator.
//!
//! An `Itr` borrowing a [`SohlMap`](super::SohlMap) holds a shared borrow, so
//! the map cannot be mutated while the iteration is alive. Collect first when
//! a traversal needs to add or remove entries.

use std::iter::{Filter, Map, Skip, Take};

/// Lazy iterator adapter.
#[derive(Clone, Debug)]
pub struct Itr<I> {
    inner: I,
}

impl<I: Iterator> Itr<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }

    /// Yields at most `n` items.
    pub fn take(self, n: usize) -> Itr<Take<I>> {
        Itr::new(self.inner.take(n))
    }

    /// Skips the first `n` items.
    pub fn drop(self, n: usize) -> Itr<Skip<I>> {
        Itr::new(self.inner.skip(n))
    }

    pub fn map<B, F>(self, f: F) -> Itr<Map<I, F>>
    where
        F: FnMut(I::Item) -> B,
    {
        Itr::new(self.inner.map(f))
    }

    pub fn filter<P>(self, predicate: P) -> Itr<Filter<I, P>>
    where
        P: FnMut(&I::Item) -> bool,
    {
        Itr::new(self.inner.filter(predicate))
    }

    /// Folds every item into an accumulator, left to right.
    pub fn reduce<B, F>(self, init: B, f: F) -> B
    where
        F: FnMut(B, I::Item) -> B,
    {
        self.inner.fold(init, f)
    }

    pub fn find<P>(mut self, mut predicate: P) -> Option<I::Item>
    where
        P: FnMut(&I::Item) -> bool,
    {
        self.inner.find(|item| predicate(item))
    }

    /// True if any item satisfies `predicate`. Stops at the first match.
    pub fn some<P>(mut self, predicate: P) -> bool
    where
        P: FnMut(I::Item) -> bool,
    {
        self.inner.any(predicate)
    }

    /// True if every item satisfies `predicate`. Empty iterators yield true.
    pub fn every<P>(mut self, predicate: P) -> bool
    where
        P: FnMut(I::Item) -> bool,
    {
        self.inner.all(predicate)
    }

    pub fn for_each<F>(self, f: F)
    where
        F: FnMut(I::Item),
    {
        self.inner.for_each(f)
    }

    pub fn to_vec(self) -> Vec<I::Item> {
        self.inner.collect()
    }
}

impl<I: Iterator> Iterator for Itr<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
