//! Insertion-ordered map used for every child collection in the logic tree.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use super::Itr;

/// Map that remembers insertion order.
///
/// Replacing the value of an existing key keeps its position; removing a key
/// shifts later entries down. Iteration always follows insertion order, which
/// the recompute pipeline relies on for stable results.
#[derive(Clone, Debug)]
pub struct SohlMap<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K, V> SohlMap<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.index.contains_key(key)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        match self.index.get(key) {
            Some(&i) => Some(&mut self.entries[i].1),
            None => None,
        }
    }

    /// Inserts or replaces. Returns the previous value for `key`, if any.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&i) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[i].1, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    /// Inserts only if `key` is absent. Returns true if the value was stored.
    pub fn insert_if_absent(&mut self, key: K, value: V) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.set(key, value);
        true
    }

    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let position = self.index.remove(key)?;
        let (_, value) = self.entries.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(value)
    }

    /// Inserts or replaces, then hands back the stored value.
    pub fn upsert(&mut self, key: K, value: V) -> &mut V {
        let position = match self.index.get(&key) {
            Some(&i) => {
                self.entries[i].1 = value;
                i
            }
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                self.entries.len() - 1
            }
        };
        &mut self.entries[position].1
    }

    /// Removes every entry matching `predicate`, keeping the order of the
    /// rest. Returns the removed entries in their original order.
    pub fn remove_where<P>(&mut self, mut predicate: P) -> Vec<(K, V)>
    where
        P: FnMut(&K, &V) -> bool,
    {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|(k, v)| predicate(k, v));
        self.index = kept
            .iter()
            .enumerate()
            .map(|(i, (k, _))| (k.clone(), i))
            .collect();
        self.entries = kept;
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn keys(&self) -> Itr<impl Iterator<Item = &K>> {
        Itr::new(self.entries.iter().map(|(k, _)| k))
    }

    pub fn values(&self) -> Itr<impl Iterator<Item = &V>> {
        Itr::new(self.entries.iter().map(|(_, v)| v))
    }

    pub fn values_mut(&mut self) -> Itr<impl Iterator<Item = &mut V>> {
        Itr::new(self.entries.iter_mut().map(|(_, v)| v))
    }

    pub fn entries(&self) -> Itr<impl Iterator<Item = (&K, &V)>> {
        Itr::new(self.entries.iter().map(|(k, v)| (k, v)))
    }

    /// Maps every value in order into a vector.
    pub fn map<B, F>(&self, mut f: F) -> Vec<B>
    where
        F: FnMut(&V, &K) -> B,
    {
        self.entries.iter().map(|(k, v)| f(v, k)).collect()
    }

    /// Returns a new map holding the entries that satisfy `predicate`.
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&V, &K) -> bool,
        V: Clone,
    {
        self.entries
            .iter()
            .filter(|(k, v)| predicate(v, k))
            .cloned()
            .collect()
    }

    /// Returns a new map without the first `n` entries.
    pub fn drop(&self, n: usize) -> Self
    where
        V: Clone,
    {
        self.entries.iter().skip(n).cloned().collect()
    }

    /// Returns a new map with only the first `n` entries.
    pub fn take(&self, n: usize) -> Self
    where
        V: Clone,
    {
        self.entries.iter().take(n).cloned().collect()
    }

    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&V, &K),
    {
        for (k, v) in &self.entries {
            f(v, k);
        }
    }

    pub fn reduce<B, F>(&self, init: B, mut f: F) -> B
    where
        F: FnMut(B, &V, &K) -> B,
    {
        self.entries.iter().fold(init, |acc, (k, v)| f(acc, v, k))
    }

    pub fn find<P>(&self, mut predicate: P) -> Option<&V>
    where
        P: FnMut(&V, &K) -> bool,
    {
        self.entries
            .iter()
            .find(|(k, v)| predicate(v, k))
            .map(|(_, v)| v)
    }

    pub fn some<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&V, &K) -> bool,
    {
        self.entries.iter().any(|(k, v)| predicate(v, k))
    }

    pub fn every<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&V, &K) -> bool,
    {
        self.entries.iter().all(|(k, v)| predicate(v, k))
    }
}

impl<K, V> Default for SohlMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for SohlMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.set(k, v);
        }
        map
    }
}

impl<K, V> PartialEq for SohlMap<K, V>
where
    K: Eq + Hash + Clone,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

fn pair_refs<K, V>(entry: &(K, V)) -> (&K, &V) {
    (&entry.0, &entry.1)
}

impl<'a, K, V> IntoIterator for &'a SohlMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = std::iter::Map<std::slice::Iter<'a, (K, V)>, fn(&'a (K, V)) -> (&'a K, &'a V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries
            .iter()
            .map(pair_refs::<K, V> as fn(&'a (K, V)) -> (&'a K, &'a V))
    }
}
