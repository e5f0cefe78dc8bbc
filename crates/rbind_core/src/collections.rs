//! Custom collection types used throughout the engine.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::borrow::Borrow;
use std::hash::Hash;

/// A bounded map that evicts its oldest *inserted* entry once full.
///
/// Reads never refresh an entry's position, so this is a FIFO cache and not
/// an LRU: the entry that leaves is always the one that was inserted first.
/// Replacing the value of an existing key keeps its original position.
#[derive(Debug, Clone)]
pub struct FifoCache<K, V> {
    entries: IndexMap<K, V, FxBuildHasher>,
    capacity: usize,
}

impl<K: Eq + Hash, V> FifoCache<K, V> {
    /// Create a cache holding at most `capacity` entries. A capacity of zero
    /// disables storage entirely.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity_and_hasher(capacity.min(1024), FxBuildHasher),
            capacity,
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Insert an entry, returning the entry evicted to make room for it.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.capacity == 0 {
            return None;
        }
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = value;
            return None;
        }
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.shift_remove_index(0)
        } else {
            None
        };
        self.entries.insert(key, value);
        evicted
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys from oldest to newest insertion.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// An insertion-ordered multimap that stores each value at most once per key.
/// Used for `field -> [dependent]` tables where iteration order must be
/// reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMultiMap<K: Hash + Eq, V> {
    map: IndexMap<K, Vec<V>, FxBuildHasher>,
}

impl<K: Eq + Hash, V: PartialEq> OrderedMultiMap<K, V> {
    pub fn new() -> Self {
        Self {
            map: IndexMap::with_hasher(FxBuildHasher),
        }
    }

    /// Append `value` under `key` unless it is already present there.
    /// Returns whether the value was added.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let values = self.map.entry(key).or_default();
        if values.contains(&value) {
            return false;
        }
        values.push(value);
        true
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&[V]>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key).map(|v| v.as_slice())
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> {
        self.map.iter().map(|(k, v)| (k, v.as_slice()))
    }
}

impl<K: Eq + Hash, V: PartialEq> Default for OrderedMultiMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_evicts_oldest_insertion() {
        let mut cache = FifoCache::new(2);
        assert!(cache.insert("a", 1).is_none());
        assert!(cache.insert("b", 2).is_none());
        // A read does not protect "a" from eviction.
        assert_eq!(cache.get("a"), Some(&1));
        assert_eq!(cache.insert("c", 3), Some(("a", 1)));
        assert!(!cache.contains_key("a"));
        let keys: Vec<_> = cache.keys().copied().collect();
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[test]
    fn test_fifo_replace_keeps_position() {
        let mut cache = FifoCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert!(cache.insert("a", 10).is_none());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.insert("c", 3), Some(("a", 10)));
    }

    #[test]
    fn test_fifo_zero_capacity() {
        let mut cache = FifoCache::new(0);
        assert!(cache.insert("a", 1).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_multi_map_dedupes_and_orders() {
        let mut map = OrderedMultiMap::new();
        assert!(map.insert("todos", "remaining"));
        assert!(map.insert("filter", "visible"));
        assert!(map.insert("todos", "visible"));
        assert!(!map.insert("todos", "remaining"));
        assert_eq!(map.get("todos"), Some(&["remaining", "visible"][..]));
        let keys: Vec<_> = map.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["todos", "filter"]);
        assert_eq!(map.get("other"), None);
    }
}
