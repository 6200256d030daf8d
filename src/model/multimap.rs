//! Ordered multimap with duplicate suppression

use std::hash::Hash;

use indexmap::IndexMap;

/// Insertion-ordered keys, each holding an insertion-ordered list of
/// distinct values.
///
/// Putting a `(key, value)` pair that is already present is a no-op, so the
/// map behaves as an ordered set of pairs grouped by key.
#[derive(Debug, Clone)]
pub struct MultiMap<K, V> {
    entries: IndexMap<K, Vec<V>>,
}

impl<K, V> Default for MultiMap<K, V> {
    fn default() -> Self {
        MultiMap {
            entries: IndexMap::new(),
        }
    }
}

impl<K: Hash + Eq, V: PartialEq> MultiMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` under `key`. Returns `false` if the pair was already present.
    pub fn put(&mut self, key: K, value: V) -> bool {
        let values = self.entries.entry(key).or_default();
        if values.contains(&value) {
            return false;
        }
        values.push(value);
        true
    }

    /// Values under `key`, in insertion order
    pub fn get(&self, key: &K) -> &[V] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append without the duplicate check, returning the stored value
    pub(crate) fn push(&mut self, key: K, value: V) -> &mut V {
        let values = self.entries.entry(key).or_default();
        values.push(value);
        let last = values.len() - 1;
        &mut values[last]
    }

    /// Value by key position and value position
    pub(crate) fn value_at(&self, key_index: usize, value_index: usize) -> Option<&V> {
        self.entries
            .get_index(key_index)
            .and_then(|(_, values)| values.get(value_index))
    }

    pub(crate) fn value_at_mut(&mut self, key_index: usize, value_index: usize) -> Option<&mut V> {
        self.entries
            .get_index_mut(key_index)
            .and_then(|(_, values)| values.get_mut(value_index))
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut Vec<V>> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn contains(&self, key: &K, value: &V) -> bool {
        self.get(key).contains(value)
    }

    /// Remove `key` and all of its values, keeping the order of the rest
    pub fn remove(&mut self, key: &K) -> Option<Vec<V>> {
        self.entries.shift_remove(key)
    }

    /// Remove a single pair. The key goes too once its last value is gone.
    pub fn remove_value(&mut self, key: &K, value: &V) -> Option<V> {
        let values = self.entries.get_mut(key)?;
        let at = values.iter().position(|v| v == value)?;
        let removed = values.remove(at);
        if values.is_empty() {
            self.entries.shift_remove(key);
        }
        Some(removed)
    }

    /// Move every value of `old` under `new`, dropping pairs `new` already holds.
    /// A fresh `new` key takes the position of `old`.
    pub fn rename_key(&mut self, old: &K, new: K) -> bool {
        let Some(index) = self.entries.get_index_of(old) else {
            return false;
        };
        if self.entries.contains_key(&new) {
            if let Some(values) = self.entries.shift_remove(old) {
                for value in values {
                    self.put_existing(&new, value);
                }
            }
        } else if let Some(values) = self.entries.shift_remove(old) {
            let (at, _) = self.entries.insert_full(new, values);
            self.entries.move_index(at, index);
        }
        true
    }

    fn put_existing(&mut self, key: &K, value: V) {
        if let Some(values) = self.entries.get_mut(key) {
            if !values.contains(&value) {
                values.push(value);
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// All `(key, value)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries
            .iter()
            .flat_map(|(k, values)| values.iter().map(move |v| (k, v)))
    }

    /// Keys with their value lists
    pub fn groups(&self) -> impl Iterator<Item = (&K, &[V])> {
        self.entries.iter().map(|(k, values)| (k, values.as_slice()))
    }

    /// Mutable access to every value
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.values_mut().flat_map(|values| values.iter_mut())
    }

    /// Consume the map, yielding values in order
    pub fn into_values(self) -> impl Iterator<Item = V> {
        self.entries.into_values().flatten()
    }

    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: Hash + Eq, V: PartialEq> PartialEq for MultiMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_suppresses_duplicates() {
        let mut map = MultiMap::new();
        assert!(map.put("a", 1));
        assert!(map.put("a", 2));
        assert!(!map.put("a", 1));
        assert!(map.put("b", 1));
        assert_eq!(map.get(&"a"), &[1, 2]);
        assert_eq!(map.len(), 3);
        assert_eq!(map.key_count(), 2);
    }

    #[test]
    fn test_iteration_order() {
        let mut map = MultiMap::new();
        map.put("z", 1);
        map.put("a", 2);
        map.put("z", 3);
        let pairs: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(pairs, vec![("z", 1), ("z", 3), ("a", 2)]);
    }

    #[test]
    fn test_remove_value_drops_empty_key() {
        let mut map = MultiMap::new();
        map.put("a", 1);
        map.put("a", 2);
        assert_eq!(map.remove_value(&"a", &1), Some(1));
        assert!(map.contains_key(&"a"));
        assert_eq!(map.remove_value(&"a", &2), Some(2));
        assert!(!map.contains_key(&"a"));
        assert_eq!(map.remove_value(&"a", &2), None);
    }

    #[test]
    fn test_rename_key() {
        let mut map = MultiMap::new();
        map.put("a", 1);
        map.put("b", 2);
        map.put("c", 3);
        assert!(map.rename_key(&"b", "x"));
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec!["a", "x", "c"]);

        map.put("c", 1);
        assert!(map.rename_key(&"a", "c"));
        assert_eq!(map.get(&"c"), &[3, 1]);
        assert!(!map.rename_key(&"missing", "y"));
    }
}
