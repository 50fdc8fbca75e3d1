//! Map for keeping track of which [`HashMap`] key corresponds to which index in
//! an underlying [`Vec`].

use rustc_hash::FxBuildHasher;
use std::collections::hash_map::Entry;
use std::fmt::{self, Debug};
use std::hash::Hash;

/// Map for keeping track of which [`HashMap`] key corresponds to which index in
/// an underlying [`Vec`].
///
/// This is useful if we want the flexibility of accessing data with a key but
/// don't want to sacrifice the compact data storage provided by a `Vec`. It
/// also enables us to reorder items in the `Vec` (like doing a swap remove)
/// without invalidating the keys used to access the items.
pub struct KeyIndexMapper<K> {
    indices_for_keys: std::collections::HashMap<K, usize, FxBuildHasher>,
    keys_at_indices: Vec<K>,
}

impl<K> KeyIndexMapper<K>
where
    K: Copy + Hash + Eq + Debug,
{
    /// Creates a new mapper with no keys.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new mapper with at least the specified capacity and no keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            indices_for_keys: std::collections::HashMap::with_capacity_and_hasher(
                capacity,
                FxBuildHasher,
            ),
            keys_at_indices: Vec::with_capacity(capacity),
        }
    }

    /// Creates a new mapper with the given key.
    pub fn new_with_key(key: K) -> Self {
        let mut mapper = Self::with_capacity(1);
        mapper.push_key(key);
        mapper
    }

    /// Creates a new mapper with the given set of keys. The index of each key
    /// will correspond to the position of the key in the provided iterator.
    ///
    /// # Panics
    /// If the iterator has multiple occurrences of the same key.
    pub fn new_with_keys(key_iter: impl IntoIterator<Item = K>) -> Self {
        let key_iter = key_iter.into_iter();
        let capacity = key_iter.size_hint().0;
        let mut mapper = Self::with_capacity(capacity);
        for key in key_iter {
            mapper.push_key(key);
        }
        mapper
    }

    /// Returns an iterator over all keys in the order in which their entries in
    /// the underlying [`Vec`] are stored.
    pub fn key_at_each_idx(&self) -> impl Iterator<Item = K> + '_ {
        self.keys_at_indices.iter().copied()
    }

    /// Returns a slice with all keys in the order in which their entries in the
    /// underlying [`Vec`] are stored.
    pub fn keys_at_indices(&self) -> &[K] {
        &self.keys_at_indices
    }

    /// Whether the mapper has no keys.
    pub fn is_empty(&self) -> bool {
        self.keys_at_indices.is_empty()
    }

    /// Whether an index exists for the given key.
    pub fn contains_key(&self, key: K) -> bool {
        self.indices_for_keys.contains_key(&key)
    }

    /// The number of keys/indices in the mapper.
    pub fn len(&self) -> usize {
        self.keys_at_indices.len()
    }

    /// Returns the index corresponding to the given key.
    ///
    /// # Panics
    /// If the key does not exist.
    pub fn idx(&self, key: K) -> usize {
        self.indices_for_keys[&key]
    }

    /// Returns the index corresponding to the given key if the key exists,
    /// otherwise returns [`None`].
    pub fn get(&self, key: K) -> Option<usize> {
        self.indices_for_keys.get(&key).copied()
    }

    /// Returns the key corresponding to the given index.
    ///
    /// # Panics
    /// If the index is outside the bounds of the [`Vec`].
    pub fn key_at_idx(&self, idx: usize) -> K {
        self.keys_at_indices[idx]
    }

    /// Adds the given key and maps it to the next index.
    ///
    /// # Errors
    /// Returns the index of the existing key if the key already exists.
    pub fn try_push_key(&mut self, key: K) -> Result<(), usize> {
        match self.indices_for_keys.entry(key) {
            Entry::Vacant(entry) => {
                let idx_of_new_key = self.keys_at_indices.len();
                entry.insert(idx_of_new_key);
                self.keys_at_indices.push(key);
                Ok(())
            }
            Entry::Occupied(entry) => Err(*entry.get()),
        }
    }

    /// Adds the given key and maps it to the next index.
    ///
    /// # Panics
    /// If the key already exists.
    pub fn push_key(&mut self, key: K) {
        self.try_push_key(key)
            .expect("tried to add an existing key");
    }

    /// Removes the given key and assigns the key at the last index to the index
    /// of the removed key (unless the key to remove was at the last index)
    /// before popping the end of the [`Vec`].
    ///
    /// # Returns
    /// The index the removed key used to occupy.
    ///
    /// # Panics
    /// If the key to remove does not exist.
    pub fn swap_remove_key(&mut self, key: K) -> usize {
        let idx_of_removed_key = self
            .indices_for_keys
            .remove(&key)
            .expect("tried to remove key that does not exist");

        let last_key = self.keys_at_indices.pop().unwrap();
        if key != last_key {
            self.keys_at_indices[idx_of_removed_key] = last_key;
            *self.indices_for_keys.get_mut(&last_key).unwrap() = idx_of_removed_key;
        }
        idx_of_removed_key
    }

    /// Clears all stored indices and keys.
    pub fn clear(&mut self) {
        self.indices_for_keys.clear();
        self.keys_at_indices.clear();
    }
}

impl<K> Clone for KeyIndexMapper<K>
where
    K: Clone + Eq + Hash,
{
    fn clone(&self) -> Self {
        Self {
            indices_for_keys: self.indices_for_keys.clone(),
            keys_at_indices: self.keys_at_indices.clone(),
        }
    }
}

impl<K> Default for KeyIndexMapper<K>
where
    K: Copy + Hash + Eq + Debug,
{
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<K: fmt::Debug> fmt::Debug for KeyIndexMapper<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyIndexMapper")
            .field("indices_for_keys", &self.indices_for_keys)
            .field("keys_at_indices", &self.keys_at_indices)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_index_mapper_initialization_works() {
        let mapper = KeyIndexMapper::<i32>::new();
        assert!(mapper.is_empty());

        let mapper = KeyIndexMapper::new_with_key(3);
        assert_eq!(mapper.len(), 1);
        assert_eq!(mapper.idx(3), 0);
        assert_eq!(mapper.key_at_idx(0), 3);

        let mapper = KeyIndexMapper::new_with_keys([4, 2]);
        assert_eq!(mapper.len(), 2);
        assert_eq!(mapper.idx(4), 0);
        assert_eq!(mapper.idx(2), 1);
    }

    #[test]
    #[should_panic]
    fn key_index_mapper_initializing_with_duplicate_keys_fails() {
        KeyIndexMapper::new_with_keys([2, 4, 2]);
    }

    #[test]
    fn key_index_mapper_get_gives_correct_idx() {
        let mapper = KeyIndexMapper::new_with_keys([4, 2, 100]);
        assert_eq!(mapper.get(0), None);
        assert_eq!(mapper.get(4), Some(0));
        assert_eq!(mapper.get(2), Some(1));
        assert_eq!(mapper.get(100), Some(2));
    }

    #[test]
    fn key_index_mapper_swap_remove_key_works() {
        let mut mapper = KeyIndexMapper::new_with_keys([4, 2, 100]);

        mapper.swap_remove_key(2); // Moves `100` to idx 1 and truncates ([4, 100])
        assert_eq!(mapper.len(), 2);
        assert_eq!(mapper.idx(4), 0);
        assert_eq!(mapper.idx(100), 1);

        mapper.swap_remove_key(100); // Truncates `100` ([4])
        assert_eq!(mapper.len(), 1);
        assert_eq!(mapper.idx(4), 0);

        mapper.swap_remove_key(4);
        assert!(mapper.is_empty());
    }

    #[test]
    #[should_panic]
    fn key_index_mapper_swap_remove_key_with_invalid_key_fails() {
        let mut mapper = KeyIndexMapper::new_with_keys([4, 2, 100]);
        mapper.swap_remove_key(1);
    }
}
