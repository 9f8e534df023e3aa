use std::ops::{Index, IndexMut};

use indexmap::IndexMap;

/// An append-only, insertion-ordered map from string keys to values which
/// permits duplicate keys.
///
/// Every value lives in a single sequence, in the order it was added. Each
/// key resolves to the ascending list of positions its values occupy, so
/// duplicate keys are addressed by a secondary index:
///
/// ```rust
/// # use ksp_confignode::OrderedMultiMap;
/// let mut map = OrderedMultiMap::new();
/// map.add("k", 1);
/// map.add("other", 2);
/// map.add("k", 3);
///
/// assert_eq!(map.get("k", 0), Some(&1));
/// assert_eq!(map.get("k", 1), Some(&3));
/// assert_eq!(map.get("k", 2), None);
/// assert_eq!(map[1], 2);
/// assert_eq!(map.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMultiMap<V> {
    values: Vec<V>,
    index: IndexMap<String, Vec<usize>>,
}

impl<V> Default for OrderedMultiMap<V> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            index: IndexMap::new(),
        }
    }
}

impl<V> OrderedMultiMap<V> {
    /// Creates a new, empty map.
    pub fn new() -> Self {
        Default::default()
    }

    /// Appends `value` under `key` and returns a mutable reference to it.
    pub fn add(&mut self, key: impl Into<String>, value: V) -> &mut V {
        let pos = self.values.len();
        self.values.push(value);
        self.index.entry(key.into()).or_default().push(pos);
        &mut self.values[pos]
    }

    /// Gets the `idx`-th value added under `key`, if any.
    pub fn get(&self, key: &str, idx: usize) -> Option<&V> {
        let pos = *self.index.get(key)?.get(idx)?;
        self.values.get(pos)
    }

    /// Gets a mutable reference to the `idx`-th value added under `key`.
    pub fn get_mut(&mut self, key: &str, idx: usize) -> Option<&mut V> {
        let pos = *self.index.get(key)?.get(idx)?;
        self.values.get_mut(pos)
    }

    /// Gets every value added under `key`, in insertion order.
    pub fn get_all(&self, key: &str) -> Vec<&V> {
        self.index
            .get(key)
            .map(|positions| positions.iter().map(|&pos| &self.values[pos]).collect())
            .unwrap_or_default()
    }

    /// Gets the value at position `pos` of the underlying sequence.
    pub fn get_index(&self, pos: usize) -> Option<&V> {
        self.values.get(pos)
    }

    /// Replaces the first value under `key`, or adds it if the key is not
    /// present yet.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        let first = self
            .index
            .get(&key)
            .and_then(|positions| positions.first().copied());
        match first {
            Some(pos) => self.values[pos] = value,
            None => {
                self.add(key, value);
            }
        }
    }

    /// Returns true if at least one value was added under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Distinct keys, in the order they were first added.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Total number of values, counting duplicates.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing was ever added.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over all values in insertion order (not grouped by key).
    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.values.iter()
    }

    /// Mutably iterates over all values in insertion order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, V> {
        self.values.iter_mut()
    }
}

impl<V> Index<usize> for OrderedMultiMap<V> {
    type Output = V;

    fn index(&self, pos: usize) -> &Self::Output {
        &self.values[pos]
    }
}

impl<V> IndexMut<usize> for OrderedMultiMap<V> {
    fn index_mut(&mut self, pos: usize) -> &mut Self::Output {
        &mut self.values[pos]
    }
}

impl<V> Index<&str> for OrderedMultiMap<V> {
    type Output = V;

    fn index(&self, key: &str) -> &Self::Output {
        self.get(key, 0).expect("No such key.")
    }
}

impl<V> IntoIterator for OrderedMultiMap<V> {
    type Item = V;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a OrderedMultiMap<V> {
    type Item = &'a V;
    type IntoIter = std::slice::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut OrderedMultiMap<V> {
    type Item = &'a mut V;
    type IntoIter = std::slice::IterMut<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter_mut()
    }
}
