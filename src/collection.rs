use std::ops::Index;

use crate::{CfgEntry, CfgValue, OrderedMultiMap};

/// The ordered `name = value` entries of a node or object.
///
/// Entries keep the order they were added in, and the same name may occur
/// any number of times; duplicates are addressed by their position among
/// entries of that name.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValueCollection {
    pub(crate) entries: OrderedMultiMap<CfgEntry>,
}

impl ValueCollection {
    /// Creates a new, empty collection.
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns a reference to the underlying multi-map.
    pub fn entries(&self) -> &OrderedMultiMap<CfgEntry> {
        &self.entries
    }

    /// Number of entries, counting duplicates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the collection holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, CfgEntry> {
        self.entries.iter()
    }

    /// Mutably iterates over all entries in insertion order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, CfgEntry> {
        self.entries.iter_mut()
    }
}

impl Index<&str> for ValueCollection {
    type Output = CfgEntry;

    fn index(&self, name: &str) -> &Self::Output {
        &self.entries[name]
    }
}

impl<'a> IntoIterator for &'a ValueCollection {
    type Item = &'a CfgEntry;
    type IntoIter = std::slice::Iter<'a, CfgEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<CfgEntry> for ValueCollection {
    fn from_iter<T: IntoIterator<Item = CfgEntry>>(iter: T) -> Self {
        let mut values = ValueCollection::new();
        for entry in iter {
            values.add_entry(entry);
        }
        values
    }
}

/// By-name access to a [`ValueCollection`].
///
/// Implemented by everything that carries `name = value` entries
/// ([`ValueCollection`] itself, [`crate::ConfigNode`] and
/// [`crate::NamedObject`]), so the same accessors work on all of them.
///
/// Every `idx` argument selects among entries sharing a name, counting from
/// zero in insertion order.
pub trait ValueStore {
    /// The backing collection.
    fn values(&self) -> &ValueCollection;

    /// Mutable access to the backing collection.
    fn values_mut(&mut self) -> &mut ValueCollection;

    /// Appends a new entry with an empty comment.
    fn add_value(&mut self, name: impl Into<String>, value: impl Into<CfgValue>) -> &mut CfgEntry {
        self.add_entry(CfgEntry::new(name, value))
    }

    /// Appends an existing entry.
    fn add_entry(&mut self, entry: CfgEntry) -> &mut CfgEntry {
        let name = entry.name.clone();
        self.values_mut().entries.add(name, entry)
    }

    /// Gets the scalar of the `idx`-th entry called `name`.
    fn get_value(&self, name: &str, idx: usize) -> Option<&CfgValue> {
        self.get_entry(name, idx).map(CfgEntry::value)
    }

    /// Gets the `idx`-th entry called `name`.
    fn get_entry(&self, name: &str, idx: usize) -> Option<&CfgEntry> {
        self.values().entries.get(name, idx)
    }

    /// Gets every entry called `name`, in insertion order.
    fn get_values(&self, name: &str) -> Vec<&CfgEntry> {
        self.values().entries.get_all(name)
    }

    /// Overwrites the scalar of the `idx`-th entry called `name` in place,
    /// or appends a new entry if there is no such entry.
    fn set_value(&mut self, name: &str, value: impl Into<CfgValue>, idx: usize) {
        match self.values_mut().entries.get_mut(name, idx) {
            Some(entry) => entry.set_value(value),
            None => {
                self.add_value(name, value);
            }
        }
    }

    /// Sets the comment of the `idx`-th entry called `name`. Does nothing if
    /// there is no such entry.
    fn set_comment(&mut self, name: &str, comment: impl Into<String>, idx: usize) {
        if let Some(entry) = self.values_mut().entries.get_mut(name, idx) {
            entry.set_comment(comment);
        }
    }

    /// Returns true if at least one entry is called `name`.
    fn has_value(&self, name: &str) -> bool {
        self.values().entries.contains_key(name)
    }
}

impl ValueStore for ValueCollection {
    fn values(&self) -> &ValueCollection {
        self
    }

    fn values_mut(&mut self) -> &mut ValueCollection {
        self
    }
}
