//! Index-keyed storage for per-field data.
//!
//! Card data, set data, styling data and style lists all store one entry per
//! field of some schema list, in schema order. `FieldMap` is that storage:
//! backed by a `Vec<T>` for O(1) access and indexed by `FieldIndex`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use super::ids::FieldIndex;

/// Per-field data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use set_script::core::{FieldIndex, FieldMap};
///
/// let mut widths: FieldMap<f64> = FieldMap::new(3, |_| 0.0);
/// widths[FieldIndex::new(1)] = 40.0;
///
/// assert_eq!(widths[FieldIndex::new(1)], 40.0);
/// assert_eq!(widths.get(FieldIndex::new(7)), None);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldMap<T> {
    data: Vec<T>,
}

impl<T> Default for FieldMap<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

impl<T> FieldMap<T> {
    /// Create a map with one entry per field, built by a factory.
    pub fn new(len: usize, factory: impl Fn(FieldIndex) -> T) -> Self {
        let data = (0..len as u32).map(|i| factory(FieldIndex(i))).collect();
        Self { data }
    }

    /// Wrap an already ordered list.
    #[must_use]
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get an entry, `None` when the index is out of range.
    #[must_use]
    pub fn get(&self, index: FieldIndex) -> Option<&T> {
        self.data.get(index.index())
    }

    /// Get a mutable entry, `None` when the index is out of range.
    pub fn get_mut(&mut self, index: FieldIndex) -> Option<&mut T> {
        self.data.get_mut(index.index())
    }

    /// Append an entry, returning its index.
    pub fn push(&mut self, value: T) -> FieldIndex {
        self.data.push(value);
        FieldIndex((self.data.len() - 1) as u32)
    }

    /// Iterate over entries in field order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Iterate mutably over entries in field order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    /// Iterate over (FieldIndex, &T) pairs.
    pub fn indexed(&self) -> impl Iterator<Item = (FieldIndex, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (FieldIndex(i as u32), v))
    }

    /// All indices of this map.
    pub fn indices(&self) -> impl Iterator<Item = FieldIndex> {
        (0..self.data.len() as u32).map(FieldIndex)
    }
}

impl<T> Index<FieldIndex> for FieldMap<T> {
    type Output = T;

    fn index(&self, index: FieldIndex) -> &Self::Output {
        &self.data[index.index()]
    }
}

impl<T> IndexMut<FieldIndex> for FieldMap<T> {
    fn index_mut(&mut self, index: FieldIndex) -> &mut Self::Output {
        &mut self.data[index.index()]
    }
}

impl<'a, T> IntoIterator for &'a FieldMap<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
