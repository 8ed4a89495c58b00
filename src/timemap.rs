// Crypto Tax Engine
// Written in 2025 by
//   The cryptotax Developers
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the CC0 Public Domain Dedication
// along with this software.
// If not, see <http://creativecommons.org/publicdomain/zero/1.0/>.
//

//! Time Map
//!
//! An ordered set of elements, indexed by timestamp but where duplicate
//! timestamps are allowed (in which case the first-inserted ones will come
//! first). This is what gives the transaction normalizer its stable
//! ascending ordering, which FIFO matching depends on.
//!
//! Supports iteration and popping from the front, but otherwise does not
//! support direct indexing or random access.
//!

use crate::units::UtcTime;
use std::collections::{btree_map, BTreeMap};
use std::iter;

/// A time-indexed map
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct TimeMap<V> {
    map: BTreeMap<(UtcTime, usize), V>,
    next_idx: usize,
}

// Cannot be derived because the #derive logic is dumb and wants a
// Default bound on V even though we do not need one
impl<V> Default for TimeMap<V> {
    fn default() -> Self {
        TimeMap {
            map: Default::default(),
            next_idx: Default::default(),
        }
    }
}

impl<V> TimeMap<V> {
    /// Constructs a new empty time map
    pub fn new() -> Self {
        Default::default()
    }

    /// Computes the number of stored entries
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether or not the map is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Pops the first element from the map, if one exists
    pub fn pop_first(&mut self) -> Option<(UtcTime, V)> {
        let first_key = self.map.keys().next().copied();
        let value = first_key.and_then(|key| self.map.remove(&key));
        first_key.map(|key| (key.0, value.unwrap()))
    }

    /// Inserts a new element. Allows duplicates.
    ///
    /// There is no way to replace or delete an element once it is added to the
    /// time map. If you insert an element twice, even with the same timestamp,
    /// it will just be in the map twice.
    pub fn insert(&mut self, time: UtcTime, item: V) {
        let idx = self.next_idx;
        // If this assertion fails it means we somehow used `idx` twice
        assert!(self.map.insert((time, idx), item).is_none());
        self.next_idx += 1;
    }

    /// Constructs a borrowed iterator over the (time, value) pairs
    pub fn iter(&self) -> Iter<V> {
        Iter {
            iter: self.map.iter(),
        }
    }

    /// Constructs a borrowed iterator over values in the map
    pub fn values(&self) -> Values<V> {
        Values {
            iter: self.map.values(),
        }
    }
}

// Iterators

/// Borrowed iterator over entries
pub struct Values<'a, V> {
    iter: btree_map::Values<'a, (UtcTime, usize), V>,
}
impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

/// Borrowed iterator over (timestamp, entry) pairs
pub struct Iter<'a, V> {
    iter: btree_map::Iter<'a, (UtcTime, usize), V>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (UtcTime, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|((time, _), v)| (*time, v))
    }
}

impl<'a, V> iter::IntoIterator for &'a TimeMap<V> {
    type Item = (UtcTime, &'a V);
    type IntoIter = Iter<'a, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owned iterator over (timestamp, entry) pairs
pub struct IntoIter<V> {
    iter: btree_map::IntoIter<(UtcTime, usize), V>,
}

impl<V> Iterator for IntoIter<V> {
    type Item = (UtcTime, V);
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|((time, _), v)| (time, v))
    }
}

impl<V> iter::IntoIterator for TimeMap<V> {
    type Item = (UtcTime, V);
    type IntoIter = IntoIter<V>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            iter: self.map.into_iter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(n: i64) -> UtcTime {
        UtcTime::from_unix_i64(n).unwrap()
    }

    #[test]
    fn ordering_and_duplicates() {
        let mut map = TimeMap::new();
        map.insert(t(300), "late");
        map.insert(t(100), "first at 100");
        map.insert(t(100), "second at 100");
        map.insert(t(200), "middle");

        let values: Vec<&str> = map.values().copied().collect();
        assert_eq!(values, vec!["first at 100", "second at 100", "middle", "late"]);
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn pop_first() {
        let mut map = TimeMap::new();
        assert!(map.pop_first().is_none());
        map.insert(t(2), 'b');
        map.insert(t(1), 'a');
        assert_eq!(map.pop_first(), Some((t(1), 'a')));
        assert_eq!(map.pop_first(), Some((t(2), 'b')));
        assert!(map.is_empty());
    }
}
