//! Dense, append-only index-to-data maps.
//!
//! PrimaryMap is a Vec with entity-based indexing. Keys are handed out in
//! push order, so they are dense and monotonic.

use alloc::vec::Vec;
use core::{marker::PhantomData, ops::Index};

use crate::entity::EntityRef;

/// Dense map from entity to data
///
/// - `PrimaryMap<RegisterIndex, Register>` - the register file
/// - `PrimaryMap<ValueIndex, Value>` - the immediate table
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryMap<K: EntityRef, V> {
    data: Vec<V>,
    _phantom: PhantomData<K>,
}

impl<K: EntityRef, V> PrimaryMap<K, V> {
    /// Create a new empty PrimaryMap
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            _phantom: PhantomData,
        }
    }

    /// Create a new PrimaryMap with the specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            _phantom: PhantomData,
        }
    }

    /// Push a value and return its entity key
    ///
    /// Panics if the key would not fit in `K`; the map is left unchanged.
    pub fn push(&mut self, value: V) -> K {
        let key = K::from_index(self.data.len());
        self.data.push(value);
        key
    }

    /// Key the next push will return, if it fits in `K`.
    pub fn next_key(&self) -> Option<K> {
        let index = self.data.len();
        (index <= K::MAX).then(|| K::from_index(index))
    }

    /// Get a value by entity key
    pub fn get(&self, key: K) -> Option<&V> {
        self.data.get(key.index())
    }

    /// Check whether the key was handed out by this map
    pub fn is_valid(&self, key: K) -> bool {
        key.index() < self.data.len()
    }

    /// Get length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over entries as (entity, value) pairs
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (K::from_index(i), v))
    }

    /// Iterate over keys
    pub fn keys(&self) -> impl Iterator<Item = K> {
        (0..self.data.len()).map(K::from_index)
    }

    /// Iterate over values
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.data.iter()
    }
}

impl<K: EntityRef, V> Default for PrimaryMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: EntityRef, V> Index<K> for PrimaryMap<K, V> {
    type Output = V;

    fn index(&self, key: K) -> &V {
        match self.data.get(key.index()) {
            Some(value) => value,
            None => panic!(
                "index {} out of range (len {})",
                key.index(),
                self.data.len()
            ),
        }
    }
}
