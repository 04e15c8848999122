//! Persistent storage of the beacon roots contract.
//!
//! A plain slot -> value map. Slots that were never written read as zero, and there is no
//! deletion: a slot can only be overwritten.

use crate::primitives::Word;

use std::collections::{
    BTreeMap,
    btree_map,
};

/// Storage map of a single contract account.
///
/// Backed by an ordered map so that iteration and [`ContractStorage::snapshot`] are reproducible.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ContractStorage {
    slots: BTreeMap<Word, Word>,
}

impl ContractStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-populated with `seed`.
    /// Later pairs overwrite earlier pairs for the same slot.
    pub fn from_seed<K, V>(seed: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Word>,
        V: Into<Word>,
    {
        let mut storage = Self::new();
        storage.extend(seed);
        storage
    }

    /// Insert every pair of `entries`, overwriting existing slots.
    pub fn extend<K, V>(&mut self, entries: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<Word>,
        V: Into<Word>,
    {
        for (slot, value) in entries {
            self.set(slot, value);
        }
    }

    /// Read `slot`, or zero if it was never written.
    pub fn get(&self, slot: impl Into<Word>) -> Word {
        self.slots
            .get(&slot.into())
            .copied()
            .unwrap_or_default()
    }

    pub fn set(&mut self, slot: impl Into<Word>, value: impl Into<Word>) {
        self.slots.insert(slot.into(), value.into());
    }

    /// Write raw bytes into `slot`, coerced with [`Word::from_left_aligned`].
    pub fn set_bytes(&mut self, slot: impl Into<Word>, value: &[u8]) {
        self.set(slot, Word::from_left_aligned(value));
    }

    pub fn contains(&self, slot: impl Into<Word>) -> bool {
        self.slots.contains_key(&slot.into())
    }

    /// Number of slots that were ever written.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Written slots in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&Word, &Word)> {
        self.slots.iter()
    }

    /// Every written slot, keyed and valued by canonical hex text.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.slots
            .iter()
            .map(|(slot, value)| (slot.to_hex_string(), value.to_hex_string()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a ContractStorage {
    type Item = (&'a Word, &'a Word);
    type IntoIter = btree_map::Iter<'a, Word, Word>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}
