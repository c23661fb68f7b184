// Keynorm Extra-Key Mapper
// Maps unrecognized device keys onto function-key slots

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::classify::{is_known, FUNCTION_SLOTS};
use crate::Key;

/// Remap table from extra key codes to function keys.
///
/// Built once from a device's capability set and never modified
/// afterwards. Iteration follows the sorted order of the source codes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtraKeyMap {
    mappings: IndexMap<Key, Key>,
}

impl ExtraKeyMap {
    /// An empty map (no remapping)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from explicit pairs, keeping their order
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Key, Key)>) -> Self {
        Self {
            mappings: pairs.into_iter().collect(),
        }
    }

    /// Get the function key an extra key is remapped to
    pub fn get(&self, key: Key) -> Option<Key> {
        self.mappings.get(&key).copied()
    }

    pub fn contains(&self, key: Key) -> bool {
        self.mappings.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Iterate over (extra key, function key) pairs
    pub fn iter(&self) -> impl Iterator<Item = (Key, Key)> + '_ {
        self.mappings.iter().map(|(from, to)| (*from, *to))
    }
}

/// Compute the extra-key remap table for a device.
///
/// Every code the device reports that is not in the classification tables
/// is an extra key. Extra keys are sorted by code and the first twelve are
/// assigned F1..F12 in that order; any beyond twelve stay unmapped.
pub fn build_extra_key_map(available_keys: impl IntoIterator<Item = Key>) -> ExtraKeyMap {
    let extra: BTreeSet<Key> = available_keys
        .into_iter()
        .filter(|key| !is_known(*key))
        .collect();

    if extra.len() > FUNCTION_SLOTS.len() {
        log::debug!(
            "{} extra keys reported, only the first {} are remapped",
            extra.len(),
            FUNCTION_SLOTS.len()
        );
    }

    let map = ExtraKeyMap::from_pairs(extra.into_iter().zip(FUNCTION_SLOTS));
    for (from, to) in map.iter() {
        log::info!("extra key {} ({}) -> {}", from, from.code(), to);
    }
    map
}
