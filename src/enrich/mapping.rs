use crate::feature_key::key::FeatureKey;
use indexmap::IndexMap;

/// Weather features of one row, in the order they were first inserted.
///
/// Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMapping {
    entries: IndexMap<FeatureKey, f64>,
}

impl FeatureMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, returning the value it replaced.
    pub fn insert(&mut self, key: FeatureKey, value: f64) -> Option<f64> {
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FeatureKey, f64)> {
        self.entries.iter().map(|(key, value)| (key, *value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &FeatureKey> {
        self.entries.keys()
    }
}
