use std::collections::HashMap;

use super::asset::Asset;

/// Index of an asset inside its [`AssetRegistry`], in manifest order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub usize);

/// Owns the parsed assets, keyed by file path.
///
/// Aggregates are recomputed from the assets on every call; there are no
/// side counters that could drift.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    assets: Vec<Asset>,
    by_path: HashMap<String, AssetId>,
}

impl AssetRegistry {
    pub fn new(assets: Vec<Asset>) -> Self {
        // Duplicate paths are not validated; the last one wins the lookup.
        let by_path = assets
            .iter()
            .enumerate()
            .map(|(i, a)| (a.file().to_string(), AssetId(i)))
            .collect();
        Self { assets, by_path }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: AssetId) -> Option<&mut Asset> {
        self.assets.get_mut(id.0)
    }

    pub fn id_of(&self, file: &str) -> Option<AssetId> {
        self.by_path.get(file).copied()
    }

    pub fn by_path(&self, file: &str) -> Option<&Asset> {
        self.id_of(file).and_then(|id| self.get(id))
    }

    /// All assets in manifest order.
    pub fn iter(&self) -> impl Iterator<Item = (AssetId, &Asset)> {
        self.assets.iter().enumerate().map(|(i, a)| (AssetId(i), a))
    }

    /// Assets that take part in the preload, in manifest order.
    pub fn tracked(&self) -> impl Iterator<Item = (AssetId, &Asset)> {
        self.iter().filter(|(_, a)| a.should_preload())
    }

    /// Sum of declared sizes over tracked assets. Saturates.
    pub fn total_size(&self) -> u64 {
        self.tracked().fold(0u64, |acc, (_, a)| acc.saturating_add(a.size_in_bytes()))
    }

    /// Live sum of `bytes_loaded` over tracked assets. Saturates, since hosts
    /// may over-report.
    pub fn bytes_loaded(&self) -> u64 {
        self.tracked().fold(0u64, |acc, (_, a)| acc.saturating_add(a.bytes_loaded()))
    }

    /// True iff every tracked asset succeeded or failed.
    pub fn all_settled(&self) -> bool {
        self.tracked().all(|(_, a)| a.is_settled())
    }
}
