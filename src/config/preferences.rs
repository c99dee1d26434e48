//! Per-feed grid/list preferences.
//!
//! Preferences are plain values handed to `FeedContext` construction. Loading
//! and saving goes through an injected [`PreferenceStore`], so nothing in the
//! pipeline reads process-wide state.

use crate::stream::context::FeedKind;
use std::collections::HashMap;

/// Key-value persistence for user preferences.
pub trait PreferenceStore {
    fn load_bool(&self, key: &str) -> Option<bool>;
    fn save_bool(&mut self, key: &str, value: bool);
}

/// In-memory store, used by the driver binary and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryPreferenceStore {
    values: HashMap<String, bool>,
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).copied()
    }

    fn save_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), value);
    }
}

/// Grid/list choice per feed kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPreferences {
    grid: HashMap<FeedKind, bool>,
}

impl FeedPreferences {
    /// Load every feed's preference, falling back to the feed's default.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let grid = FeedKind::ALL
            .into_iter()
            .map(|kind| {
                let value = store
                    .load_bool(&kind.preference_key())
                    .unwrap_or_else(|| kind.default_grid());
                (kind, value)
            })
            .collect();
        Self { grid }
    }

    /// Persist every feed's preference.
    pub fn save(&self, store: &mut dyn PreferenceStore) {
        for kind in FeedKind::ALL {
            store.save_bool(&kind.preference_key(), self.is_grid(kind));
        }
    }

    /// Stored choice for `kind`, or the feed's default.
    pub fn is_grid(&self, kind: FeedKind) -> bool {
        self.grid
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_grid())
    }

    pub fn set_grid(&mut self, kind: FeedKind, grid: bool) {
        self.grid.insert(kind, grid);
    }

    /// Apply the same choice to every feed (used by the `grid_view` config key).
    pub fn set_all(&mut self, grid: bool) {
        for kind in FeedKind::ALL {
            self.grid.insert(kind, grid);
        }
    }
}

impl Default for FeedPreferences {
    fn default() -> Self {
        Self::load(&MemoryPreferenceStore::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_yields_feed_defaults() {
        let prefs = FeedPreferences::load(&MemoryPreferenceStore::default());
        assert!(prefs.is_grid(FeedKind::Discover));
        assert!(!prefs.is_grid(FeedKind::Following));
    }

    #[test]
    fn stored_value_overrides_default() {
        let mut store = MemoryPreferenceStore::default();
        store.save_bool("discover-grid-view", false);

        let prefs = FeedPreferences::load(&store);
        assert!(!prefs.is_grid(FeedKind::Discover));
    }

    #[test]
    fn save_then_load_round_trips_choice() {
        let mut store = MemoryPreferenceStore::default();
        let mut prefs = FeedPreferences::load(&store);
        prefs.set_grid(FeedKind::Following, true);
        prefs.save(&mut store);

        let reloaded = FeedPreferences::load(&store);
        assert!(reloaded.is_grid(FeedKind::Following));
        assert_eq!(reloaded, prefs);
    }

    #[test]
    fn set_all_applies_to_every_feed() {
        let mut prefs = FeedPreferences::default();
        prefs.set_all(false);
        assert!(FeedKind::ALL.iter().all(|kind| !prefs.is_grid(*kind)));
    }
}
