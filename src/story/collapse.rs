use std::collections::{HashMap, HashSet};

use super::lookup::LookupMaps;
use super::model::HunkKey;

/// Mutable per-hunk collapsed/expanded overlay.
///
/// Seeded from the classifier's recommendations at case load, then toggled by
/// the user. The load-time recommendation set is kept separately and never
/// mutated, so "expand what the classifier collapsed" stays distinguishable
/// from "expand everything". Discarded whole when a new case loads.
#[derive(Debug, Clone, Default)]
pub struct CollapseState {
    collapsed: HashMap<HunkKey, bool>,
    /// Hunks the classifier flagged collapsed at load time (immutable)
    recommended: HashSet<HunkKey>,
}

impl CollapseState {
    /// Initialize from the lookup maps: collapsed iff the classifier
    /// recommended it (explicit flag or noise category).
    pub fn from_maps(maps: &LookupMaps) -> Self {
        let mut state = CollapseState::default();
        for key in maps.recommended_collapsed_keys() {
            state.collapsed.insert(key.clone(), true);
            state.recommended.insert(key.clone());
        }
        state
    }

    pub fn is_collapsed(&self, key: &HunkKey) -> bool {
        self.collapsed.get(key).copied().unwrap_or(false)
    }

    /// Flip one hunk's state, unconditionally
    pub fn toggle(&mut self, key: &HunkKey) {
        let current = self.is_collapsed(key);
        self.collapsed.insert(key.clone(), !current);
    }

    /// Bulk toggle, restricted to the classifier-recommended subset.
    ///
    /// Majority rule over that subset: if more than half are currently
    /// collapsed, expand them all; otherwise collapse them all. Hunks the
    /// classifier never flagged are untouched, even if the user collapsed
    /// them by hand.
    pub fn toggle_recommended(&mut self) {
        if self.recommended.is_empty() {
            return;
        }
        let collapsed_count = self
            .recommended
            .iter()
            .filter(|key| self.is_collapsed(key))
            .count();
        let expand = collapsed_count * 2 > self.recommended.len();
        let keys: Vec<HunkKey> = self.recommended.iter().cloned().collect();
        for key in keys {
            self.collapsed.insert(key, !expand);
        }
    }

    /// Whether the classifier recommended collapsing this hunk at load time
    pub fn is_recommended(&self, key: &HunkKey) -> bool {
        self.recommended.contains(key)
    }

    pub fn recommended_count(&self) -> usize {
        self.recommended.len()
    }
}
