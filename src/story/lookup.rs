use std::collections::HashMap;

use super::model::{Category, HunkKey, StoryClassification};

/// Lookup maps derived once from a classification, keyed by [`HunkKey`].
///
/// Built by a pure function and fully replaced (never merged) on every case
/// switch, so no stale keys survive a reload. A `nil` classification yields
/// empty maps: every hunk is uncategorized, expanded, and undimmed.
#[derive(Debug, Clone, Default)]
pub struct LookupMaps {
    /// Hunk → index of the section that references it (first section wins
    /// when a hunk appears in more than one)
    section_of: HashMap<HunkKey, usize>,
    category_of: HashMap<HunkKey, Category>,
    collapse_text: HashMap<HunkKey, String>,
    /// The classifier's load-time collapse recommendation
    /// (explicit flag OR category noise)
    initial_collapsed: HashMap<HunkKey, bool>,
}

impl LookupMaps {
    /// Build all four maps in one pass over the classification's hunk refs.
    pub fn build(story: Option<&StoryClassification>) -> Self {
        let mut maps = LookupMaps::default();
        let Some(story) = story else {
            return maps;
        };

        for (section_idx, section) in story.sections.iter().enumerate() {
            for hunk_ref in &section.hunks {
                let key = hunk_ref.key();
                maps.section_of.entry(key.clone()).or_insert(section_idx);
                maps.category_of
                    .entry(key.clone())
                    .or_insert(hunk_ref.category);
                if !hunk_ref.collapse_summary.is_empty() {
                    maps.collapse_text
                        .entry(key.clone())
                        .or_insert_with(|| hunk_ref.collapse_summary.clone());
                }
                let collapsed = hunk_ref.collapsed || hunk_ref.category == Category::Noise;
                maps.initial_collapsed.entry(key).or_insert(collapsed);
            }
        }
        maps
    }

    pub fn section_of(&self, key: &HunkKey) -> Option<usize> {
        self.section_of.get(key).copied()
    }

    pub fn category_of(&self, key: &HunkKey) -> Option<Category> {
        self.category_of.get(key).copied()
    }

    /// Collapse summary text, if the classifier supplied one
    pub fn collapse_text(&self, key: &HunkKey) -> Option<&str> {
        self.collapse_text.get(key).map(|s| s.as_str())
    }

    /// The classifier's load-time collapse recommendation for this hunk
    pub fn initial_collapsed(&self, key: &HunkKey) -> bool {
        self.initial_collapsed.get(key).copied().unwrap_or(false)
    }

    /// All keys the classifier recommended collapsing at load time
    pub fn recommended_collapsed_keys(&self) -> impl Iterator<Item = &HunkKey> {
        self.initial_collapsed
            .iter()
            .filter(|(_, &collapsed)| collapsed)
            .map(|(key, _)| key)
    }

    /// Whether this hunk renders dimmed (refactoring/systematic/noise)
    pub fn is_dimmed(&self, key: &HunkKey) -> bool {
        self.category_of(key).is_some_and(|c| c.is_dimmed())
    }
}
