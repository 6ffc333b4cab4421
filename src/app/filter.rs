use std::collections::{HashMap, HashSet};

use crate::diff::Diff;
use crate::story::{HunkKey, StoryClassification};

/// A diff projected down to one narrative section, plus the index translation
/// back to original hunk indices.
///
/// Hunk indices in the projected diff are *positions in the filtered list*,
/// not original indices. Every downstream lookup keyed by [`HunkKey`]
/// (collapse state, category, collapse text) must go through
/// [`SectionView::original_index`] first; looking up by filtered position
/// directly is the correctness bug this type exists to prevent.
pub struct SectionView {
    pub diff: Diff,
    /// (display path, position in the file's filtered hunk list) → original
    /// hunk index. `None` means the view is unfiltered and positions already
    /// are original indices.
    index_map: Option<HashMap<HunkKey, usize>>,
}

impl SectionView {
    /// Project the diff down to the hunks referenced by `active_section`.
    ///
    /// Surviving hunks keep their original relative order; files with no
    /// surviving hunks are dropped entirely. With no active section (or no
    /// usable classification) this is the identity transform with no map.
    pub fn project(
        diff: &Diff,
        story: Option<&StoryClassification>,
        active_section: Option<usize>,
    ) -> Self {
        let section = active_section.and_then(|idx| story.and_then(|s| s.sections.get(idx)));
        let Some(section) = section else {
            return SectionView {
                diff: diff.clone(),
                index_map: None,
            };
        };

        let wanted: HashSet<HunkKey> = section.hunks.iter().map(|r| r.key()).collect();

        let mut index_map = HashMap::new();
        let mut files = Vec::new();
        for file in &diff.files {
            let path = file.display_path().to_string();
            let mut kept = file.clone();
            kept.hunks = Vec::new();
            for (original_idx, hunk) in file.hunks.iter().enumerate() {
                if wanted.contains(&HunkKey::new(path.clone(), original_idx)) {
                    index_map.insert(HunkKey::new(path.clone(), kept.hunks.len()), original_idx);
                    kept.hunks.push(hunk.clone());
                }
            }
            if !kept.hunks.is_empty() {
                files.push(kept);
            }
        }

        SectionView {
            diff: Diff { files },
            index_map: Some(index_map),
        }
    }

    /// Whether this view is an actual projection (vs. the identity transform)
    pub fn is_filtered(&self) -> bool {
        self.index_map.is_some()
    }

    /// Translate a position in the filtered per-file hunk list back to the
    /// original hunk index.
    ///
    /// With no map, positions already are original indices. A present map
    /// missing a key for a hunk that is actually in the view is a bug in the
    /// projection itself; fall back to identity but trip debug builds.
    pub fn original_index(&self, path: &str, filtered_pos: usize) -> usize {
        match &self.index_map {
            None => filtered_pos,
            Some(map) => match map.get(&HunkKey::new(path, filtered_pos)) {
                Some(&original) => original,
                None => {
                    debug_assert!(
                        false,
                        "filtered hunk {}:{} missing from translation map",
                        path, filtered_pos
                    );
                    filtered_pos
                }
            },
        }
    }

    /// The original-space key for a hunk at a filtered position
    pub fn original_key(&self, path: &str, filtered_pos: usize) -> HunkKey {
        HunkKey::new(path, self.original_index(path, filtered_pos))
    }
}
