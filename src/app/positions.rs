use std::collections::HashMap;

use crate::story::{CollapseState, LookupMaps};

use super::filter::SectionView;

/// Start-line positions of every rendered file, hunk, and section.
///
/// Computed in a single forward pass over the current view with the current
/// collapse state, mirroring the line costs of the diff-area renderer
/// exactly: file header 1 line, "(empty)" placeholder 1 line, collapsed hunk
/// 1 line, expanded hunk 1 header line + 1 line per content line. Binary and
/// otherwise ineligible files contribute nothing.
///
/// These lists are the sole source of truth for "what is at scroll line N".
/// They are recomputed whole, never patched, on every collapse toggle,
/// filter change, or diff reload, because one collapse shifts every position
/// after it.
#[derive(Debug, Clone, Default)]
pub struct Positions {
    /// Start line of each rendered file, in render order
    pub files: Vec<usize>,
    /// Start line of each rendered hunk, in file-then-hunk order
    pub hunks: Vec<usize>,
    /// Start line of the first rendered hunk of each visible section,
    /// strictly increasing
    pub sections: Vec<usize>,
    /// Original section indices, in lockstep with `sections`
    pub section_indices: Vec<usize>,
    /// Total rendered line count
    pub total_lines: usize,
}

impl Positions {
    /// Walk the view and compute all position lists for the current collapse
    /// state. Collapse and section lookups translate filtered positions back
    /// to original-index space through the view's map.
    pub fn compute(view: &SectionView, maps: &LookupMaps, collapse: &CollapseState) -> Self {
        let mut positions = Positions::default();
        // first rendered position per section index
        let mut section_firsts: HashMap<usize, usize> = HashMap::new();

        let mut line = 0usize;
        for file in view.diff.renderable_files() {
            let path = file.display_path();
            positions.files.push(line);
            line += 1; // file header

            if file.hunks.is_empty() {
                line += 1; // "(empty)" placeholder
                continue;
            }

            for filtered_pos in 0..file.hunks.len() {
                let key = view.original_key(path, filtered_pos);
                positions.hunks.push(line);

                if let Some(section_idx) = maps.section_of(&key) {
                    section_firsts.entry(section_idx).or_insert(line);
                }

                if collapse.is_collapsed(&key) {
                    line += 1; // collapsed summary line
                } else {
                    line += 1 + file.hunks[filtered_pos].lines.len();
                }
            }
        }
        positions.total_lines = line;

        // Section lists sorted by position, lockstep with original indices
        let mut firsts: Vec<(usize, usize)> = section_firsts
            .into_iter()
            .map(|(section_idx, pos)| (pos, section_idx))
            .collect();
        firsts.sort_unstable();
        for (pos, section_idx) in firsts {
            positions.sections.push(pos);
            positions.section_indices.push(section_idx);
        }

        positions
    }

    /// Index of the greatest position ≤ `line` (the unit "at" a scroll line)
    pub fn index_at(list: &[usize], line: usize) -> Option<usize> {
        if list.is_empty() || line < list[0] {
            return None;
        }
        match list.binary_search(&line) {
            Ok(idx) => Some(idx),
            Err(idx) => Some(idx - 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{Diff, DiffLine, FileDiff, FileOp, Hunk, LineType};
    use crate::story::{
        Category, HunkKey, HunkRef, NarrativePattern, Section, SectionRole, StoryClassification,
    };

    fn make_hunk(line_count: usize) -> Hunk {
        Hunk {
            old_start: 1,
            old_count: line_count,
            new_start: 1,
            new_count: line_count,
            section_label: String::new(),
            lines: (0..line_count)
                .map(|i| DiffLine {
                    line_type: LineType::Context,
                    content: format!("l{}", i),
                    old_num: Some(i + 1),
                    new_num: Some(i + 1),
                })
                .collect(),
        }
    }

    fn make_file(path: &str, hunk_sizes: &[usize]) -> FileDiff {
        FileDiff {
            old_path: path.to_string(),
            new_path: path.to_string(),
            op: FileOp::Modified,
            is_binary: false,
            hunks: hunk_sizes.iter().map(|&n| make_hunk(n)).collect(),
            adds: 0,
            dels: 0,
        }
    }

    fn identity_view(diff: &Diff) -> SectionView {
        SectionView::project(diff, None, None)
    }

    fn story_one_section_per_hunk(refs: Vec<(&str, usize)>) -> StoryClassification {
        StoryClassification {
            change_type: String::new(),
            narrative_pattern: NarrativePattern::CauseEffect,
            summary: String::new(),
            sections: refs
                .into_iter()
                .map(|(file, hunk)| Section {
                    role: SectionRole::Core,
                    title: format!("{}#{}", file, hunk),
                    explanation: String::new(),
                    hunks: vec![HunkRef {
                        file: file.to_string(),
                        hunk_index: hunk,
                        category: Category::Core,
                        collapsed: false,
                        collapse_summary: String::new(),
                    }],
                })
                .collect(),
        }
    }

    #[test]
    fn expanded_hunks_cost_header_plus_lines() {
        let diff = Diff {
            files: vec![make_file("a.rs", &[3, 2])],
        };
        let positions = Positions::compute(
            &identity_view(&diff),
            &LookupMaps::default(),
            &CollapseState::default(),
        );
        // file header at 0, hunk 0 at 1 (1 header + 3 lines), hunk 1 at 5
        assert_eq!(positions.files, vec![0]);
        assert_eq!(positions.hunks, vec![1, 5]);
        assert_eq!(positions.total_lines, 8);
    }

    #[test]
    fn collapsed_hunk_costs_one_line() {
        let diff = Diff {
            files: vec![make_file("a.rs", &[3, 2])],
        };
        let mut collapse = CollapseState::default();
        collapse.toggle(&HunkKey::new("a.rs", 0));
        let positions =
            Positions::compute(&identity_view(&diff), &LookupMaps::default(), &collapse);
        // hunk 0 collapses from 4 lines to 1: hunk 1 moves up by 3
        assert_eq!(positions.hunks, vec![1, 2]);
        assert_eq!(positions.total_lines, 5);
    }

    #[test]
    fn collapse_shifts_following_positions_by_line_count() {
        let diff = Diff {
            files: vec![make_file("a.rs", &[5, 2]), make_file("b.rs", &[1])],
        };
        let view = identity_view(&diff);
        let maps = LookupMaps::default();

        let expanded = Positions::compute(&view, &maps, &CollapseState::default());
        let mut collapse = CollapseState::default();
        collapse.toggle(&HunkKey::new("a.rs", 0));
        let collapsed = Positions::compute(&view, &maps, &collapse);

        let delta = 5; // (1 header + 5 lines) -> 1 line
        assert_eq!(collapsed.hunks[0], expanded.hunks[0]);
        assert_eq!(collapsed.hunks[1], expanded.hunks[1] - delta);
        assert_eq!(collapsed.hunks[2], expanded.hunks[2] - delta);
        assert_eq!(collapsed.files[1], expanded.files[1] - delta);

        // expanding reverses exactly
        collapse.toggle(&HunkKey::new("a.rs", 0));
        let restored = Positions::compute(&view, &maps, &collapse);
        assert_eq!(restored.hunks, expanded.hunks);
        assert_eq!(restored.files, expanded.files);
    }

    #[test]
    fn position_lists_are_strictly_increasing() {
        let diff = Diff {
            files: vec![
                make_file("a.rs", &[2, 4]),
                make_file("b.rs", &[1]),
                make_file("c.rs", &[3, 1, 2]),
            ],
        };
        let story = story_one_section_per_hunk(vec![("a.rs", 1), ("c.rs", 0), ("b.rs", 0)]);
        let maps = crate::story::LookupMaps::build(Some(&story));
        let positions =
            Positions::compute(&identity_view(&diff), &maps, &CollapseState::default());

        for list in [&positions.files, &positions.hunks, &positions.sections] {
            for pair in list.windows(2) {
                assert!(pair[0] < pair[1]);
            }
        }
        assert_eq!(positions.sections.len(), positions.section_indices.len());
    }

    #[test]
    fn binary_files_contribute_nothing() {
        let mut binary = make_file("img.png", &[]);
        binary.is_binary = true;
        binary.op = FileOp::Added;
        let diff = Diff {
            files: vec![binary, make_file("a.rs", &[1])],
        };
        let positions = Positions::compute(
            &identity_view(&diff),
            &LookupMaps::default(),
            &CollapseState::default(),
        );
        assert_eq!(positions.files.len(), 1);
        assert_eq!(positions.hunks.len(), 1);
        assert_eq!(positions.files, vec![0]);
    }

    #[test]
    fn empty_eligible_file_costs_two_lines() {
        let mut empty = make_file("new.rs", &[]);
        empty.op = FileOp::Added;
        let diff = Diff {
            files: vec![empty, make_file("a.rs", &[1])],
        };
        let positions = Positions::compute(
            &identity_view(&diff),
            &LookupMaps::default(),
            &CollapseState::default(),
        );
        // header + "(empty)" then next file at 2
        assert_eq!(positions.files, vec![0, 2]);
        assert_eq!(positions.hunks, vec![3]);
    }

    #[test]
    fn mode_only_file_is_skipped() {
        let diff = Diff {
            files: vec![make_file("mode.rs", &[]), make_file("a.rs", &[1])],
        };
        let positions = Positions::compute(
            &identity_view(&diff),
            &LookupMaps::default(),
            &CollapseState::default(),
        );
        assert_eq!(positions.files, vec![0]);
    }

    #[test]
    fn sections_with_no_visible_hunks_are_omitted_in_lockstep() {
        let diff = Diff {
            files: vec![make_file("a.rs", &[1, 1])],
        };
        // section 0 -> a.rs#1, section 1 -> ghost file, section 2 -> a.rs#0
        let story = story_one_section_per_hunk(vec![("a.rs", 1), ("ghost.rs", 0), ("a.rs", 0)]);
        let maps = crate::story::LookupMaps::build(Some(&story));
        let positions =
            Positions::compute(&identity_view(&diff), &maps, &CollapseState::default());

        // a.rs#0 renders first (position order), belongs to section 2
        assert_eq!(positions.sections.len(), 2);
        assert_eq!(positions.section_indices, vec![2, 0]);
        assert_eq!(positions.sections, vec![1, 3]);
    }

    #[test]
    fn hunk_shared_across_sections_counts_only_for_the_first() {
        let diff = Diff {
            files: vec![make_file("a.rs", &[1])],
        };
        // both sections reference the same hunk; ownership goes to section 0
        let story = story_one_section_per_hunk(vec![("a.rs", 0), ("a.rs", 0)]);
        let maps = crate::story::LookupMaps::build(Some(&story));
        let positions =
            Positions::compute(&identity_view(&diff), &maps, &CollapseState::default());

        // section 1 owns no hunk of its own, so it gets no jump position
        // even though its shared hunk is visible
        assert_eq!(positions.section_indices, vec![0]);
        assert_eq!(positions.sections, vec![1]);
    }

    #[test]
    fn section_positions_respect_filtered_view() {
        let diff = Diff {
            files: vec![make_file("a.rs", &[2, 2])],
        };
        let story = story_one_section_per_hunk(vec![("a.rs", 0), ("a.rs", 1)]);
        let maps = crate::story::LookupMaps::build(Some(&story));
        let view = SectionView::project(&diff, Some(&story), Some(1));
        let positions = Positions::compute(&view, &maps, &CollapseState::default());

        // only section 1's hunk is visible
        assert_eq!(positions.hunks.len(), 1);
        assert_eq!(positions.section_indices, vec![1]);
    }

    #[test]
    fn collapse_in_filtered_view_uses_original_key() {
        let diff = Diff {
            files: vec![make_file("a.rs", &[3, 4])],
        };
        let story = story_one_section_per_hunk(vec![("a.rs", 0), ("a.rs", 1)]);
        let maps = crate::story::LookupMaps::build(Some(&story));
        let view = SectionView::project(&diff, Some(&story), Some(1));

        // collapsing original hunk 1 must affect the filtered view, where it
        // sits at filtered position 0
        let mut collapse = CollapseState::default();
        collapse.toggle(&HunkKey::new("a.rs", 1));
        let positions = Positions::compute(&view, &maps, &collapse);
        assert_eq!(positions.total_lines, 2); // header + collapsed line
    }

    #[test]
    fn index_at_finds_enclosing_unit() {
        let list = vec![0, 5, 9];
        assert_eq!(Positions::index_at(&list, 0), Some(0));
        assert_eq!(Positions::index_at(&list, 4), Some(0));
        assert_eq!(Positions::index_at(&list, 5), Some(1));
        assert_eq!(Positions::index_at(&list, 100), Some(2));
        assert_eq!(Positions::index_at(&[], 3), None);
        assert_eq!(Positions::index_at(&[2, 5], 1), None);
    }
}
