use std::collections::HashMap;

use ratatui::text::{Line, Span, Text};

use crate::app::SectionView;
use crate::story::{CollapseState, LookupMaps};

use super::highlight::Highlighter;
use super::styles;
use super::worddiff::{self, Segment, WordDiff};

/// Knobs the renderer needs beyond the view itself
pub struct RenderOptions {
    pub width: u16,
    /// Word-level highlighting for paired delete/add runs
    pub word_diff: bool,
}

/// Render the diff area for the current view and collapse state.
///
/// Line costs here must match `Positions::compute` exactly: one terminal row
/// per logical line, no wrapping, no blank separators. The scroll machinery
/// depends on that parity.
pub fn render_diff(
    view: &SectionView,
    maps: &LookupMaps,
    collapse: &CollapseState,
    hl: Option<&Highlighter>,
    opts: &RenderOptions,
) -> Text<'static> {
    let gutter_width = view.diff.gutter_width();
    let mut lines: Vec<Line<'static>> = Vec::new();

    for file in view.diff.renderable_files() {
        let path = file.display_path().to_string();
        lines.push(file_header_line(
            &path,
            file.adds,
            file.dels,
            opts.width as usize,
        ));

        if file.hunks.is_empty() {
            lines.push(Line::from(Span::styled(
                "(empty)".to_string(),
                ratatui::style::Style::default().fg(styles::MUTED),
            )));
            continue;
        }

        for (filtered_pos, hunk) in file.hunks.iter().enumerate() {
            let key = view.original_key(&path, filtered_pos);
            let dimmed = maps.is_dimmed(&key);

            if collapse.is_collapsed(&key) {
                lines.push(collapsed_hunk_line(
                    &hunk.range_header(),
                    maps.category_of(&key).map(|c| c.label()),
                    maps.collapse_text(&key),
                    dimmed,
                ));
                continue;
            }

            // Hunk header
            let header_style = if dimmed {
                styles::dimmed_hunk_header_style()
            } else {
                styles::hunk_header_style()
            };
            lines.push(Line::from(Span::styled(hunk.display_header(), header_style)));

            // Word-diff pairs, computed once per delete/add couple
            let word_diffs = if opts.word_diff && !dimmed {
                compute_word_diffs(&hunk.lines)
            } else {
                HashMap::new()
            };

            for (line_idx, diff_line) in hunk.lines.iter().enumerate() {
                lines.push(content_line(
                    diff_line,
                    gutter_width,
                    dimmed,
                    word_diffs.get(&line_idx),
                    hl,
                    &path,
                ));
            }
        }
    }

    Text::from(lines)
}

/// Which side of a word-diff pair a line sits on
enum PairSide {
    Old,
    New,
}

/// Word-diff results per line index within one hunk. Only pairs that pass the
/// significance gate get entries.
fn compute_word_diffs(lines: &[crate::diff::DiffLine]) -> HashMap<usize, (PairSide, WordDiff)> {
    let partners = worddiff::pair_changed_runs(lines);
    let mut result = HashMap::new();
    for (idx, partner) in partners.iter().enumerate() {
        let Some(partner_idx) = partner else { continue };
        if lines[idx].line_type != crate::diff::LineType::Delete {
            continue; // compute once per pair, from the delete side
        }
        if let Some(diff) = worddiff::word_segments(&lines[idx].content, &lines[*partner_idx].content)
        {
            result.insert(idx, (PairSide::Old, diff.clone()));
            result.insert(*partner_idx, (PairSide::New, diff));
        }
    }
    result
}

/// Single box-drawn file summary line filling exactly the terminal width:
/// `── path ─────────── +A -D ──`
fn file_header_line(path: &str, adds: usize, dels: usize, width: usize) -> Line<'static> {
    let left = format!("── {} ", path);
    let stats = format!(" +{} -{} ", adds, dels);
    let right = "──";
    let used = left.chars().count() + stats.chars().count() + right.chars().count();
    let fill = "─".repeat(width.saturating_sub(used));

    Line::from(vec![
        Span::styled("── ".to_string(), styles::dim_style()),
        Span::styled(format!("{} ", path), styles::file_header_style()),
        Span::styled(fill, styles::dim_style()),
        Span::styled(format!(" +{}", adds), styles::status_added()),
        Span::styled(format!(" -{} ", dels), styles::status_deleted()),
        Span::styled(right.to_string(), styles::dim_style()),
    ])
}

/// One-line summary for a collapsed hunk:
/// `@@ -a,b +c,d @@ ▸ [category] collapse text`
fn collapsed_hunk_line(
    range_header: &str,
    category: Option<&str>,
    collapse_text: Option<&str>,
    dimmed: bool,
) -> Line<'static> {
    let text = collapse_text.unwrap_or("collapsed");
    let summary = match category {
        Some(cat) => format!("{} ▸ [{}] {}", range_header, cat, text),
        None => format!("{} ▸ {}", range_header, text),
    };
    let style = if dimmed {
        styles::dimmed_hunk_header_style()
    } else {
        styles::hunk_header_style()
    };
    Line::from(Span::styled(summary, style))
}

/// Gutter + prefix + body for one content line
fn content_line(
    diff_line: &crate::diff::DiffLine,
    gutter_width: usize,
    dimmed: bool,
    word_diff: Option<&(PairSide, WordDiff)>,
    hl: Option<&Highlighter>,
    path: &str,
) -> Line<'static> {
    use crate::diff::LineType;

    let base_style = if dimmed {
        styles::dimmed_line_style()
    } else {
        match diff_line.line_type {
            LineType::Add => styles::add_style(),
            LineType::Delete => styles::del_style(),
            LineType::Context => styles::default_style(),
        }
    };

    let old_num = diff_line
        .old_num
        .map(|n| format!("{:>width$}", n, width = gutter_width))
        .unwrap_or_else(|| " ".repeat(gutter_width));
    let new_num = diff_line
        .new_num
        .map(|n| format!("{:>width$}", n, width = gutter_width))
        .unwrap_or_else(|| " ".repeat(gutter_width));

    let mut spans = vec![
        Span::styled(format!("{} {}", old_num, new_num), styles::gutter_style()),
        Span::styled(" ".to_string(), base_style),
        Span::styled(diff_line.line_type.prefix().to_string(), base_style),
    ];

    // Body styling precedence: word-diff segments, then syntax tokens, then
    // plain. Dimmed hunks already forced base_style muted and get no word
    // diff, so they always land in the plain branch.
    if !dimmed {
        if let Some((side, diff)) = word_diff {
            let segments = match side {
                PairSide::Old => &diff.old_segments,
                PairSide::New => &diff.new_segments,
            };
            spans.extend(segment_spans(segments, diff_line.line_type));
            return Line::from(spans).style(base_style);
        }
        if let Some(hl) = hl {
            if hl.has_language(path) && !diff_line.content.is_empty() {
                spans.extend(hl.highlight_line(&diff_line.content, path, base_style));
                return Line::from(spans).style(base_style);
            }
        }
    }

    spans.push(Span::styled(diff_line.content.clone(), base_style));
    Line::from(spans).style(base_style)
}

fn segment_spans(segments: &[Segment], line_type: crate::diff::LineType) -> Vec<Span<'static>> {
    use crate::diff::LineType;
    let (plain, emphasized) = match line_type {
        LineType::Add => (styles::add_style(), styles::add_word_style()),
        LineType::Delete => (styles::del_style(), styles::del_word_style()),
        LineType::Context => (styles::default_style(), styles::default_style()),
    };
    segments
        .iter()
        .map(|seg| {
            let style = if seg.changed { emphasized } else { plain };
            Span::styled(seg.text.clone(), style)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Positions;
    use crate::diff::{Diff, DiffLine, FileDiff, FileOp, Hunk, LineType};
    use crate::story::{
        Category, HunkKey, HunkRef, NarrativePattern, Section, SectionRole, StoryClassification,
    };

    fn opts() -> RenderOptions {
        RenderOptions {
            width: 80,
            word_diff: true,
        }
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn make_line(line_type: LineType, content: &str, old: Option<usize>, new: Option<usize>) -> DiffLine {
        DiffLine {
            line_type,
            content: content.to_string(),
            old_num: old,
            new_num: new,
        }
    }

    fn make_file(path: &str, hunks: Vec<Hunk>) -> FileDiff {
        let adds = hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| l.line_type == LineType::Add)
            .count();
        let dels = hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| l.line_type == LineType::Delete)
            .count();
        FileDiff {
            old_path: path.to_string(),
            new_path: path.to_string(),
            op: FileOp::Modified,
            is_binary: false,
            hunks,
            adds,
            dels,
        }
    }

    fn two_add_hunk() -> Hunk {
        Hunk {
            old_start: 1,
            old_count: 0,
            new_start: 1,
            new_count: 2,
            section_label: String::new(),
            lines: vec![
                make_line(LineType::Add, "first added", None, Some(1)),
                make_line(LineType::Add, "second added", None, Some(2)),
            ],
        }
    }

    fn identity_view(diff: &Diff) -> SectionView {
        SectionView::project(diff, None, None)
    }

    #[test]
    fn end_to_end_single_file_scenario() {
        // one file, one hunk of two added lines, one section classifying it
        let diff = Diff {
            files: vec![make_file("main.go", vec![two_add_hunk()])],
        };
        let story = StoryClassification {
            change_type: "feature".to_string(),
            narrative_pattern: NarrativePattern::CorePeriphery,
            summary: String::new(),
            sections: vec![Section {
                role: SectionRole::Core,
                title: "The change".to_string(),
                explanation: String::new(),
                hunks: vec![HunkRef {
                    file: "main.go".to_string(),
                    hunk_index: 0,
                    category: Category::Core,
                    collapsed: false,
                    collapse_summary: String::new(),
                }],
            }],
        };
        let maps = LookupMaps::build(Some(&story));
        let collapse = CollapseState::from_maps(&maps);
        let view = identity_view(&diff);
        let text = render_diff(&view, &maps, &collapse, None, &opts());
        let positions = Positions::compute(&view, &maps, &collapse);

        assert_eq!(positions.files.len(), 1);
        assert_eq!(positions.hunks.len(), 1);
        assert_eq!(positions.sections.len(), 1);

        let all: Vec<String> = text.lines.iter().map(line_text).collect();
        assert!(all[0].contains("main.go"));
        assert!(all[0].contains("+2"));
        assert!(all[positions.hunks[0]].contains("@@ -1,0 +1,2 @@"));
        assert!(all.iter().any(|l| l.contains("+first added")));
        assert!(all.iter().any(|l| l.contains("+second added")));
    }

    #[test]
    fn rendered_line_count_matches_positions() {
        let diff = Diff {
            files: vec![
                make_file("a.rs", vec![two_add_hunk(), two_add_hunk()]),
                make_file("b.rs", vec![two_add_hunk()]),
            ],
        };
        let maps = LookupMaps::default();
        let mut collapse = CollapseState::default();
        collapse.toggle(&HunkKey::new("a.rs", 1));
        let view = identity_view(&diff);

        let text = render_diff(&view, &maps, &collapse, None, &opts());
        let positions = Positions::compute(&view, &maps, &collapse);
        assert_eq!(text.lines.len(), positions.total_lines);

        // every hunk position is a hunk header or collapsed summary
        for &pos in &positions.hunks {
            assert!(line_text(&text.lines[pos]).contains("@@"));
        }
        for &pos in &positions.files {
            assert!(line_text(&text.lines[pos]).starts_with("── "));
        }
    }

    #[test]
    fn file_header_fills_exact_width() {
        let line = file_header_line("src/app.rs", 12, 3, 60);
        assert_eq!(line_text(&line).chars().count(), 60);
    }

    #[test]
    fn collapsed_hunk_shows_category_and_text() {
        let line = collapsed_hunk_line(
            "@@ -1,2 +1,2 @@",
            Some("systematic"),
            Some("Renamed helper everywhere"),
            true,
        );
        let text = line_text(&line);
        assert!(text.contains("▸"));
        assert!(text.contains("[systematic]"));
        assert!(text.contains("Renamed helper everywhere"));
    }

    #[test]
    fn collapsed_hunk_defaults_to_collapsed_literal() {
        let line = collapsed_hunk_line("@@ -1,2 +1,2 @@", None, None, false);
        let text = line_text(&line);
        assert!(text.contains("▸ collapsed"));
        assert!(!text.contains("["));
    }

    #[test]
    fn binary_file_renders_nothing() {
        let mut binary = make_file("logo.png", vec![]);
        binary.is_binary = true;
        binary.op = FileOp::Added;
        let diff = Diff {
            files: vec![binary],
        };
        let text = render_diff(
            &identity_view(&diff),
            &LookupMaps::default(),
            &CollapseState::default(),
            None,
            &opts(),
        );
        assert!(text.lines.is_empty());
    }

    #[test]
    fn empty_added_file_shows_placeholder() {
        let mut empty = make_file("new.rs", vec![]);
        empty.op = FileOp::Added;
        let diff = Diff { files: vec![empty] };
        let text = render_diff(
            &identity_view(&diff),
            &LookupMaps::default(),
            &CollapseState::default(),
            None,
            &opts(),
        );
        assert_eq!(text.lines.len(), 2);
        assert_eq!(line_text(&text.lines[1]), "(empty)");
    }

    #[test]
    fn gutter_is_globally_aligned() {
        let wide_hunk = Hunk {
            old_start: 99999,
            old_count: 1,
            new_start: 99999,
            new_count: 1,
            section_label: String::new(),
            lines: vec![make_line(
                LineType::Context,
                "far down",
                Some(99999),
                Some(99999),
            )],
        };
        let diff = Diff {
            files: vec![make_file("a.rs", vec![two_add_hunk(), wide_hunk])],
        };
        let text = render_diff(
            &identity_view(&diff),
            &LookupMaps::default(),
            &CollapseState::default(),
            None,
            &opts(),
        );
        // first content line: 5-wide gutters even though its numbers are small
        let first_content = line_text(&text.lines[2]);
        assert!(first_content.starts_with("      "), "{:?}", first_content);
        assert!(first_content.contains("    1"));
    }

    #[test]
    fn section_filtered_render_uses_original_hunk_metadata() {
        // Two hunks with distinct collapse texts; filtering to the section
        // holding hunk 1 must render hunk 1's text, never hunk 0's.
        let diff = Diff {
            files: vec![make_file("a.rs", vec![two_add_hunk(), two_add_hunk()])],
        };
        let story = StoryClassification {
            change_type: String::new(),
            narrative_pattern: NarrativePattern::CauseEffect,
            summary: String::new(),
            sections: vec![
                Section {
                    role: SectionRole::Core,
                    title: "A".to_string(),
                    explanation: String::new(),
                    hunks: vec![HunkRef {
                        file: "a.rs".to_string(),
                        hunk_index: 1,
                        category: Category::Core,
                        collapsed: true,
                        collapse_summary: "Hunk one text".to_string(),
                    }],
                },
                Section {
                    role: SectionRole::Supporting,
                    title: "B".to_string(),
                    explanation: String::new(),
                    hunks: vec![HunkRef {
                        file: "a.rs".to_string(),
                        hunk_index: 0,
                        category: Category::Systematic,
                        collapsed: true,
                        collapse_summary: "Hunk zero text".to_string(),
                    }],
                },
            ],
        };
        let maps = LookupMaps::build(Some(&story));
        let collapse = CollapseState::from_maps(&maps);
        let view = SectionView::project(&diff, Some(&story), Some(0));
        let text = render_diff(&view, &maps, &collapse, None, &opts());
        let rendered: String = text.lines.iter().map(|l| line_text(l) + "\n").collect();
        assert!(rendered.contains("Hunk one text"));
        assert!(!rendered.contains("Hunk zero text"));
        assert!(!rendered.contains("first added")); // hunk 0 content absent
    }

    #[test]
    fn word_diff_pairs_get_segment_spans() {
        let hunk = Hunk {
            old_start: 1,
            old_count: 1,
            new_start: 1,
            new_count: 1,
            section_label: String::new(),
            lines: vec![
                make_line(LineType::Delete, "let count = 1;", Some(1), None),
                make_line(LineType::Add, "let count = 2;", None, Some(1)),
            ],
        };
        let diff = Diff {
            files: vec![make_file("a.rs", vec![hunk])],
        };
        let text = render_diff(
            &identity_view(&diff),
            &LookupMaps::default(),
            &CollapseState::default(),
            None,
            &opts(),
        );
        // delete line has multiple body spans (gutter, sep, prefix + segments)
        let delete_line = &text.lines[2];
        assert!(delete_line.spans.len() > 4);
        assert_eq!(line_text(delete_line).trim_start(), "1      -let count = 1;");
    }

    #[test]
    fn dimmed_hunk_renders_uniform_and_untokenized() {
        let story = StoryClassification {
            change_type: String::new(),
            narrative_pattern: NarrativePattern::CauseEffect,
            summary: String::new(),
            sections: vec![Section {
                role: SectionRole::Cleanup,
                title: "noise".to_string(),
                explanation: String::new(),
                hunks: vec![HunkRef {
                    file: "a.rs".to_string(),
                    hunk_index: 0,
                    category: Category::Refactoring,
                    collapsed: false,
                    collapse_summary: String::new(),
                }],
            }],
        };
        let diff = Diff {
            files: vec![make_file("a.rs", vec![two_add_hunk()])],
        };
        let maps = LookupMaps::build(Some(&story));
        let hl = Highlighter::new();
        let text = render_diff(
            &identity_view(&diff),
            &maps,
            &CollapseState::default(),
            Some(&hl),
            &opts(),
        );
        // content lines of a dimmed hunk carry exactly one body span
        let content = &text.lines[2];
        assert_eq!(content.spans.len(), 4); // gutter, sep, prefix, body
    }
}
