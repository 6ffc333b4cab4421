use similar::{ChangeTag, TextDiff};

use crate::diff::{DiffLine, LineType};

/// One run of characters in a word-diffed line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub changed: bool,
}

/// Word-level segments for a paired delete/add line couple
#[derive(Debug, Clone)]
pub struct WordDiff {
    pub old_segments: Vec<Segment>,
    pub new_segments: Vec<Segment>,
}

/// Minimum share of unchanged characters for word-level highlighting to be
/// worth showing. Below this the pair is effectively a rewrite and renders
/// plainly.
const SIGNIFICANCE_THRESHOLD: f64 = 0.30;

/// Pair changed lines within a hunk for word-level diffing.
///
/// Whenever a maximal run of consecutive deleted lines is immediately
/// followed by a maximal run of consecutive added lines, lines pair
/// positionally 1:1 up to the shorter run's length. Excess lines and runs
/// with no opposite partner get `None`.
///
/// Returns, per line index, the index of its partner line.
pub fn pair_changed_runs(lines: &[DiffLine]) -> Vec<Option<usize>> {
    let mut partners: Vec<Option<usize>> = vec![None; lines.len()];
    let mut i = 0;
    while i < lines.len() {
        if lines[i].line_type != LineType::Delete {
            i += 1;
            continue;
        }
        // maximal delete run
        let del_start = i;
        while i < lines.len() && lines[i].line_type == LineType::Delete {
            i += 1;
        }
        let del_len = i - del_start;
        // must be immediately followed by an add run
        let add_start = i;
        while i < lines.len() && lines[i].line_type == LineType::Add {
            i += 1;
        }
        let add_len = i - add_start;
        if add_len == 0 {
            continue;
        }
        for k in 0..del_len.min(add_len) {
            partners[del_start + k] = Some(add_start + k);
            partners[add_start + k] = Some(del_start + k);
        }
    }
    partners
}

/// Compute word-level segments for a delete/add pair, or `None` when the pair
/// fails the significance gate (fewer than 30% of characters unchanged).
pub fn word_segments(old: &str, new: &str) -> Option<WordDiff> {
    let diff = TextDiff::from_words(old, new);

    let mut equal_chars = 0usize;
    let mut old_segments: Vec<Segment> = Vec::new();
    let mut new_segments: Vec<Segment> = Vec::new();

    for change in diff.iter_all_changes() {
        let text = change.value();
        match change.tag() {
            ChangeTag::Equal => {
                equal_chars += text.chars().count();
                push_segment(&mut old_segments, text, false);
                push_segment(&mut new_segments, text, false);
            }
            ChangeTag::Delete => push_segment(&mut old_segments, text, true),
            ChangeTag::Insert => push_segment(&mut new_segments, text, true),
        }
    }

    let total = old.chars().count().max(new.chars().count());
    if total == 0 {
        return None;
    }
    let unchanged_ratio = equal_chars as f64 / total as f64;
    if unchanged_ratio < SIGNIFICANCE_THRESHOLD {
        return None;
    }

    Some(WordDiff {
        old_segments,
        new_segments,
    })
}

/// Append text to the segment list, merging into the previous segment when
/// the changed flag matches
fn push_segment(segments: &mut Vec<Segment>, text: &str, changed: bool) {
    if let Some(last) = segments.last_mut() {
        if last.changed == changed {
            last.text.push_str(text);
            return;
        }
    }
    segments.push(Segment {
        text: text.to_string(),
        changed,
    });
}
