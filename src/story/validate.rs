use std::collections::HashMap;
use std::fmt;

use crate::diff::Diff;

use super::model::StoryClassification;

/// Why a classification hunk reference doesn't match the diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    /// The referenced file does not appear in the diff at all
    FileNotFound,
    /// The hunk index is outside the file's valid range
    HunkIndexOutOfRange {
        /// Human-readable valid range, e.g. "0-6" ("none" for hunkless files)
        valid_range: String,
    },
}

/// One structural mismatch between a classification and its diff.
///
/// These are reported, never thrown: an orphaned reference simply has no
/// effect on rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub section_index: usize,
    pub file: String,
    pub hunk_index: usize,
    pub reason: ValidationReason,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            ValidationReason::FileNotFound => write!(
                f,
                "section {}: file '{}' (hunk {}) not present in diff",
                self.section_index, self.file, self.hunk_index
            ),
            ValidationReason::HunkIndexOutOfRange { valid_range } => write!(
                f,
                "section {}: hunk index {} out of range for '{}' (valid: {})",
                self.section_index, self.hunk_index, self.file, valid_range
            ),
        }
    }
}

/// Check every hunk reference in the classification against the diff.
///
/// Returns one record per offending reference. An empty report means every
/// reference resolves. Duplicates and unreferenced hunks are not errors;
/// partial classifications must still render.
pub fn validate_classification(
    diff: &Diff,
    story: Option<&StoryClassification>,
) -> Vec<ValidationError> {
    let Some(story) = story else {
        return Vec::new();
    };

    // Hunk counts by display path (the classification references display paths)
    let hunk_counts: HashMap<&str, usize> = diff
        .files
        .iter()
        .map(|f| (f.display_path(), f.hunks.len()))
        .collect();

    let mut errors = Vec::new();
    for (section_index, section) in story.sections.iter().enumerate() {
        for hunk_ref in &section.hunks {
            match hunk_counts.get(hunk_ref.file.as_str()) {
                None => errors.push(ValidationError {
                    section_index,
                    file: hunk_ref.file.clone(),
                    hunk_index: hunk_ref.hunk_index,
                    reason: ValidationReason::FileNotFound,
                }),
                Some(&count) if hunk_ref.hunk_index >= count => {
                    let valid_range = if count == 0 {
                        "none".to_string()
                    } else {
                        format!("0-{}", count - 1)
                    };
                    errors.push(ValidationError {
                        section_index,
                        file: hunk_ref.file.clone(),
                        hunk_index: hunk_ref.hunk_index,
                        reason: ValidationReason::HunkIndexOutOfRange { valid_range },
                    });
                }
                Some(_) => {}
            }
        }
    }

    if !errors.is_empty() {
        log::warn!(
            "classification has {} structural error(s) against the diff",
            errors.len()
        );
    }
    errors
}
