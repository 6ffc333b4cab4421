use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::case::{Judgment, ReviewCase};
use crate::diff::Diff;
use crate::story::StoryClassification;

/// Build a flat markdown transcript of the case: header, the diff with
/// file/hunk markers, the classification tree, and a fixed review prompt.
/// Meant for appending to a dataset file or pasting into an agent session.
pub fn build_transcript(
    case: &ReviewCase,
    diff: &Diff,
    story: Option<&StoryClassification>,
    judgment: Option<&Judgment>,
) -> String {
    let mut out = String::new();

    out.push_str("# Diff Classification Review\n\n");
    let _ = writeln!(out, "Case: {}", case.id);
    if !case.repo.is_empty() {
        let _ = writeln!(out, "Repo: {}", case.repo);
    }
    if !case.branch.is_empty() {
        let _ = writeln!(out, "Branch: {}", case.branch);
    }
    if !case.base_commit.is_empty() || !case.head_commit.is_empty() {
        let _ = writeln!(out, "Commits: {}..{}", case.base_commit, case.head_commit);
    }
    out.push('\n');

    out.push_str("## Input: Raw Diff\n\n");
    for file in &diff.files {
        let _ = writeln!(out, "=== {} ({}) ===", file.display_path(), file.op.label());
        if file.is_binary {
            out.push_str("(binary)\n");
            continue;
        }
        for hunk in &file.hunks {
            let _ = writeln!(
                out,
                "@@ -{},{} +{},{} @@",
                hunk.old_start, hunk.old_count, hunk.new_start, hunk.new_count
            );
            for line in &hunk.lines {
                let _ = writeln!(out, "{}{}", line.line_type.prefix(), line.content);
            }
        }
    }
    out.push('\n');

    out.push_str("## Output: Story Classification\n\n");
    match story {
        Some(story) => {
            let _ = writeln!(out, "Pattern: {}", story.narrative_pattern.label());
            if !story.change_type.is_empty() {
                let _ = writeln!(out, "Change type: {}", story.change_type);
            }
            if !story.summary.is_empty() {
                let _ = writeln!(out, "Summary: {}", story.summary);
            }
            out.push('\n');
            for (idx, section) in story.sections.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{}. [{}] {}",
                    idx + 1,
                    section.role.label(),
                    section.title
                );
                if !section.explanation.is_empty() {
                    let _ = writeln!(out, "   {}", section.explanation);
                }
                for hunk_ref in &section.hunks {
                    let mut line = format!(
                        "   - {} hunk {} ({})",
                        hunk_ref.file,
                        hunk_ref.hunk_index,
                        hunk_ref.category.label()
                    );
                    if hunk_ref.collapsed {
                        line.push_str(" [collapsed]");
                    }
                    if !hunk_ref.collapse_summary.is_empty() {
                        let _ = write!(line, ": {}", hunk_ref.collapse_summary);
                    }
                    out.push_str(&line);
                    out.push('\n');
                }
            }
        }
        None => {
            out.push_str("(no classification)\n");
        }
    }
    out.push('\n');

    if let Some(judgment) = judgment {
        let _ = writeln!(out, "Reviewer verdict: {}", judgment.verdict.label());
        if !judgment.critique.is_empty() {
            let _ = writeln!(out, "Critique: {}", judgment.critique);
        }
        out.push('\n');
    }

    out.push_str("## Your Task\n\n");
    out.push_str(
        "Evaluate whether the story classification above faithfully organizes \
         the diff: sections should group related hunks, categories should \
         separate core changes from mechanical ones, and collapse summaries \
         should describe what they hide. Reply with pass or fail and a short \
         critique.\n",
    );

    out
}

/// Write the transcript next to the case file as `<case stem>.review.md`
pub fn export_transcript(
    case_path: &Path,
    case: &ReviewCase,
    diff: &Diff,
    story: Option<&StoryClassification>,
    judgment: Option<&Judgment>,
) -> Result<std::path::PathBuf> {
    let transcript = build_transcript(case, diff, story, judgment);
    let stem = case_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| case.id.clone());
    let out_path = case_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{}.review.md", stem));
    std::fs::write(&out_path, transcript)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;
    Ok(out_path)
}
