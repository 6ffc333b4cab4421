use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

use super::styles;
use super::utils::word_wrap;

/// Render the story side panel: classification metadata, the section tree,
/// the validation report, and any recorded judgment.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::LEFT)
        .border_style(Style::default().fg(styles::BORDER));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = build_lines(app, inner.width as usize);
    let paragraph = Paragraph::new(lines)
        .style(Style::default().bg(styles::BG))
        .scroll((app.story_scroll, 0));
    f.render_widget(paragraph, inner);
}

fn build_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let wrap_w = width.saturating_sub(2).max(8);

    // ── Case metadata ──
    lines.push(Line::from(Span::styled(
        format!(" {}", app.case().case.id),
        Style::default()
            .fg(styles::CYAN)
            .add_modifier(Modifier::BOLD),
    )));

    let Some(story) = app.story() else {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " (no classification)".to_string(),
            Style::default().fg(styles::MUTED),
        )));
        push_judgment_lines(app, &mut lines);
        return lines;
    };

    let mut meta = format!(" {}", story.narrative_pattern.label());
    if !story.change_type.is_empty() {
        meta.push_str(&format!(" · {}", story.change_type));
    }
    lines.push(Line::from(Span::styled(
        meta,
        Style::default().fg(styles::DIM),
    )));
    lines.push(Line::from(""));

    if !story.summary.is_empty() {
        for wrapped in word_wrap(&story.summary, wrap_w) {
            lines.push(Line::from(Span::styled(
                format!(" {}", wrapped),
                Style::default().fg(styles::TEXT),
            )));
        }
        lines.push(Line::from(""));
    }

    // ── Section tree ──
    lines.push(Line::from(Span::styled(
        format!(" Sections ({})", story.sections.len()),
        Style::default()
            .fg(styles::BRIGHT)
            .add_modifier(Modifier::BOLD),
    )));

    let cursor_section = app
        .current_section()
        .and_then(|visible| app.positions.section_indices.get(visible).copied());

    for (idx, section) in story.sections.iter().enumerate() {
        let filtered_here = app.active_section == Some(idx);
        let cursor_here = cursor_section == Some(idx) && app.active_section.is_none();
        let marker = if filtered_here {
            "▣"
        } else if cursor_here {
            "▸"
        } else {
            " "
        };
        let title_style = if filtered_here || cursor_here {
            Style::default()
                .fg(styles::BLUE)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(styles::TEXT)
        };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), Style::default().fg(styles::BLUE)),
            Span::styled(
                format!("[{}] ", section.role.label()),
                Style::default().fg(styles::PURPLE),
            ),
            Span::styled(section.title.clone(), title_style),
        ]));

        if !section.explanation.is_empty() {
            for wrapped in word_wrap(&section.explanation, wrap_w.saturating_sub(3)) {
                lines.push(Line::from(Span::styled(
                    format!("   {}", wrapped),
                    Style::default().fg(styles::DIM),
                )));
            }
        }

        for hunk_ref in &section.hunks {
            let category_style = if hunk_ref.category.is_dimmed() {
                Style::default().fg(styles::MUTED)
            } else {
                Style::default().fg(styles::GREEN)
            };
            let mut spans = vec![
                Span::styled(
                    format!("   {}#{} ", hunk_ref.file, hunk_ref.hunk_index),
                    Style::default().fg(styles::DIM),
                ),
                Span::styled(hunk_ref.category.label().to_string(), category_style),
            ];
            if !hunk_ref.collapse_summary.is_empty() {
                spans.push(Span::styled(
                    format!(" · {}", hunk_ref.collapse_summary),
                    Style::default().fg(styles::MUTED),
                ));
            }
            lines.push(Line::from(spans));
        }
        if idx + 1 < story.sections.len() {
            lines.push(Line::from(""));
        }
    }

    // ── Validation report ──
    if !app.validation.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" Validation ({})", app.validation.len()),
            Style::default()
                .fg(styles::YELLOW)
                .add_modifier(Modifier::BOLD),
        )));
        for error in &app.validation {
            for wrapped in word_wrap(&error.to_string(), wrap_w.saturating_sub(3)) {
                lines.push(Line::from(Span::styled(
                    format!("   {}", wrapped),
                    Style::default().fg(styles::YELLOW),
                )));
            }
        }
    }

    push_judgment_lines(app, &mut lines);
    lines
}

fn push_judgment_lines(app: &App, lines: &mut Vec<Line<'static>>) {
    let Some((judgment, stale)) = app.current_judgment() else {
        return;
    };
    lines.push(Line::from(""));
    let verdict_style = match judgment.verdict {
        crate::case::Verdict::Pass => styles::verdict_pass_style(),
        crate::case::Verdict::Fail => styles::verdict_fail_style(),
    };
    let mut spans = vec![Span::styled(
        format!(" {} ", judgment.verdict.label()),
        verdict_style,
    )];
    if stale {
        spans.push(Span::styled(
            " ⚠ stale".to_string(),
            styles::stale_style(),
        ));
    }
    lines.push(Line::from(spans));
    if !judgment.critique.is_empty() {
        lines.push(Line::from(Span::styled(
            format!(" {}", judgment.critique),
            Style::default().fg(styles::DIM),
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::case::{compute_diff_hash, LoadedCase, ReviewCase};
    use crate::config::SrConfig;
    use std::path::PathBuf;

    const DIFF: &str = "diff --git a/main.go b/main.go\n\
        --- a/main.go\n\
        +++ b/main.go\n\
        @@ -1,0 +1,2 @@\n\
        +one\n\
        +two\n";

    fn app_with(classification: Option<&str>) -> App {
        let case = ReviewCase {
            id: "panel-case".to_string(),
            repo: String::new(),
            branch: String::new(),
            base_commit: String::new(),
            head_commit: String::new(),
            diff: DIFF.to_string(),
            classification: classification.map(|c| serde_json::from_str(c).unwrap()),
        };
        let loaded = LoadedCase {
            diff: crate::diff::parse_diff(DIFF),
            diff_hash: compute_diff_hash(DIFF),
            case,
            path: PathBuf::from("/tmp/panel-case.json"),
        };
        let mut config = SrConfig::default();
        config.display.syntax_highlighting = false;
        App::new(vec![loaded], config).unwrap()
    }

    fn rendered(app: &App) -> String {
        build_lines(app, 60)
            .iter()
            .map(|l| {
                l.spans
                    .iter()
                    .map(|s| s.content.as_ref())
                    .collect::<String>()
                    + "\n"
            })
            .collect()
    }

    #[test]
    fn panel_shows_sections_and_metadata() {
        let app = app_with(Some(
            r#"{
                "change_type": "bugfix",
                "narrative_pattern": "before-after",
                "summary": "Two small lines.",
                "sections": [
                    {"role": "fix", "title": "The fix", "explanation": "Why it works.",
                     "hunks": [{"file": "main.go", "hunk_index": 0, "category": "core"}]}
                ]
            }"#,
        ));
        let text = rendered(&app);
        assert!(text.contains("panel-case"));
        assert!(text.contains("before-after"));
        assert!(text.contains("Two small lines."));
        assert!(text.contains("[fix] The fix"));
        assert!(text.contains("main.go#0 core"));
    }

    #[test]
    fn panel_handles_missing_classification() {
        let app = app_with(None);
        assert!(rendered(&app).contains("(no classification)"));
    }

    #[test]
    fn validation_errors_surface_in_panel() {
        let app = app_with(Some(
            r#"{
                "narrative_pattern": "cause-effect",
                "sections": [
                    {"role": "core", "title": "x",
                     "hunks": [{"file": "ghost.go", "hunk_index": 0, "category": "core"}]}
                ]
            }"#,
        ));
        let text = rendered(&app);
        assert!(text.contains("Validation (1)"));
        assert!(text.contains("ghost.go"));
    }
}
