use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, InputMode};
use crate::case::Verdict;

use super::styles;

/// Compute the display width of a list of spans
fn spans_width(spans: &[Span]) -> usize {
    spans.iter().map(|s| s.content.chars().count()).sum()
}

pub fn top_bar_height(_app: &App, _width: u16) -> u16 {
    2 // case info row + position row
}

/// Render the top status bar.
///
/// Row 1: case id (i/total) · repo · branch        judgment / stale / watching
/// Row 2: file i/total  hunk i/total  section i/total title       Top/Bot/xx%
pub fn render_top_bar(f: &mut Frame, area: Rect, app: &App) {
    let panel_bg = Style::default().bg(styles::PANEL);
    let bar_width = area.width as usize;

    let rows = ratatui::layout::Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            ratatui::layout::Constraint::Length(1),
            ratatui::layout::Constraint::Length(1),
        ])
        .split(area);

    // ── Case info row ──
    let case = app.case();
    let mut info: Vec<Span> = vec![Span::styled(
        format!(" {}", case.case.id),
        Style::default()
            .fg(styles::CYAN)
            .add_modifier(Modifier::BOLD),
    )];
    if app.cases.len() > 1 {
        info.push(Span::styled(
            format!(" ({}/{})", app.active_case + 1, app.cases.len()),
            Style::default().fg(styles::DIM),
        ));
    }
    if !case.case.repo.is_empty() {
        info.push(Span::styled(" · ", Style::default().fg(styles::BORDER)));
        info.push(Span::styled(
            case.case.repo.clone(),
            Style::default().fg(styles::GREEN),
        ));
    }
    if !case.case.branch.is_empty() {
        info.push(Span::styled(" · ", Style::default().fg(styles::BORDER)));
        info.push(Span::styled(
            case.case.branch.clone(),
            Style::default().fg(styles::DIM),
        ));
    }

    let mut right: Vec<Span> = Vec::new();
    if let Some((judgment, stale)) = app.current_judgment() {
        let style = match judgment.verdict {
            Verdict::Pass => styles::verdict_pass_style(),
            Verdict::Fail => styles::verdict_fail_style(),
        };
        right.push(Span::styled(format!(" {} ", judgment.verdict.label()), style));
        if stale {
            right.push(Span::raw(" "));
            right.push(Span::styled("⚠ stale", styles::stale_style()));
        }
        right.push(Span::raw("  "));
    }
    if !app.validation.is_empty() {
        right.push(Span::styled(
            format!("⚠ {} invalid refs", app.validation.len()),
            Style::default().fg(styles::YELLOW),
        ));
        right.push(Span::raw("  "));
    }
    if app.watching {
        right.push(Span::styled(
            "● WATCHING",
            Style::default()
                .fg(styles::GREEN)
                .add_modifier(Modifier::BOLD),
        ));
        right.push(Span::raw(" "));
    }

    let gap = bar_width.saturating_sub(spans_width(&info) + spans_width(&right));
    info.push(Span::raw(" ".repeat(gap)));
    info.extend(right);
    f.render_widget(Paragraph::new(Line::from(info)).style(panel_bg), rows[0]);

    // ── Position row ──
    let (adds, dels) = app.view.diff.stats();
    let mut pos: Vec<Span> = vec![Span::raw(" ")];
    pos.push(indicator(
        "file",
        app.current_file(),
        app.positions.files.len(),
    ));
    pos.push(Span::raw("  "));
    pos.push(indicator(
        "hunk",
        app.current_hunk(),
        app.positions.hunks.len(),
    ));
    pos.push(Span::raw("  "));
    pos.push(indicator(
        "section",
        app.current_section(),
        app.positions.sections.len(),
    ));
    if let Some(title) = current_section_title(app) {
        pos.push(Span::styled(
            format!(" {}", title),
            Style::default().fg(styles::BLUE),
        ));
    }
    if app.active_section.is_some() {
        pos.push(Span::styled(
            " [filtered]",
            Style::default().fg(styles::YELLOW),
        ));
    }

    let mut pos_right: Vec<Span> = vec![
        Span::styled(format!("+{}", adds), styles::status_added()),
        Span::styled(format!(" -{}", dels), styles::status_deleted()),
        Span::raw("  "),
        Span::styled(app.scroll_indicator(), Style::default().fg(styles::DIM)),
        Span::raw(" "),
    ];

    let gap = bar_width.saturating_sub(spans_width(&pos) + spans_width(&pos_right));
    pos.push(Span::raw(" ".repeat(gap)));
    pos.append(&mut pos_right);
    f.render_widget(Paragraph::new(Line::from(pos)).style(panel_bg), rows[1]);
}

fn indicator(label: &str, current: Option<usize>, total: usize) -> Span<'static> {
    let text = match current {
        Some(idx) if total > 0 => format!("{} {}/{}", label, idx + 1, total),
        _ => format!("{} -/{}", label, total),
    };
    Span::styled(text, Style::default().fg(styles::TEXT))
}

fn current_section_title(app: &App) -> Option<String> {
    let story = app.story()?;
    let original_idx = match app.active_section {
        Some(idx) => idx,
        None => {
            let visible = app.current_section()?;
            *app.positions.section_indices.get(visible)?
        }
    };
    let title = &story.sections.get(original_idx)?.title;
    if title.is_empty() {
        None
    } else {
        Some(title.clone())
    }
}

/// A key-label hint pair, e.g. ("n", " hunks ")
struct Hint {
    key: String,
    label: String,
}

impl Hint {
    fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }
    fn width(&self) -> usize {
        self.key.len() + self.label.len()
    }
}

fn build_hints(app: &App) -> Vec<Hint> {
    let mut hints = vec![
        Hint::new("j/k", " scroll "),
        Hint::new("n/N", " hunks "),
        Hint::new("f/F", " files "),
        Hint::new("s/S", " sections "),
        Hint::new("Enter", " filter section "),
        Hint::new("␣", " collapse "),
        Hint::new("z", " collapse all "),
        Hint::new("p", " pass "),
        Hint::new("x", " fail "),
        Hint::new("e", " export "),
        Hint::new("t", " syntax "),
        Hint::new("d", " word diff "),
    ];
    if app.cases.len() > 1 {
        hints.push(Hint::new("[/]", " cases "));
    }
    hints.push(Hint::new("w", " watch "));
    hints.push(Hint::new("q", " quit "));
    hints
}

/// Pack hints into rows that fit within `width`
fn pack_hint_lines(hints: &[Hint], width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut current_spans: Vec<Span<'static>> = Vec::new();
    let mut current_w: usize = 1;

    for hint in hints {
        let hw = hint.width();
        if current_w + hw > width && !current_spans.is_empty() {
            lines.push(Line::from(current_spans));
            current_spans = Vec::new();
            current_w = 1;
        }
        if current_spans.is_empty() {
            current_spans.push(Span::raw(" "));
        }
        current_spans.push(Span::styled(hint.key.clone(), styles::key_hint_style()));
        current_spans.push(Span::styled(
            hint.label.clone(),
            Style::default().fg(styles::DIM),
        ));
        current_w += hw;
    }
    if !current_spans.is_empty() {
        lines.push(Line::from(current_spans));
    }
    if lines.is_empty() {
        lines.push(Line::from(vec![Span::raw(" ")]));
    }
    lines
}

pub fn bottom_bar_height(app: &App, width: u16) -> u16 {
    match &app.input_mode {
        InputMode::Critique { .. } => 1,
        InputMode::Normal => {
            let lines = pack_hint_lines(&build_hints(app), width as usize);
            (lines.len() as u16).max(1)
        }
    }
}

/// Render the bottom bar: critique input while judging, key hints otherwise
pub fn render_bottom_bar(f: &mut Frame, area: Rect, app: &App) {
    let panel_bg = Style::default().bg(styles::PANEL);

    match &app.input_mode {
        InputMode::Critique { verdict, input } => {
            let (label, accent) = match verdict {
                Verdict::Pass => ("pass", styles::GREEN),
                Verdict::Fail => ("fail", styles::RED),
            };
            let spans = vec![
                Span::styled(
                    format!(" {} ", label),
                    Style::default()
                        .fg(styles::BG)
                        .bg(accent)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" critique: ", Style::default().fg(styles::DIM)),
                Span::styled(input.clone(), Style::default().fg(styles::TEXT)),
                Span::styled("█", Style::default().fg(accent)),
                Span::raw("  "),
                Span::styled("Enter", styles::key_hint_style()),
                Span::styled(" save  ", Style::default().fg(styles::DIM)),
                Span::styled("Esc", styles::key_hint_style()),
                Span::styled(" cancel", Style::default().fg(styles::DIM)),
            ];
            f.render_widget(Paragraph::new(Line::from(spans)).style(panel_bg), area);
        }
        InputMode::Normal => {
            let lines = pack_hint_lines(&build_hints(app), area.width as usize);
            let constraints: Vec<ratatui::layout::Constraint> = (0..lines.len() as u16)
                .map(|_| ratatui::layout::Constraint::Length(1))
                .collect();
            let rows = ratatui::layout::Layout::default()
                .direction(ratatui::layout::Direction::Vertical)
                .constraints(constraints)
                .split(area);
            for (i, line) in lines.into_iter().enumerate() {
                f.render_widget(Paragraph::new(line).style(panel_bg), rows[i]);
            }
        }
    }
}

/// Render the transient notification in the top-right corner
pub fn render_notice(f: &mut Frame, area: Rect, message: &str) {
    let width = (message.chars().count() as u16 + 4).min(area.width);
    let notice_area = Rect {
        x: area.x + area.width.saturating_sub(width + 2),
        y: area.y + 2,
        width,
        height: 1,
    };
    let notice = Paragraph::new(Line::from(vec![
        Span::styled(" ● ", Style::default().fg(styles::GREEN)),
        Span::styled(message.to_string(), Style::default().fg(styles::TEXT)),
        Span::raw(" "),
    ]))
    .style(Style::default().bg(styles::PANEL).fg(styles::TEXT));
    f.render_widget(notice, notice_area);
}
