pub mod diff_area;
pub mod highlight;
mod status_bar;
mod story_panel;
mod styles;
mod utils;
mod worddiff;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::App;

/// Render the entire UI
pub fn draw(f: &mut Frame, app: &App) {
    let top_height = status_bar::top_bar_height(app, f.area().width);
    let bottom_height = status_bar::bottom_bar_height(app, f.area().width);

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(top_height),
            Constraint::Min(1),
            Constraint::Length(bottom_height),
        ])
        .split(f.area());

    status_bar::render_top_bar(f, outer[0], app);

    // Main content: diff area (2/3) + story panel (1/3), panel dropped on
    // narrow terminals
    if outer[1].width < 80 {
        render_diff_area(f, outer[1], app);
    } else {
        let main_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(diff_area_width(outer[1].width)),
                Constraint::Min(0),
            ])
            .split(outer[1]);
        render_diff_area(f, main_area[0], app);
        story_panel::render(f, main_area[1], app);
    }

    status_bar::render_bottom_bar(f, outer[2], app);

    if let Some((message, _)) = &app.notice {
        status_bar::render_notice(f, f.area(), message);
    }
}

/// Width the diff area gets in the horizontal split. The event loop feeds
/// this to [`App::set_width`] so file-header fill lines are rendered at
/// exactly the width the layout will allot.
pub fn diff_area_width(terminal_width: u16) -> u16 {
    if terminal_width < 80 {
        terminal_width
    } else {
        terminal_width * 2 / 3
    }
}

/// The cached diff text scrolled to the app's offset. The text itself is
/// rebuilt only on state changes, never per frame.
fn render_diff_area(f: &mut Frame, area: ratatui::layout::Rect, app: &App) {
    let paragraph = Paragraph::new(app.diff_text.clone())
        .style(Style::default().bg(styles::BG))
        .scroll((app.scroll, 0));
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;

    #[test]
    fn narrow_terminals_give_the_diff_area_the_full_width() {
        assert_eq!(diff_area_width(60), 60);
        assert_eq!(diff_area_width(79), 79);
    }

    #[test]
    fn split_allots_exactly_the_advertised_diff_width() {
        // Widths not divisible by 3 must still match, so header fill lines
        // rendered at diff_area_width() span the allotted column count
        for width in [80u16, 81, 82, 100, 119, 121] {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Length(diff_area_width(width)),
                    Constraint::Min(0),
                ])
                .split(Rect::new(0, 0, width, 40));
            assert_eq!(chunks[0].width, diff_area_width(width));
            assert_eq!(chunks[0].width + chunks[1].width, width);
        }
    }
}
