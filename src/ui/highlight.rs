use ratatui::style::{Color, Style};
use ratatui::text::Span;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;

const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Cached syntax highlighting state, loaded once and reused for all files.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme: String,
}

impl Highlighter {
    pub fn new() -> Self {
        Self::with_theme(DEFAULT_THEME)
    }

    /// Build a highlighter using the named syntect theme, falling back to the
    /// default dark theme when the name is unknown.
    pub fn with_theme(theme: &str) -> Self {
        let theme_set = ThemeSet::load_defaults();
        let theme = if theme_set.themes.contains_key(theme) {
            theme.to_string()
        } else {
            log::warn!("Unknown theme {:?}, using {}", theme, DEFAULT_THEME);
            DEFAULT_THEME.to_string()
        };
        Highlighter {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set,
            theme,
        }
    }

    /// Whether a language can be detected for this path. Dimmed hunks and
    /// unknown file types skip tokenization entirely.
    pub fn has_language(&self, filename: &str) -> bool {
        self.syntax_set
            .find_syntax_for_file(filename)
            .ok()
            .flatten()
            .is_some()
    }

    /// Highlight a single line of code, returning styled spans.
    /// `filename` is used to detect the language (e.g., "main.rs" → Rust).
    /// `base_style` supplies the background to layer token colors on top of,
    /// so add/delete backgrounds are preserved under syntax foregrounds.
    pub fn highlight_line(&self, line: &str, filename: &str, base_style: Style) -> Vec<Span<'static>> {
        let syntax = self
            .syntax_set
            .find_syntax_for_file(filename)
            .ok()
            .flatten()
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = &self.theme_set.themes[&self.theme];

        let mut highlighter = HighlightLines::new(syntax, theme);

        // syntect needs a trailing newline
        let input = if line.ends_with('\n') {
            line.to_string()
        } else {
            format!("{}\n", line)
        };

        match highlighter.highlight_line(&input, &self.syntax_set) {
            Ok(ranges) => ranges
                .into_iter()
                .map(|(syn_style, text)| {
                    let text = text.trim_end_matches('\n');
                    let fg = Color::Rgb(
                        syn_style.foreground.r,
                        syn_style.foreground.g,
                        syn_style.foreground.b,
                    );
                    // Token foreground over the line type's background
                    Span::styled(text.to_string(), base_style.fg(fg))
                })
                .collect(),
            Err(_) => {
                // Fallback: return unstyled
                vec![Span::styled(line.to_string(), base_style)]
            }
        }
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}
