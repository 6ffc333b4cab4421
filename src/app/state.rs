use std::time::Instant;

use anyhow::Result;
use ratatui::text::Text;

use crate::case::{
    judgment_for, load_case, load_judgments, save_judgment, timestamp_now, Judgment, JudgmentFile,
    LoadedCase, Verdict,
};
use crate::config::SrConfig;
use crate::export;
use crate::story::{
    validate_classification, CollapseState, HunkKey, LookupMaps, StoryClassification,
    ValidationError,
};
use crate::ui::diff_area::{render_diff, RenderOptions};
use crate::ui::highlight::Highlighter;

use super::filter::SectionView;
use super::positions::Positions;

/// Whether we're navigating or typing a judgment critique
#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Critique { verdict: Verdict, input: String },
}

/// Top-level application state.
///
/// The rendered diff text and the position lists are caches over (case,
/// active section, collapse state, width); every mutation of those inputs
/// goes through [`App::rebuild`], which replaces both wholesale. Scroll is
/// the only navigation state stored directly; the current file/hunk/section
/// are always derived from it via the position lists.
pub struct App {
    pub cases: Vec<LoadedCase>,
    pub active_case: usize,

    /// Vertical scroll offset into the rendered diff text
    pub scroll: u16,

    /// Index of the section the view is filtered to (None = full diff)
    pub active_section: Option<usize>,

    pub maps: LookupMaps,
    pub collapse: CollapseState,
    pub view: SectionView,
    pub positions: Positions,
    pub diff_text: Text<'static>,

    /// Structural validation report for the active case
    pub validation: Vec<ValidationError>,

    /// Judgment sidecar for the active case's directory
    pub judgments: JudgmentFile,

    pub config: SrConfig,
    pub highlighter: Highlighter,
    pub input_mode: InputMode,

    /// Scroll offset of the story panel (independent of the diff scroll)
    pub story_scroll: u16,

    /// Terminal width the diff text was rendered at
    width: u16,

    pub should_quit: bool,
    pub watching: bool,

    /// Transient status message with its creation time (auto-cleared by tick)
    pub notice: Option<(String, Instant)>,
}

impl App {
    pub fn new(cases: Vec<LoadedCase>, config: SrConfig) -> Result<Self> {
        anyhow::ensure!(!cases.is_empty(), "No review cases loaded");
        let highlighter = Highlighter::with_theme(&config.display.theme);
        let mut app = App {
            cases,
            active_case: 0,
            scroll: 0,
            active_section: None,
            maps: LookupMaps::default(),
            collapse: CollapseState::default(),
            view: SectionView::project(&crate::diff::Diff::default(), None, None),
            positions: Positions::default(),
            diff_text: Text::default(),
            validation: Vec::new(),
            judgments: JudgmentFile::default(),
            config,
            highlighter,
            input_mode: InputMode::Normal,
            story_scroll: 0,
            width: 80,
            should_quit: false,
            watching: false,
            notice: None,
        };
        app.load_case_state();
        Ok(app)
    }

    pub fn case(&self) -> &LoadedCase {
        &self.cases[self.active_case]
    }

    pub fn story(&self) -> Option<&StoryClassification> {
        self.case().case.classification.as_ref()
    }

    /// Full state reset for the active case: lookup maps, collapse state,
    /// validation report, and judgment sidecar are all replaced, never merged.
    pub fn load_case_state(&mut self) {
        let story = self.case().case.classification.clone();
        self.maps = LookupMaps::build(story.as_ref());
        self.collapse = CollapseState::from_maps(&self.maps);
        self.validation = validate_classification(&self.case().diff, story.as_ref());
        self.judgments = load_judgments(&self.case().path);
        self.active_section = None;
        self.scroll = 0;
        self.story_scroll = 0;
        self.rebuild();
    }

    /// Recompute the view projection, position lists, and rendered diff text
    pub fn rebuild(&mut self) {
        let story = self.case().case.classification.clone();
        self.view = SectionView::project(&self.case().diff, story.as_ref(), self.active_section);
        self.positions = Positions::compute(&self.view, &self.maps, &self.collapse);
        let hl = if self.config.display.syntax_highlighting {
            Some(&self.highlighter)
        } else {
            None
        };
        let opts = RenderOptions {
            width: self.width,
            word_diff: self.config.display.word_diff,
        };
        self.diff_text = render_diff(&self.view, &self.maps, &self.collapse, hl, &opts);
        self.scroll = self.scroll.min(self.max_scroll());
    }

    /// Re-render when the terminal width changes (header fill lines depend on
    /// it; line counts and positions do not)
    pub fn set_width(&mut self, width: u16) {
        if width != self.width {
            self.width = width;
            self.rebuild();
        }
    }

    fn max_scroll(&self) -> u16 {
        // Clamp, don't truncate: diffs past the u16 scroll ceiling pin to it
        self.positions
            .total_lines
            .saturating_sub(1)
            .min(u16::MAX as usize) as u16
    }

    // ── Scrolling ──

    pub fn scroll_down(&mut self, amount: u16) {
        self.scroll = self.scroll.saturating_add(amount).min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, amount: u16) {
        self.scroll = self.scroll.saturating_sub(amount);
    }

    pub fn scroll_top(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_bottom(&mut self) {
        self.scroll = self.max_scroll();
    }

    /// "Top", "Bot", or a percentage of the scroll range
    pub fn scroll_indicator(&self) -> String {
        let max = self.max_scroll();
        if self.scroll == 0 {
            "Top".to_string()
        } else if self.scroll >= max {
            "Bot".to_string()
        } else {
            format!("{}%", (self.scroll as usize * 100) / max as usize)
        }
    }

    // ── Current-position derivation ──

    pub fn current_file(&self) -> Option<usize> {
        Positions::index_at(&self.positions.files, self.scroll as usize)
    }

    pub fn current_hunk(&self) -> Option<usize> {
        Positions::index_at(&self.positions.hunks, self.scroll as usize)
    }

    /// Index into the visible-section lists (not the original section index)
    pub fn current_section(&self) -> Option<usize> {
        Positions::index_at(&self.positions.sections, self.scroll as usize)
    }

    // ── Jump navigation ──

    fn jump_next(&mut self, list: &[usize]) {
        let line = self.scroll as usize;
        if let Some(&pos) = list.iter().find(|&&p| p > line) {
            self.scroll = (pos as u16).min(self.max_scroll());
        }
    }

    fn jump_prev(&mut self, list: &[usize]) {
        let line = self.scroll as usize;
        if let Some(&pos) = list.iter().rev().find(|&&p| p < line) {
            self.scroll = pos as u16;
        }
    }

    pub fn next_file(&mut self) {
        let list = self.positions.files.clone();
        self.jump_next(&list);
    }

    pub fn prev_file(&mut self) {
        let list = self.positions.files.clone();
        self.jump_prev(&list);
    }

    pub fn next_hunk(&mut self) {
        let list = self.positions.hunks.clone();
        self.jump_next(&list);
    }

    pub fn prev_hunk(&mut self) {
        let list = self.positions.hunks.clone();
        self.jump_prev(&list);
    }

    pub fn next_section(&mut self) {
        let list = self.positions.sections.clone();
        self.jump_next(&list);
    }

    pub fn prev_section(&mut self) {
        let list = self.positions.sections.clone();
        self.jump_prev(&list);
    }

    // ── Section filter ──

    /// Filter the view to the section under the cursor, or clear an active
    /// filter. Scroll resets because positions change meaning entirely.
    pub fn toggle_section_filter(&mut self) {
        if self.active_section.is_some() {
            self.active_section = None;
        } else {
            let visible = match self.current_section() {
                Some(idx) => idx,
                None => return,
            };
            self.active_section = self.positions.section_indices.get(visible).copied();
        }
        self.scroll = 0;
        self.rebuild();
    }

    // ── Collapse ──

    /// Join key of the nth rendered hunk, translated to original-index space
    fn hunk_key_at(&self, flat_idx: usize) -> Option<HunkKey> {
        let mut remaining = flat_idx;
        for file in self.view.diff.renderable_files() {
            if remaining < file.hunks.len() {
                return Some(self.view.original_key(file.display_path(), remaining));
            }
            remaining -= file.hunks.len();
        }
        None
    }

    /// Toggle collapse of the hunk under the cursor, keeping the cursor
    /// anchored on that hunk's (possibly shifted) start line
    pub fn toggle_collapse_current(&mut self) {
        let Some(flat_idx) = self.current_hunk() else {
            return;
        };
        let Some(key) = self.hunk_key_at(flat_idx) else {
            return;
        };
        self.collapse.toggle(&key);
        self.rebuild();
        if let Some(&pos) = self.positions.hunks.get(flat_idx) {
            self.scroll = (pos as u16).min(self.max_scroll());
        }
    }

    /// Bulk toggle over the LLM-recommended-collapsed set
    pub fn toggle_recommended(&mut self) {
        if self.collapse.recommended_count() == 0 {
            self.notify("No collapse recommendations in this classification");
            return;
        }
        self.collapse.toggle_recommended();
        self.rebuild();
    }

    // ── Display toggles ──

    pub fn toggle_syntax_highlighting(&mut self) {
        self.config.display.syntax_highlighting = !self.config.display.syntax_highlighting;
        self.rebuild();
        let state = if self.config.display.syntax_highlighting {
            "on"
        } else {
            "off"
        };
        self.notify(&format!("Syntax highlighting {}", state));
        self.persist_config();
    }

    pub fn toggle_word_diff(&mut self) {
        self.config.display.word_diff = !self.config.display.word_diff;
        self.rebuild();
        let state = if self.config.display.word_diff {
            "on"
        } else {
            "off"
        };
        self.notify(&format!("Word diff {}", state));
        self.persist_config();
    }

    fn persist_config(&mut self) {
        if let Err(e) = crate::config::save_config(&self.config) {
            self.notify(&format!("Failed to save config: {}", e));
        }
    }

    // ── Case cycling ──

    pub fn next_case(&mut self) {
        if self.cases.len() > 1 {
            self.active_case = (self.active_case + 1) % self.cases.len();
            self.load_case_state();
        }
    }

    pub fn prev_case(&mut self) {
        if self.cases.len() > 1 {
            self.active_case = (self.active_case + self.cases.len() - 1) % self.cases.len();
            self.load_case_state();
        }
    }

    /// Reload a case file in place after a watch event. The active case gets
    /// a full state reset; background cases just swap their data.
    pub fn reload_case_file(&mut self, path: &std::path::Path) {
        let Some(idx) = self.cases.iter().position(|c| c.path == path) else {
            return;
        };
        match load_case(path) {
            Ok(reloaded) => {
                self.cases[idx] = reloaded;
                if idx == self.active_case {
                    self.load_case_state();
                }
                self.notify(&format!("Reloaded {}", path.display()));
            }
            Err(e) => {
                log::warn!("Reload failed for {}: {}", path.display(), e);
                self.notify(&format!("Reload failed: {}", e));
            }
        }
    }

    // ── Judgment ──

    pub fn start_judgment(&mut self, verdict: Verdict) {
        self.input_mode = InputMode::Critique {
            verdict,
            input: String::new(),
        };
    }

    pub fn cancel_judgment(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn submit_judgment(&mut self) -> Result<()> {
        let InputMode::Critique { verdict, input } = &self.input_mode else {
            return Ok(());
        };
        let judgment = Judgment {
            case_id: self.case().case.id.clone(),
            verdict: *verdict,
            critique: input.clone(),
            diff_hash: self.case().diff_hash.clone(),
            timestamp: timestamp_now(),
        };
        let label = judgment.verdict.label();
        save_judgment(&self.case().path, judgment)?;
        self.judgments = load_judgments(&self.case().path);
        self.input_mode = InputMode::Normal;
        self.notify(&format!("Judgment recorded: {}", label));
        Ok(())
    }

    /// Stored judgment for the active case, with staleness flag
    pub fn current_judgment(&self) -> Option<(&Judgment, bool)> {
        judgment_for(&self.judgments, &self.case().case.id, &self.case().diff_hash)
    }

    // ── Export ──

    pub fn export_transcript(&mut self) -> Result<()> {
        let case = self.case();
        let judgment = self.current_judgment().map(|(j, _)| j.clone());
        let path = export::export_transcript(
            &case.path,
            &case.case,
            &case.diff,
            case.case.classification.as_ref(),
            judgment.as_ref(),
        )?;
        self.notify(&format!("Exported {}", path.display()));
        Ok(())
    }

    // ── Notifications ──

    pub fn notify(&mut self, message: &str) {
        self.notice = Some((message.to_string(), Instant::now()));
    }

    pub fn tick(&mut self) {
        if let Some((_, created)) = &self.notice {
            if created.elapsed().as_secs() >= 3 {
                self.notice = None;
            }
        }
    }
}
