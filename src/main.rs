mod app;
mod case;
mod config;
mod diff;
mod export;
mod story;
mod ui;
mod watch;

use std::io;
use std::path::Path;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Result;
use app::{App, InputMode};
use case::Verdict;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use watch::{CaseWatcher, WatchEvent};

/// Terminal reviewer for LLM story classifications of git diffs
#[derive(Parser)]
#[command(name = "sr", version, about)]
struct Cli {
    /// Case files or directories containing them
    paths: Vec<String>,

    /// Disable live reload of case files
    #[arg(long)]
    no_watch: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = if cli.paths.is_empty() {
        vec![".".to_string()]
    } else {
        cli.paths.clone()
    };
    let cases = case::load_cases(&paths)?;
    let config = config::load_config();
    let mut app = App::new(cases, config)?;

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, !cli.no_watch);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, watch: bool) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let (watch_tx, watch_rx) = mpsc::channel::<WatchEvent>();

    // Debounce state for case reloads
    let mut pending_paths: Vec<String> = Vec::new();
    let mut reload_deadline = Instant::now();

    let case_paths: Vec<std::path::PathBuf> = app.cases.iter().map(|c| c.path.clone()).collect();
    let mut _watcher: Option<CaseWatcher> = if watch {
        let refs: Vec<&Path> = case_paths.iter().map(|p| p.as_path()).collect();
        match CaseWatcher::new(&refs, 500, watch_tx.clone()) {
            Ok(w) => {
                app.watching = true;
                Some(w)
            }
            Err(_) => None,
        }
    } else {
        None
    };

    loop {
        // Header fill depends on the diff area width, so re-render on resize
        let size = terminal.size()?;
        app.set_width(ui::diff_area_width(size.width));

        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                match &app.input_mode {
                    InputMode::Critique { .. } => handle_critique_input(app, key)?,
                    InputMode::Normal => {
                        handle_normal_input(app, key, &watch_tx, &case_paths, &mut _watcher)?
                    }
                }
            }
        }

        // Debounced case reloads from the watcher
        if let Ok(WatchEvent::CasesChanged(paths)) = watch_rx.try_recv() {
            pending_paths.extend(paths);
            reload_deadline = Instant::now() + Duration::from_millis(200);
        }
        if !pending_paths.is_empty() && Instant::now() >= reload_deadline {
            pending_paths.sort();
            pending_paths.dedup();
            for path in pending_paths.drain(..) {
                app.reload_case_file(Path::new(&path));
            }
        }

        app.tick();

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_normal_input(
    app: &mut App,
    key: KeyEvent,
    watch_tx: &mpsc::Sender<WatchEvent>,
    case_paths: &[std::path::PathBuf],
    watcher: &mut Option<CaseWatcher>,
) -> Result<()> {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
        }

        // Scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_down(10);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_up(10);
        }
        KeyCode::PageDown => app.scroll_down(20),
        KeyCode::PageUp => app.scroll_up(20),
        KeyCode::Char('g') | KeyCode::Home => app.scroll_top(),
        KeyCode::Char('G') | KeyCode::End => app.scroll_bottom(),

        // Jump navigation
        KeyCode::Char('n') => app.next_hunk(),
        KeyCode::Char('N') => app.prev_hunk(),
        KeyCode::Char('f') => app.next_file(),
        KeyCode::Char('F') => app.prev_file(),
        KeyCode::Char('s') => app.next_section(),
        KeyCode::Char('S') => app.prev_section(),

        // Section filter
        KeyCode::Enter => app.toggle_section_filter(),

        // Collapse
        KeyCode::Char(' ') => app.toggle_collapse_current(),
        KeyCode::Char('z') => app.toggle_recommended(),

        // Judgment
        KeyCode::Char('p') => app.start_judgment(Verdict::Pass),
        KeyCode::Char('x') => app.start_judgment(Verdict::Fail),

        // Display toggles (persisted to the config file)
        KeyCode::Char('t') => app.toggle_syntax_highlighting(),
        KeyCode::Char('d') => app.toggle_word_diff(),

        // Export transcript
        KeyCode::Char('e') => {
            if let Err(err) = app.export_transcript() {
                app.notify(&format!("Export failed: {}", err));
            }
        }

        // Case cycling
        KeyCode::Char(']') => app.next_case(),
        KeyCode::Char('[') => app.prev_case(),

        // Story panel scroll
        KeyCode::Char('J') => app.story_scroll = app.story_scroll.saturating_add(1),
        KeyCode::Char('K') => app.story_scroll = app.story_scroll.saturating_sub(1),

        // Manual reload of the active case
        KeyCode::Char('r') => {
            let path = app.case().path.clone();
            app.reload_case_file(&path);
        }

        // Toggle watch mode
        KeyCode::Char('w') => {
            if app.watching {
                *watcher = None;
                app.watching = false;
                app.notify("Watch stopped");
            } else {
                let refs: Vec<&Path> = case_paths.iter().map(|p| p.as_path()).collect();
                match CaseWatcher::new(&refs, 500, watch_tx.clone()) {
                    Ok(w) => {
                        *watcher = Some(w);
                        app.watching = true;
                        app.notify("Watching case files...");
                    }
                    Err(e) => {
                        app.notify(&format!("Watch error: {}", e));
                    }
                }
            }
        }

        _ => {}
    }
    Ok(())
}

fn handle_critique_input(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            app.submit_judgment()?;
        }
        KeyCode::Esc => {
            app.cancel_judgment();
        }
        KeyCode::Char(c) => {
            if let InputMode::Critique { input, .. } = &mut app.input_mode {
                input.push(c);
            }
        }
        KeyCode::Backspace => {
            if let InputMode::Critique { input, .. } = &mut app.input_mode {
                input.pop();
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    #[test]
    fn event_loop_accepts_any_backend_with_sendable_errors() {
        // Instantiation alone checks that Backend::Error conversion into
        // anyhow::Error holds for backends besides crossterm's
        let _ = run_app::<TestBackend>;
        let _ = run_app::<CrosstermBackend<std::io::Stdout>>;
    }
}
