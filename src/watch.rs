use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Result;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};

/// Events emitted by the case-file watcher
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// One or more watched case files changed on disk
    CasesChanged(Vec<String>),
}

/// A debounced watcher over the loaded case files. A change event triggers a
/// full reload of the affected case, replacing its maps and collapse state.
pub struct CaseWatcher {
    _watcher: notify_debouncer_mini::Debouncer<RecommendedWatcher>,
}

impl CaseWatcher {
    /// Start watching the given case files. Events are debounced by
    /// `debounce_ms` milliseconds and sent to the provided sender.
    pub fn new(
        case_paths: &[&Path],
        debounce_ms: u64,
        tx: mpsc::Sender<WatchEvent>,
    ) -> Result<Self> {
        let mut debouncer = new_debouncer(
            Duration::from_millis(debounce_ms),
            move |result: std::result::Result<
                Vec<notify_debouncer_mini::DebouncedEvent>,
                notify::Error,
            >| {
                if let Ok(events) = result {
                    let paths: Vec<String> = events
                        .iter()
                        .filter(|e| e.kind == DebouncedEventKind::Any)
                        .map(|e| e.path.to_string_lossy().to_string())
                        .collect();
                    if !paths.is_empty() {
                        let _ = tx.send(WatchEvent::CasesChanged(paths));
                    }
                }
            },
        )?;

        for path in case_paths {
            debouncer
                .watcher()
                .watch(path, RecursiveMode::NonRecursive)?;
        }

        Ok(CaseWatcher {
            _watcher: debouncer,
        })
    }
}
