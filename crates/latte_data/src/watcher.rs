//! Hot-reload support for table sources
//!
//! Watches the data directory and reports table files that changed, so the
//! manager can drop just the affected domains.
//!
//! Events are debounced on the trailing edge: a file is reported only once it
//! has been quiet for the debounce window, so an editor's truncate-then-write
//! sequence yields a single change after the final write.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use thiserror::Error;

use crate::loader::TableFormat;

/// Watcher setup errors
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Failed to create watcher: {0}")]
    Create(notify::Error),
    #[error("Failed to watch {path}: {source}")]
    Watch {
        path: String,
        #[source]
        source: notify::Error,
    },
}

/// Files with events that have not settled yet
struct DebounceState {
    /// Last event time per file
    pending: HashMap<PathBuf, Instant>,
    debounce_duration: Duration,
}

impl DebounceState {
    fn new(debounce_duration: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            debounce_duration,
        }
    }

    /// Record an event; a newer event restarts the file's quiet period
    fn record(&mut self, path: &Path, now: Instant) {
        self.pending.insert(path.to_path_buf(), now);
    }

    /// Remove and return files that have been quiet for the debounce window
    fn take_settled(&mut self, now: Instant) -> Vec<PathBuf> {
        let window = self.debounce_duration;
        let mut settled: Vec<PathBuf> = self
            .pending
            .iter()
            .filter(|(_, last)| now.saturating_duration_since(**last) >= window)
            .map(|(path, _)| path.clone())
            .collect();
        for path in &settled {
            self.pending.remove(path);
        }
        settled.sort();
        settled
    }
}

/// Table source watcher for hot-reload
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
    debounce: Arc<Mutex<DebounceState>>,
    data_dir: PathBuf,
}

impl SourceWatcher {
    /// Watch a data directory
    pub fn new(data_dir: &Path) -> Result<Self, WatchError> {
        Self::with_debounce(data_dir, Duration::from_millis(100))
    }

    /// Watch with a custom debounce duration
    pub fn with_debounce(data_dir: &Path, debounce: Duration) -> Result<Self, WatchError> {
        let debounce = Arc::new(Mutex::new(DebounceState::new(debounce)));
        let debounce_clone = debounce.clone();

        let mut watcher =
            notify::recommended_watcher(move |result: Result<Event, notify::Error>| match result {
                Ok(event) => Self::handle_event(event, &debounce_clone),
                Err(e) => log::warn!("Data watcher error: {}", e),
            })
            .map_err(WatchError::Create)?;

        watcher
            .watch(data_dir, RecursiveMode::Recursive)
            .map_err(|source| WatchError::Watch {
                path: data_dir.display().to_string(),
                source,
            })?;

        log::info!("Watching master data directory: {}", data_dir.display());

        Ok(Self {
            _watcher: watcher,
            debounce,
            data_dir: data_dir.to_path_buf(),
        })
    }

    fn handle_event(event: Event, debounce: &Mutex<DebounceState>) {
        if !matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ) {
            return;
        }

        let now = Instant::now();
        let mut debounce = debounce.lock();
        for path in event.paths.iter().filter(|p| is_table_file(p)) {
            debounce.record(path, now);
        }
    }

    /// Watched directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Drain table files whose changes have settled (non-blocking)
    pub fn poll_changes(&mut self) -> Vec<PathBuf> {
        let changed = self.debounce.lock().take_settled(Instant::now());
        for path in &changed {
            log::debug!("Table source changed: {}", path.display());
        }
        changed
    }

    /// Poll until at least one change settles or the timeout passes
    pub fn wait_for_changes(&mut self, timeout: Duration) -> Vec<PathBuf> {
        let deadline = Instant::now() + timeout;
        loop {
            let changed = self.poll_changes();
            if !changed.is_empty() || Instant::now() >= deadline {
                return changed;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }
}

/// Check whether a path has a table file extension
pub fn is_table_file(path: &Path) -> bool {
    path.to_str()
        .map(|p| TableFormat::from_path(p).is_ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_table_file() {
        assert!(is_table_file(Path::new("/data/DT_HitStop.json")));
        assert!(is_table_file(Path::new("DT_CharacterAsset.toml")));
        assert!(!is_table_file(Path::new("/data/notes.txt")));
        assert!(!is_table_file(Path::new("/data/.DT_HitStop.json.swp")));
    }

    #[test]
    fn test_debounce_waits_for_quiet_period() {
        let mut state = DebounceState::new(Duration::from_millis(100));
        let path = Path::new("DT_HitStop.json");
        let start = Instant::now();

        state.record(path, start);
        assert!(state.take_settled(start + Duration::from_millis(50)).is_empty());

        // A second event inside the window restarts the quiet period
        state.record(path, start + Duration::from_millis(80));
        assert!(state.take_settled(start + Duration::from_millis(150)).is_empty());

        let settled = state.take_settled(start + Duration::from_millis(180));
        assert_eq!(settled, vec![PathBuf::from("DT_HitStop.json")]);
        assert!(state.take_settled(start + Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn test_debounce_reports_each_file_once() {
        let mut state = DebounceState::new(Duration::from_millis(10));
        let start = Instant::now();

        state.record(Path::new("b.json"), start);
        state.record(Path::new("a.json"), start);
        state.record(Path::new("a.json"), start);

        let settled = state.take_settled(start + Duration::from_millis(20));
        assert_eq!(settled, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
    }
}
