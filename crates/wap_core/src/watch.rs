//! Rebuilding on file changes.
//!
//! [`WatchLoop`] is a two-state machine (idle, rebuilding) driven by a channel of
//! change batches. A batch is the list of paths one filesystem notification
//! reported. Batches touching no tracked path are ignored. Otherwise the project
//! state is captured and, if it differs from the last captured state, the rebuild
//! cycle runs. Closing the channel ends the loop.
//!
//! The event source is separate ([`spawn_watcher`]) so the loop can be driven by
//! hand in tests.

use camino::{Utf8Path, Utf8PathBuf};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::sync::mpsc::{self, Receiver};
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::error::Result;
use crate::report::Report;

/// A file and when it was last modified. Size is kept too since some filesystems
/// only track modification time coarsely.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileState {
    pub path: Utf8PathBuf,
    pub modified: SystemTime,
    pub len: u64,
}

impl FileState {
    fn of(path: &Utf8Path) -> Option<Self> {
        let metadata = std::fs::metadata(path).ok()?;
        Some(Self {
            path: path.to_owned(),
            modified: metadata.modified().ok()?,
            len: metadata.len(),
        })
    }
}

/// Every file under a set of paths, with its state. Two captures differ when a file
/// was added, removed, renamed or written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectState {
    files: BTreeSet<FileState>,
}

impl ProjectState {
    /// Missing paths and files that vanish mid-walk are skipped.
    pub fn capture<'a>(paths: impl IntoIterator<Item = &'a Utf8PathBuf>) -> Self {
        let mut files = BTreeSet::new();
        for root in paths {
            if root.is_file() {
                files.extend(FileState::of(root));
                continue;
            }
            let walk = WalkDir::new(root).follow_links(true).into_iter();
            for entry in walk.filter_map(|e| e.ok()) {
                if !entry.file_type().is_file() {
                    continue;
                }
                if let Ok(path) = Utf8PathBuf::from_path_buf(entry.into_path()) {
                    files.extend(FileState::of(&path));
                }
            }
        }
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Rebuilding,
}

/// What one batch led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// No tracked path was touched.
    Ignored,
    /// Tracked paths were touched but no file changed.
    Unchanged,
    Rebuilt,
    /// The cycle failed and was reported. Paths the cycle tracked before failing
    /// are still adopted.
    Failed,
}

/// Counts of batch outcomes over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchSummary {
    pub batches: usize,
    pub rebuilds: usize,
    pub failures: usize,
}

pub struct WatchLoop<F> {
    state: WatchState,
    tracked: BTreeSet<Utf8PathBuf>,
    last_capture: ProjectState,
    cycle: F,
}

impl<F> WatchLoop<F>
where
    F: FnMut(&mut Report, &mut BTreeSet<Utf8PathBuf>) -> Result<()>,
{
    /// `tracked` is what the initial build produced (package watch paths and the
    /// config file). `cycle` rebuilds and relinks. It receives the current tracked
    /// set and replaces it as soon as the new package is known, so a build that
    /// fails afterwards still watches the paths that can fix it.
    pub fn new(tracked: BTreeSet<Utf8PathBuf>, cycle: F) -> Self {
        let last_capture = ProjectState::capture(&tracked);
        Self {
            state: WatchState::Idle,
            tracked,
            last_capture,
            cycle,
        }
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn tracked(&self) -> &BTreeSet<Utf8PathBuf> {
        &self.tracked
    }

    fn is_relevant(&self, batch: &[Utf8PathBuf]) -> bool {
        batch
            .iter()
            .any(|path| self.tracked.iter().any(|tracked| path.starts_with(tracked)))
    }

    pub fn handle_batch(&mut self, batch: &[Utf8PathBuf], report: &mut Report) -> BatchOutcome {
        if !self.is_relevant(batch) {
            return BatchOutcome::Ignored;
        }

        // captured before building so edits made during the cycle trigger another one
        let capture = ProjectState::capture(&self.tracked);
        if capture == self.last_capture {
            tracing::debug!("tracked files unchanged, skipping rebuild");
            return BatchOutcome::Unchanged;
        }
        self.last_capture = capture;

        self.state = WatchState::Rebuilding;
        tracing::info!("change detected, rebuilding");
        let mut tracked = self.tracked.clone();
        let result = (self.cycle)(report, &mut tracked);
        if tracked != self.tracked {
            self.last_capture = ProjectState::capture(&tracked);
            self.tracked = tracked;
        }

        let outcome = match result {
            Ok(()) => BatchOutcome::Rebuilt,
            Err(err) => {
                report.error(match err.hint() {
                    Some(hint) => format!("{err} ({hint})"),
                    None => err.to_string(),
                });
                BatchOutcome::Failed
            }
        };
        self.state = WatchState::Idle;
        outcome
    }

    /// Handles batches until the channel closes. `after_batch` sees each batch's
    /// outcome and events.
    pub fn run(
        mut self,
        batches: &Receiver<Vec<Utf8PathBuf>>,
        mut after_batch: impl FnMut(BatchOutcome, &mut Report),
    ) -> WatchSummary {
        let mut summary = WatchSummary::default();
        for batch in batches.iter() {
            let mut report = Report::new();
            let outcome = self.handle_batch(&batch, &mut report);

            summary.batches += 1;
            match outcome {
                BatchOutcome::Rebuilt => summary.rebuilds += 1,
                BatchOutcome::Failed => summary.failures += 1,
                BatchOutcome::Ignored | BatchOutcome::Unchanged => {}
            }
            after_batch(outcome, &mut report);
        }
        summary
    }
}

/// Watches `root` recursively and forwards each non-access event's paths as a batch.
///
/// The returned watcher must be kept alive for events to flow.
pub fn spawn_watcher(root: &Utf8Path) -> Result<(RecommendedWatcher, Receiver<Vec<Utf8PathBuf>>)> {
    let (tx, rx) = mpsc::channel();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) if event.kind.is_access() => {}
        Ok(event) => {
            let paths: Vec<Utf8PathBuf> = event
                .paths
                .into_iter()
                .filter_map(|path| Utf8PathBuf::from_path_buf(path).ok())
                .collect();
            let _ = tx.send(paths);
        }
        Err(err) => tracing::warn!("file watcher error: {err}"),
    })?;
    watcher.watch(root.as_std_path(), RecursiveMode::Recursive)?;

    Ok((watcher, rx))
}
