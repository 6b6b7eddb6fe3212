//! Filesystem trigger source for the watch loop.
//!
//! Watches the parent directory of each input table (non-recursive) and
//! signals a shared [`Notify`] whenever one of the input files is created,
//! modified, renamed or removed. Events for any other file in those
//! directories (the output table, its staged `.tmp` sibling) are ignored.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::error::WatchError;

/// Keeps the `notify` watcher alive; dropping it stops observation.
pub struct TriggerSource {
    watched: Vec<PathBuf>,
    _watcher: RecommendedWatcher,
}

impl TriggerSource {
    /// Start watching `inputs`. Each relevant event calls `trigger.notify_one()`.
    ///
    /// `Notify` holds at most one permit, so any number of events that land
    /// before the loop wakes collapse into a single check.
    pub fn start(inputs: &[&Path], trigger: Arc<Notify>) -> Result<Self, WatchError> {
        let watched = inputs
            .iter()
            .map(|p| resolve(p))
            .collect::<io::Result<Vec<_>>>()?;
        let dirs: BTreeSet<PathBuf> = watched
            .iter()
            .filter_map(|p| p.parent().map(Path::to_path_buf))
            .collect();

        let targets = watched.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if is_relevant(&event, &targets) {
                    debug!(kind = ?event.kind, paths = ?event.paths, "input table changed");
                    trigger.notify_one();
                }
            }
            Err(e) => warn!(error = %e, "filesystem watcher error"),
        })?;

        for dir in &dirs {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
            info!(path = %dir.display(), "watching directory for input changes");
        }

        Ok(Self {
            watched,
            _watcher: watcher,
        })
    }

    /// Absolute paths of the watched input tables.
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }
}

/// Absolute path with a canonical parent directory, so it compares equal to
/// the paths `notify` reports. The file itself need not exist yet.
pub(crate) fn resolve(path: &Path) -> io::Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("watched path {} has no file name", path.display()),
        )
    })?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Ok(fs::canonicalize(parent)?.join(name))
}

pub(crate) fn is_relevant(event: &Event, targets: &[PathBuf]) -> bool {
    let kind_matches = matches!(
        event.kind,
        EventKind::Any | EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    kind_matches && event.paths.iter().any(|p| targets.contains(p))
}
