//! The monitor loop

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::source::{ChangeStream, InotifySource};
use crate::error::{Result, WatchError};
use crate::watcher::Watcher;

/// Drives the registered watchers from an initial scan and a change stream
pub struct ChangeMonitor<S: ChangeStream = InotifySource> {
    root: PathBuf,
    source: S,
    watchers: Vec<Box<dyn Watcher>>,
}

impl ChangeMonitor<InotifySource> {
    /// Monitor `root` with `inotifywait`
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let source = InotifySource::new(root.clone());
        Self::with_source(root, source)
    }
}

impl<S: ChangeStream> ChangeMonitor<S> {
    pub fn with_source(root: impl Into<PathBuf>, source: S) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            return Err(WatchError::InvalidPath(root));
        }
        Ok(Self {
            root,
            source,
            watchers: Vec::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Register a watcher. Watchers run in registration order; registering
    /// the same kind twice runs it twice.
    pub fn add_watcher(&mut self, watcher: impl Watcher + 'static) {
        self.watchers.push(Box::new(watcher));
    }

    /// Start the change stream, bring every file up to date, then process
    /// change events until the stream ends.
    ///
    /// The stream is stopped on every way out of this function, including
    /// errors and panics inside a watcher.
    pub fn run(&mut self) -> Result<()> {
        let mut source = StopGuard(&mut self.source);
        source.start()?;

        tracing::debug!("Scanning {}", self.root.display());
        scan(&self.root, &self.watchers);

        while let Some(path) = source.next_changed_path() {
            tracing::debug!("Change event for {}", path.display());
            dispatch(&self.watchers, &path, true);
        }

        tracing::debug!("Change stream ended");
        Ok(())
    }

    /// Run the initial scan without starting the change stream
    pub fn scan(&self) {
        scan(&self.root, &self.watchers);
    }

    /// Hand one path to the watchers. Without `force`, a watcher whose
    /// `check_file` reports the path as up to date is skipped.
    pub fn dispatch(&self, path: &Path, force: bool) {
        dispatch(&self.watchers, path, force);
    }
}

/// Depth-first walk over the files below `root`, skipping up-to-date ones
fn scan(root: &Path, watchers: &[Box<dyn Watcher>]) {
    for entry in WalkDir::new(root).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                dispatch(watchers, entry.path(), false);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Skipping unreadable entry during scan: {e}"),
        }
    }
}

fn dispatch(watchers: &[Box<dyn Watcher>], path: &Path, force: bool) {
    for watcher in watchers {
        if watcher.watches_file(path) && (force || !watcher.check_file(path)) {
            watcher.process_file(path);
        }
    }
}

/// Stops the wrapped stream when dropped
struct StopGuard<'a, S: ChangeStream>(&'a mut S);

impl<S: ChangeStream> Deref for StopGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.0
    }
}

impl<S: ChangeStream> DerefMut for StopGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.0
    }
}

impl<S: ChangeStream> Drop for StopGuard<'_, S> {
    fn drop(&mut self) {
        self.0.stop();
    }
}
