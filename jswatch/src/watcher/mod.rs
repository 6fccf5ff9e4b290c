//! Watchers decide which files matter and what to do with them
//!
//! The monitor calls every registered watcher for every path it sees. A
//! watcher first filters by name, then (during the initial scan only) asks
//! whether the file is already up to date, and finally processes it.

mod compile;


pub use compile::CompileWatcher;

use std::path::Path;

pub trait Watcher {
    /// Whether this watcher cares about `path`. Pure name check, no I/O.
    fn watches_file(&self, path: &Path) -> bool;

    /// `true` when `path` is up to date and needs no processing. Looks at
    /// modification times only.
    fn check_file(&self, path: &Path) -> bool;

    /// Act on `path`. Failures are reported, never propagated.
    fn process_file(&self, path: &Path);
}
