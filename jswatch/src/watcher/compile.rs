//! Minify JavaScript sources next to themselves

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use super::Watcher;
use crate::compiler::{default_target_path, Backend};
use crate::report::Reporter;

/// Compiles `*.js` into `*.min.js` with the run's backend
pub struct CompileWatcher {
    backend: Arc<Backend>,
    reporter: Arc<dyn Reporter>,
}

impl CompileWatcher {
    pub fn new(backend: Arc<Backend>, reporter: Arc<dyn Reporter>) -> Self {
        Self { backend, reporter }
    }
}

impl Watcher for CompileWatcher {
    fn watches_file(&self, path: &Path) -> bool {
        let name = path.to_string_lossy();
        name.ends_with(".js") && !name.ends_with(".min.js") && !name.ends_with("-min.js")
    }

    fn check_file(&self, path: &Path) -> bool {
        let target = default_target_path(path);
        match (modified(&target), modified(path)) {
            (Some(target_time), Some(source_time)) => target_time > source_time,
            _ => false,
        }
    }

    fn process_file(&self, path: &Path) {
        self.reporter.compiling(path);
        match self.backend.compile(path, None) {
            Ok(result) => self.reporter.report(&result),
            Err(e) => self.reporter.critical(&e.to_string()),
        }
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}
