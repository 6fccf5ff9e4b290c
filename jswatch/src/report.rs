//! Reporting compilation outcomes to the user

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::compiler::CompilationResult;
use crate::logging::{Console, Severity};

/// Receives what a watcher wants the user to see
pub trait Reporter {
    /// A file is about to be compiled
    fn compiling(&self, path: &Path);

    fn report(&self, result: &CompilationResult);

    /// A per-file failure that was caught and will not stop the run
    fn critical(&self, message: &str);
}

/// Status line followed by every error, then every warning
pub fn render_result(result: &CompilationResult) -> Vec<(Severity, String)> {
    let mut lines = Vec::with_capacity(1 + result.errors().len() + result.warnings().len());

    if result.is_successful() {
        lines.push((
            Severity::Success,
            format!(
                "Successfully compiled {} to {}",
                result.source().display(),
                result.target().display()
            ),
        ));
    } else {
        lines.push((
            Severity::Error,
            format!("Failed compiling {}", result.source().display()),
        ));
    }

    lines.extend(
        result
            .errors()
            .iter()
            .map(|error| (Severity::Error, error.to_string())),
    );
    lines.extend(
        result
            .warnings()
            .iter()
            .map(|warning| (Severity::Warning, warning.to_string())),
    );
    lines
}

/// Writes reports to the terminal, sharing the console (and its timestamp
/// state) with the rest of the program
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    console: Arc<Console>,
}

impl ConsoleReporter {
    pub fn new(console: Arc<Console>) -> Self {
        Self { console }
    }
}

impl Reporter for ConsoleReporter {
    fn compiling(&self, path: &Path) {
        self.console
            .info(&format!("Detected change for {}, compiling...", path.display()));
    }

    fn report(&self, result: &CompilationResult) {
        for (severity, message) in render_result(result) {
            self.console.log(severity, &message);
        }
    }

    fn critical(&self, message: &str) {
        self.console.critical(message);
    }
}

/// What a [`RecordingReporter`] saw, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    Compiling(PathBuf),
    Compiled(CompilationResult),
    Critical(String),
}

/// Keeps every report in memory instead of printing it
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.lock().clone()
    }

    /// Sources of every compile that produced a result, in order
    pub fn compiled_sources(&self) -> Vec<PathBuf> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                ReportEvent::Compiled(result) => Some(result.source().to_path_buf()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ReportEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ReportEvent>> {
        match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Reporter for RecordingReporter {
    fn compiling(&self, path: &Path) {
        self.push(ReportEvent::Compiling(path.to_path_buf()));
    }

    fn report(&self, result: &CompilationResult) {
        self.push(ReportEvent::Compiled(result.clone()));
    }

    fn critical(&self, message: &str) {
        self.push(ReportEvent::Critical(message.to_string()));
    }
}
