//! Error types for jswatch
//!
//! Diagnostics reported by a compiler are data on a `CompilationResult`, never
//! errors. The variants here cover the failures around them: missing tools,
//! bad paths, misuse of the watch process, and broken compiler transports.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the watch/compile core
pub type Result<T> = std::result::Result<T, WatchError>;

#[derive(Error, Debug)]
pub enum WatchError {
    /// A required external tool or service is unavailable. Fatal at startup.
    #[error("missing dependency: {0}")]
    MissingDependency(String),

    #[error("the path \"{}\" does not exist", .0.display())]
    InvalidPath(PathBuf),

    /// `start()` was called on a change source that is already running
    #[error("the watch process is already running on path \"{}\"", .0.display())]
    ProcessAlreadyRunning(PathBuf),

    /// Spawning, transport, or response-parsing failure of an external command
    #[error("{0}")]
    CommandExecution(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl WatchError {
    pub fn command(message: impl Into<String>) -> Self {
        WatchError::CommandExecution(message.into())
    }
}
