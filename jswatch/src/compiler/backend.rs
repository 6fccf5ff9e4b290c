//! The closed set of compiler backends

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::local::LocalBackend;
use super::remote::RemoteBackend;
use super::result::CompilationResult;
use crate::error::{Result, WatchError};

/// Identifies a backend variant in configuration and on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Closure Compiler application run through a local `java`
    Local,
    /// Hosted Closure Compiler service
    Remote,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
            BackendKind::Remote => write!(f, "remote"),
        }
    }
}

#[derive(Debug)]
pub enum Backend {
    Local(LocalBackend),
    Remote(RemoteBackend),
}

impl Backend {
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Local(_) => BackendKind::Local,
            Backend::Remote(_) => BackendKind::Remote,
        }
    }

    /// Compile `source` into `target`, or into [`default_target_path`] when
    /// no target is given.
    ///
    /// Diagnostics the compiler reports end up on the returned result. Errors
    /// are only returned when the compiler could not be run or its answer
    /// could not be understood.
    pub fn compile(&self, source: &Path, target: Option<&Path>) -> Result<CompilationResult> {
        if !source.is_file() {
            return Err(WatchError::InvalidPath(source.to_path_buf()));
        }

        let target = match target {
            Some(target) => target.to_path_buf(),
            None => default_target_path(source),
        };

        match self {
            Backend::Local(backend) => backend.compile(source, &target),
            Backend::Remote(backend) => backend.compile(source, &target),
        }
    }
}

/// Same directory, with a trailing `.js` replaced by `.min.js`
pub fn default_target_path(source: &Path) -> PathBuf {
    let name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.strip_suffix(".js").unwrap_or(&name);
    source.with_file_name(format!("{stem}.min.js"))
}
