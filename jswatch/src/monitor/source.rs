//! Change events from a long-running `inotifywait` process

use std::ffi::{OsStr, OsString};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::error::{Result, WatchError};
use crate::process;

/// Watch tool looked up on PATH
pub const INOTIFYWAIT: &str = "inotifywait";

/// A blocking stream of changed file paths
pub trait ChangeStream {
    /// Begin producing events. Fails if already started.
    fn start(&mut self) -> Result<()>;

    /// Block until the next changed path; `None` once the stream has ended
    fn next_changed_path(&mut self) -> Option<PathBuf>;

    /// Release the underlying resources. Safe to call repeatedly.
    fn stop(&mut self);
}

/// How long the watch process gets to exit after SIGTERM before it is killed
pub const STOP_GRACE: Duration = Duration::from_secs(1);

/// Owns the watch process so it can be shut down from another thread, e.g. a
/// signal handler, as well as from the source itself
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    child: Arc<Mutex<Option<Child>>>,
}

impl ShutdownHandle {
    fn lock(&self) -> MutexGuard<'_, Option<Child>> {
        match self.child.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn set(&self, child: Child) {
        *self.lock() = Some(child);
    }

    fn is_set(&self) -> bool {
        self.lock().is_some()
    }

    pub fn pid(&self) -> Option<u32> {
        self.lock().as_ref().map(Child::id)
    }

    /// Stop the watch process and reap it. Returns once it is gone, at most
    /// [`STOP_GRACE`] after SIGTERM plus the time a SIGKILL takes.
    ///
    /// The lock is held throughout, so a concurrent caller returns only after
    /// the process has been reaped.
    pub fn terminate(&self) {
        let mut guard = self.lock();
        if let Some(child) = guard.take() {
            shutdown_child(child, STOP_GRACE);
        }
    }
}

/// SIGTERM, wait up to `grace`, then SIGKILL and wait
fn shutdown_child(mut child: Child, grace: Duration) {
    let pid = child.id();
    if process::terminate(pid) {
        match child.wait_timeout(grace) {
            Ok(Some(_)) => {
                tracing::debug!("Watch process {pid} exited after SIGTERM");
                return;
            }
            Ok(None) => {
                tracing::debug!("Watch process {pid} ignored SIGTERM, killing it");
            }
            Err(e) => tracing::warn!("Failed to wait for the watch process: {e}"),
        }
    }

    if let Err(e) = child.kill() {
        tracing::debug!("Killing watch process {pid} failed: {e}");
    }
    if let Err(e) = child.wait() {
        tracing::warn!("Failed to reap the watch process: {e}");
    }
}

/// Recursive `inotifywait` on one root, reporting files that were fully
/// written or moved into the tree, one full path per line
#[derive(Debug)]
pub struct InotifySource {
    root: PathBuf,
    program: OsString,
    stdout: Option<BufReader<ChildStdout>>,
    handle: ShutdownHandle,
}

impl InotifySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_program(root, INOTIFYWAIT)
    }

    /// Use another watch executable, given by name or path
    pub fn with_program(root: impl Into<PathBuf>, program: impl AsRef<OsStr>) -> Self {
        Self {
            root: root.into(),
            program: program.as_ref().to_os_string(),
            stdout: None,
            handle: ShutdownHandle::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_set()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.handle.clone()
    }

    /// close_write and moved_to events, quiet, continuous, recursive
    pub fn arguments(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-e",
            "close_write,moved_to",
            "-q",
            "-m",
            "-r",
            "--format",
            "%w%f",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push(self.root.clone().into_os_string());
        args
    }
}

impl ChangeStream for InotifySource {
    fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Err(WatchError::ProcessAlreadyRunning(self.root.clone()));
        }

        let executable = which::which(&self.program).map_err(|e| {
            WatchError::MissingDependency(format!(
                "The program {} could not be found in your path: {e}",
                self.program.to_string_lossy()
            ))
        })?;

        let mut child = Command::new(&executable)
            .args(self.arguments())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| {
                WatchError::command(format!(
                    "Unable to start {} process: {e}",
                    executable.display()
                ))
            })?;

        tracing::debug!(
            "Started {} (pid {}) on {}",
            executable.display(),
            child.id(),
            self.root.display()
        );

        self.stdout = child.stdout.take().map(BufReader::new);
        self.handle.set(child);
        Ok(())
    }

    fn next_changed_path(&mut self) -> Option<PathBuf> {
        let stdout = self.stdout.as_mut()?;
        let mut line = String::new();
        loop {
            line.clear();
            match stdout.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {
                    let path = line.trim_end_matches(['\n', '\r']);
                    if !path.is_empty() {
                        return Some(PathBuf::from(path));
                    }
                }
                Err(e) => {
                    tracing::warn!("Reading from the watch process failed: {e}");
                    return None;
                }
            }
        }
    }

    /// Closing stdout alone does not make inotifywait exit, so the process is
    /// terminated explicitly, killed if it outlives [`STOP_GRACE`], and reaped.
    fn stop(&mut self) {
        self.stdout = None;
        if self.is_running() {
            self.handle.terminate();
            tracing::debug!("Stopped watching {}", self.root.display());
        }
    }
}

impl Drop for InotifySource {
    fn drop(&mut self) {
        self.stop();
    }
}
