//! Closure Compiler application run as a local process

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::parser::parse_application_output;
use super::result::CompilationResult;
use crate::config::LocalConfig;
use crate::error::{Result, WatchError};

/// Options passed on every invocation: only severe log output, no summary
const FIXED_OPTIONS: [&str; 4] = ["--logging_level", "SEVERE", "--summary_detail_level", "0"];

#[derive(Debug, Clone)]
pub struct LocalBackend {
    program: PathBuf,
    base_args: Vec<OsString>,
}

impl LocalBackend {
    /// Locate `java` and the compiler jar described by `config`.
    ///
    /// Fails with `MissingDependency` when either is missing, which lets the
    /// resolver fall through to the next backend.
    pub fn new(config: &LocalConfig) -> Result<Self> {
        let java = which::which(&config.java).map_err(|e| {
            WatchError::MissingDependency(format!(
                "The program {} could not be found in your path: {e}",
                config.java
            ))
        })?;

        if !config.jar.is_file() {
            return Err(WatchError::MissingDependency(format!(
                "The compiler jar {} does not exist",
                config.jar.display()
            )));
        }

        Ok(Self {
            program: java,
            base_args: vec![OsString::from("-jar"), config.jar.clone().into_os_string()],
        })
    }

    /// Use an explicit program and leading arguments, skipping dependency checks
    pub fn with_command<I, S>(program: impl Into<PathBuf>, base_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Self {
            program: program.into(),
            base_args: base_args
                .into_iter()
                .map(|arg| arg.as_ref().to_os_string())
                .collect(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Full argument list for compiling `source` into `target`
    pub fn arguments(&self, source: &Path, target: &Path) -> Vec<OsString> {
        let mut args = self.base_args.clone();
        args.extend(FIXED_OPTIONS.iter().map(OsString::from));
        args.push(OsString::from("--js"));
        args.push(source.as_os_str().to_os_string());
        args.push(OsString::from("--js_output_file"));
        args.push(target.as_os_str().to_os_string());
        args
    }

    /// Run the compiler to completion and parse what it printed.
    ///
    /// The compiler writes `target` itself; on exit status 0 the file is read
    /// back as the compiled code.
    pub(super) fn compile(&self, source: &Path, target: &Path) -> Result<CompilationResult> {
        let args = self.arguments(source, target);
        tracing::debug!(
            "Running {} {}",
            self.program.display(),
            args.iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let (output, success) = self.run_combined(&args)?;

        let mut result = parse_application_output(source, target, &output)?;
        if success {
            let code = fs::read_to_string(target).map_err(|e| {
                WatchError::command(format!(
                    "Compiler succeeded but {} could not be read: {e}",
                    target.display()
                ))
            })?;
            result.succeed(code);
        }

        Ok(result)
    }

    /// Run the program with stdout and stderr sharing one pipe, returning the
    /// interleaved output and whether the process exited with status 0.
    fn run_combined(&self, args: &[OsString]) -> Result<(String, bool)> {
        let spawn_error = |e: std::io::Error| {
            WatchError::command(format!(
                "Unable to start compiler {}: {e}",
                self.program.display()
            ))
        };

        let (mut reader, writer) = std::io::pipe().map_err(spawn_error)?;

        // The command owns the parent's copies of the write end; it must be
        // dropped before reading or the pipe never reaches EOF.
        let mut child = {
            let mut command = Command::new(&self.program);
            command
                .args(args)
                .stdin(Stdio::null())
                .stdout(writer.try_clone().map_err(spawn_error)?)
                .stderr(writer);
            command.spawn().map_err(spawn_error)?
        };

        let mut bytes = Vec::new();
        let read = reader.read_to_end(&mut bytes);
        let status = child.wait().map_err(|e| {
            WatchError::command(format!(
                "Failed to wait for compiler {}: {e}",
                self.program.display()
            ))
        })?;
        read.map_err(|e| WatchError::command(format!("Failed to read compiler output: {e}")))?;

        Ok((String::from_utf8_lossy(&bytes).into_owned(), status.success()))
    }
}
