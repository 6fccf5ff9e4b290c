//! Outcome of compiling one source file

use std::path::{Path, PathBuf};

use super::message::{Message, MessageKind};
use crate::error::{Result, WatchError};

/// Result of one compile invocation, consumed once by a reporter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationResult {
    source: PathBuf,
    target: PathBuf,
    compiled_code: Option<String>,
    errors: Vec<Message>,
    warnings: Vec<Message>,
}

impl CompilationResult {
    /// A result that has not (yet) succeeded and carries no diagnostics
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            compiled_code: None,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Successful iff compiled code is attached
    pub fn is_successful(&self) -> bool {
        self.compiled_code.is_some()
    }

    /// Mark the compilation successful with the produced code
    pub fn succeed(&mut self, compiled_code: impl Into<String>) {
        self.compiled_code = Some(compiled_code.into());
    }

    pub fn compiled_code(&self) -> Option<&str> {
        self.compiled_code.as_deref()
    }

    pub fn errors(&self) -> &[Message] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Message] {
        &self.warnings
    }

    pub fn add_error(&mut self, message: Message) -> Result<()> {
        if message.kind() != MessageKind::Error {
            return Err(WatchError::InvalidArgument(format!(
                "expected an error, got a {}",
                message.kind()
            )));
        }
        self.errors.push(message);
        Ok(())
    }

    pub fn add_warning(&mut self, message: Message) -> Result<()> {
        if message.kind() != MessageKind::Warning {
            return Err(WatchError::InvalidArgument(format!(
                "expected a warning, got a {}",
                message.kind()
            )));
        }
        self.warnings.push(message);
        Ok(())
    }

    /// File a message under errors or warnings according to its kind
    pub fn add_message(&mut self, message: Message) {
        match message.kind() {
            MessageKind::Error => self.errors.push(message),
            MessageKind::Warning => self.warnings.push(message),
        }
    }
}
