//! Parsers turning raw compiler output into a [`CompilationResult`]
//!
//! The local compiler application prints diagnostics as four-line text
//! records; the remote compiler service answers with a JSON document.

use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::LazyLock;

use super::message::{Message, MessageKind};
use super::result::CompilationResult;
use crate::error::{Result, WatchError};

/// Header line of one diagnostic record: `path:line: TYPE - message`
const RECORD_HEADER_PATTERN: &str =
    r"^(?<file>[\w./~-]+):(?<line>\d+): (?<type>[A-Z]+) - (?<message>.*)$";

static RECORD_HEADER: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(RECORD_HEADER_PATTERN));

/// Lines per diagnostic record: header, source line, caret line, separator
const RECORD_LINES: usize = 4;

/// Parse the combined stdout/stderr of the compiler application.
///
/// Only diagnostics are extracted here. Whether the compilation succeeded is
/// decided by the caller from the exit status.
pub fn parse_application_output(
    source: &Path,
    target: &Path,
    output: &str,
) -> Result<CompilationResult> {
    let header = RECORD_HEADER
        .as_ref()
        .map_err(|e| WatchError::command(format!("Invalid diagnostic pattern: {e}")))?;
    let lines: Vec<&str> = output.lines().collect();
    let mut result = CompilationResult::new(source, target);

    let mut i = 0;
    while i + 2 < lines.len() {
        let captures = header.captures(lines[i]).ok_or_else(|| {
            WatchError::command(format!(
                "Could not parse compiler response: unexpected line \"{}\"",
                lines[i]
            ))
        })?;

        let kind = match &captures["type"] {
            "WARNING" => MessageKind::Warning,
            "ERROR" => MessageKind::Error,
            other => {
                return Err(WatchError::command(format!(
                    "Could not parse compiler response: unknown type {other}"
                )))
            }
        };
        let line_number = captures["line"].parse::<u32>().map_err(|e| {
            WatchError::command(format!("Could not parse compiler response: {e}"))
        })?;

        result.add_message(Message::new(
            kind,
            &captures["message"],
            line_number,
            caret_offset(lines[i + 2]),
            lines[i + 1],
        ));
        i += RECORD_LINES;
    }

    Ok(result)
}

/// Raw offset encoded by a caret line: the caret's position, or the line
/// length when no caret is present
fn caret_offset(caret_line: &str) -> usize {
    caret_line
        .chars()
        .position(|c| c == '^')
        .unwrap_or_else(|| caret_line.chars().count())
}

/// JSON answer of the compiler service
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    #[serde(default)]
    pub compiled_code: Option<String>,
    #[serde(default)]
    pub errors: Vec<ServiceError>,
    #[serde(default)]
    pub warnings: Vec<ServiceWarning>,
    #[serde(default)]
    pub server_errors: Option<Vec<ServerError>>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceError {
    pub error: String,
    #[serde(default)]
    pub lineno: u32,
    #[serde(default)]
    pub charno: i64,
    #[serde(default)]
    pub line: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceWarning {
    pub warning: String,
    #[serde(default)]
    pub lineno: u32,
    #[serde(default)]
    pub charno: i64,
    #[serde(default)]
    pub line: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServerError {
    pub code: i64,
    pub error: String,
}

/// Decode a raw service body into a [`ServiceResponse`]
pub fn decode_service_response(body: &str) -> Result<ServiceResponse> {
    serde_json::from_str(body)
        .map_err(|e| WatchError::command(format!("Decoding the compiler result failed: {e}")))
}

/// Turn a decoded service response into a [`CompilationResult`].
///
/// Server-level errors are fatal for this compile and reported through the
/// first error's code and text.
pub fn parse_service_response(
    source: &Path,
    target: &Path,
    response: ServiceResponse,
) -> Result<CompilationResult> {
    if let Some(server_errors) = &response.server_errors {
        let detail = server_errors
            .first()
            .map(|e| format!("{}: {}", e.code, e.error))
            .unwrap_or_else(|| "no details".to_string());
        return Err(WatchError::command(format!(
            "Error calling closure compiler service. Server said: {detail}"
        )));
    }

    let mut result = CompilationResult::new(source, target);

    if let Some(code) = response.compiled_code.filter(|code| !code.is_empty()) {
        result.succeed(code);
    }

    for error in response.errors {
        result.add_error(Message::error(
            error.error,
            error.lineno,
            clamp_offset(error.charno),
            error.line.unwrap_or_default(),
        ))?;
    }

    for warning in response.warnings {
        result.add_warning(Message::warning(
            warning.warning,
            warning.lineno,
            clamp_offset(warning.charno),
            warning.line.unwrap_or_default(),
        ))?;
    }

    Ok(result)
}

/// The service reports -1 when no column is known
fn clamp_offset(charno: i64) -> usize {
    usize::try_from(charno).unwrap_or(0)
}
