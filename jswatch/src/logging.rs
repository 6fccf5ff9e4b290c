//! Console output and internal tracing
//!
//! User-facing messages go through [`Console`]: one severity per message,
//! every line prefixed with a `[HH:MM:SS]` stamp and colored by severity.
//! Internal diagnostics (which backend was chosen, commands being run) are
//! `tracing` events written to stderr and filtered by `JSWATCH_LOG`.

use anyhow::{anyhow, Result};
use chrono::Local;
use colored::{ColoredString, Colorize};
use std::io::{self, Write};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive
pub const LOG_ENV: &str = "JSWATCH_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Success,
    Warning,
    Error,
    Critical,
}

impl Severity {
    fn paint(self, line: &str) -> ColoredString {
        match self {
            Severity::Debug | Severity::Info => line.normal(),
            Severity::Success => line.green(),
            Severity::Warning => line.yellow(),
            Severity::Error => line.red(),
            Severity::Critical => line.red().bold(),
        }
    }
}

/// Timestamped, colored console sink
#[derive(Debug, Default)]
pub struct Console {
    verbose: bool,
    last_stamp: Mutex<String>,
}

impl Console {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            last_stamp: Mutex::new(String::new()),
        }
    }

    /// Print a possibly multi-line message. Critical messages go to stderr.
    pub fn log(&self, severity: Severity, message: &str) {
        if severity == Severity::Debug && !self.verbose {
            return;
        }

        let stamp = format!("[{}]", Local::now().format("%H:%M:%S"));
        let lines = self.render(severity, message, &stamp);

        // Console output is best effort; a closed stdout must not stop the watch loop
        if severity == Severity::Critical {
            let mut err = io::stderr().lock();
            for line in lines {
                let _ = writeln!(err, "{line}");
            }
        } else {
            let mut out = io::stdout().lock();
            for line in lines {
                let _ = writeln!(out, "{line}");
            }
        }
    }

    /// Prefix every line with `stamp`, or with blanks when the line before
    /// it carried the same stamp
    fn render(&self, severity: Severity, message: &str, stamp: &str) -> Vec<String> {
        let mut last = match self.last_stamp.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let blank = " ".repeat(stamp.len());

        message
            .lines()
            .map(|line| {
                let prefix = if *last == stamp {
                    blank.as_str()
                } else {
                    *last = stamp.to_string();
                    stamp
                };
                format!("{prefix} {}", severity.paint(line))
            })
            .collect()
    }

    pub fn debug(&self, message: &str) {
        self.log(Severity::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Severity::Info, message);
    }

    pub fn success(&self, message: &str) {
        self.log(Severity::Success, message);
    }

    pub fn warning(&self, message: &str) {
        self.log(Severity::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Severity::Error, message);
    }

    pub fn critical(&self, message: &str) {
        self.log(Severity::Critical, message);
    }
}

/// Install the tracing subscriber and decide on colors.
///
/// Tracing defaults to `warn`, or `debug` when `verbose`; `JSWATCH_LOG`
/// overrides either.
pub fn init(verbose: bool, color: bool) -> Result<()> {
    colored::control::set_override(color);

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(color)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}
