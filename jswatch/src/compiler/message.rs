//! Compiler diagnostics and their tab-aware display form
//!
//! Compilers report a character offset against the raw source line, where a
//! tab counts as one character. For display both the line and the offset are
//! re-expressed with tabs expanded to the next multiple of [`TAB_WIDTH`], so
//! the caret marker lands under the offending column.

use std::fmt;

/// Display columns per tab stop
pub const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Error,
    Warning,
}

impl MessageKind {
    pub fn label(&self) -> &'static str {
        match self {
            MessageKind::Error => "Error",
            MessageKind::Warning => "Warning",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One diagnostic record reported by a compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    kind: MessageKind,
    text: String,
    line_number: u32,
    raw_offset: usize,
    source_line: String,
}

impl Message {
    pub fn new(
        kind: MessageKind,
        text: impl Into<String>,
        line_number: u32,
        raw_offset: usize,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            line_number,
            raw_offset,
            source_line: source_line.into(),
        }
    }

    pub fn error(
        text: impl Into<String>,
        line_number: u32,
        raw_offset: usize,
        source_line: impl Into<String>,
    ) -> Self {
        Self::new(MessageKind::Error, text, line_number, raw_offset, source_line)
    }

    pub fn warning(
        text: impl Into<String>,
        line_number: u32,
        raw_offset: usize,
        source_line: impl Into<String>,
    ) -> Self {
        Self::new(MessageKind::Warning, text, line_number, raw_offset, source_line)
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_number(&self) -> u32 {
        self.line_number
    }

    /// Offset as reported by the compiler, tabs counting as one character
    pub fn raw_offset(&self) -> usize {
        self.raw_offset
    }

    /// The offending source line exactly as reported
    pub fn raw_source_line(&self) -> &str {
        &self.source_line
    }

    /// The offending source line with tabs expanded
    pub fn source_line(&self) -> String {
        expand_tabs(&self.source_line)
    }

    /// Display column of the offset once tabs before it are expanded
    pub fn offset(&self) -> usize {
        let prefix: String = self.source_line.chars().take(self.raw_offset).collect();
        // An offset past the end of the line still counts the missing columns
        let overflow = self.raw_offset.saturating_sub(prefix.chars().count());
        expand_tabs(&prefix).chars().count() + overflow
    }

    /// Spaces up to the expanded offset followed by a single caret
    pub fn caret_marker(&self) -> String {
        format!("{}^", " ".repeat(self.offset()))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} in line {}, character {}: {}\n{}\n{}",
            self.kind,
            self.line_number,
            self.offset(),
            self.text,
            self.source_line(),
            self.caret_marker()
        )
    }
}

/// Expand every tab to the next multiple of [`TAB_WIDTH`] display columns
pub fn expand_tabs(line: &str) -> String {
    let mut expanded = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let width = TAB_WIDTH - column % TAB_WIDTH;
            expanded.extend(std::iter::repeat_n(' ', width));
            column += width;
        } else {
            expanded.push(c);
            column += 1;
        }
    }
    expanded
}
