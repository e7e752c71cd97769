//! Handles all user-facing output for the CLI.
//!
//! This module is responsible for status lines, program output sinks and tree
//! dumps. By centralizing output logic here, we ensure a consistent user
//! experience across all commands.

use std::io::Write;

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::cli::args::DumpFormat;
use crate::runtime::OutputSink;
use crate::syntax::{Span, SyntaxTree};

// ============================================================================
// OUTPUT SINKS: OutputBuffer and StdoutSink implementations
// ============================================================================

/// OutputBuffer: collects output into a String for testing or programmatic capture.
pub struct OutputBuffer {
    pub buffer: String,
    emitted: bool,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            emitted: false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// One entry per emitted line, empty lines included.
    pub fn lines(&self) -> Vec<&str> {
        if !self.emitted {
            return Vec::new();
        }
        self.buffer.split('\n').collect()
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for OutputBuffer {
    fn emit(&mut self, text: &str, _span: Option<&Span>) {
        // An empty first line still counts as a line.
        if self.emitted {
            self.buffer.push('\n');
        }
        self.buffer.push_str(text);
        self.emitted = true;
    }
}

/// StdoutSink: writes output to stdout for CLI use.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&mut self, text: &str, _span: Option<&Span>) {
        println!("{}", text);
    }
}

// ============================================================================
// STATUS LINES
// ============================================================================

const SEPARATOR: &str =
    "-----------------------------------------------------------------------------";

/// Writes `STATUS:` progress lines to stdout.
pub struct Status {
    stdout: StandardStream,
}

impl Status {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
        }
    }

    pub fn ok(&mut self, message: &str) {
        self.line(Color::Green, message);
    }

    pub fn failed(&mut self, message: &str) {
        self.line(Color::Red, message);
    }

    pub fn separator(&mut self) {
        let _ = writeln!(self.stdout, "{SEPARATOR}");
    }

    fn line(&mut self, color: Color, message: &str) {
        let _ = self
            .stdout
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        let _ = write!(self.stdout, "STATUS:");
        let _ = self.stdout.reset();
        let _ = writeln!(self.stdout, "{message}");
    }
}

// ============================================================================
// TREE DUMPS
// ============================================================================

/// Prints a normalized tree. `parsed` is the tree before normalization and is
/// only used by [`DumpFormat::Diff`].
pub fn print_tree(
    tree: &SyntaxTree,
    format: DumpFormat,
    parsed: Option<&SyntaxTree>,
    choice: ColorChoice,
) {
    match format {
        DumpFormat::Pretty => print!("{}", tree.pretty()),
        DumpFormat::Json => match serde_json::to_string_pretty(tree) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error: could not serialize tree: {e}"),
        },
        DumpFormat::Diff => {
            let before = parsed.map(SyntaxTree::pretty).unwrap_or_default();
            let changeset = Changeset::new(&before, &tree.pretty(), "\n");
            let mut stdout = StandardStream::stdout(choice);
            print_diff(&mut stdout, &changeset.diffs);
            let _ = stdout.reset();
        }
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn print_diff(stdout: &mut StandardStream, diffs: &[Difference]) {
    for diff in diffs {
        match diff {
            Difference::Same(x) => {
                let _ = stdout.reset();
                let _ = writeln!(stdout, " {}", x.replace('\n', "\n "));
            }
            Difference::Add(x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
                let _ = writeln!(stdout, "+{}", x.replace('\n', "\n+"));
            }
            Difference::Rem(x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
                let _ = writeln!(stdout, "-{}", x.replace('\n', "\n-"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_joins_lines() {
        let mut out = OutputBuffer::new();
        out.emit("a", None);
        out.emit("b", None);
        assert_eq!(out.as_str(), "a\nb");
        assert_eq!(out.lines(), vec!["a", "b"]);
    }

    #[test]
    fn buffer_keeps_leading_empty_line() {
        let mut out = OutputBuffer::new();
        out.emit("", None);
        out.emit("1", None);
        assert_eq!(out.as_str(), "\n1");
        assert_eq!(out.lines(), vec!["", "1"]);

        out.emit("", None);
        assert_eq!(out.lines(), vec!["", "1", ""]);
    }

    #[test]
    fn empty_buffer_has_no_lines() {
        assert!(OutputBuffer::new().lines().is_empty());
    }
}
