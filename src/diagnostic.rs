//! Diagnostics for rejected records and the sinks they are logged to.
//!
//! A [`Diagnostic`] is a write-only report: it is rendered to a sink file for
//! later inspection and optionally echoed to the console. Nothing downstream
//! ever reads diagnostics back.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;

/// Which stage produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    /// Structural checks before any field is interpreted.
    Syntax,
    /// Value checks on structurally sound records.
    Semantic,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Syntax => f.write_str("syntax"),
            Stage::Semantic => f.write_str("semantic"),
        }
    }
}

/// The reason a record was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// More than six fields.
    TooManyFields,
    /// Fewer than six fields.
    TooFewFields,
    /// One of the six fields is empty.
    MissingField,
    /// Genre column is not one of the eight codes.
    UnknownGenre,
    /// Negative or unparseable price.
    BadPrice,
    /// ISBN-10 checksum failed.
    BadIsbn10,
    /// ISBN-13 checksum failed.
    BadIsbn13,
    /// Year outside 1995..=2024 or unparseable.
    BadYear,
    /// An intermediate line that no longer splits into six fields.
    MalformedRecord,
}

impl DiagnosticKind {
    /// The stage this kind belongs to.
    #[must_use]
    pub const fn stage(self) -> Stage {
        match self {
            DiagnosticKind::TooManyFields
            | DiagnosticKind::TooFewFields
            | DiagnosticKind::MissingField
            | DiagnosticKind::UnknownGenre => Stage::Syntax,
            DiagnosticKind::BadPrice
            | DiagnosticKind::BadIsbn10
            | DiagnosticKind::BadIsbn13
            | DiagnosticKind::BadYear
            | DiagnosticKind::MalformedRecord => Stage::Semantic,
        }
    }

    /// Short kebab-case tag, used in logs and reports.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            DiagnosticKind::TooManyFields => "too-many-fields",
            DiagnosticKind::TooFewFields => "too-few-fields",
            DiagnosticKind::MissingField => "missing-field",
            DiagnosticKind::UnknownGenre => "unknown-genre",
            DiagnosticKind::BadPrice => "bad-price",
            DiagnosticKind::BadIsbn10 => "bad-isbn10",
            DiagnosticKind::BadIsbn13 => "bad-isbn13",
            DiagnosticKind::BadYear => "bad-year",
            DiagnosticKind::MalformedRecord => "malformed-record",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A single rejected record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// What was wrong.
    pub kind: DiagnosticKind,
    /// Input file (syntax stage) or dataset name (semantic stage).
    pub source: String,
    /// The offending line, verbatim.
    pub line: String,
    /// Human-readable reason, e.g. `missing isbn`.
    pub reason: String,
}

impl Diagnostic {
    /// Create a diagnostic.
    pub fn new(
        kind: DiagnosticKind,
        source: impl Into<String>,
        line: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Diagnostic {
            kind,
            source: source.into(),
            line: line.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    /// Multi-line block, identical in the sink file and on the console.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} error in file: {}", self.kind.stage(), self.source)?;
        writeln!(f, "====================")?;
        writeln!(f, "Error: {}", self.reason)?;
        writeln!(f, "Record: {}", self.line)
    }
}

/// Destination for rendered diagnostics.
///
/// A sink that could not be created is kept in a disabled state: reports to
/// it are dropped (and still echoed, if echo is on) instead of aborting the
/// run.
pub struct DiagnosticSink {
    path: Option<PathBuf>,
    writer: Option<Box<dyn Write>>,
    echo: bool,
    reported: usize,
}

impl fmt::Debug for DiagnosticSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticSink")
            .field("path", &self.path)
            .field("enabled", &self.writer.is_some())
            .field("echo", &self.echo)
            .field("reported", &self.reported)
            .finish()
    }
}

impl DiagnosticSink {
    /// Wrap an arbitrary writer.
    pub fn new<W: Write + 'static>(writer: W, echo: bool) -> Self {
        DiagnosticSink {
            path: None,
            writer: Some(Box::new(writer)),
            echo,
            reported: 0,
        }
    }

    /// Create (truncate) a sink file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create(path: impl AsRef<Path>, echo: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        Ok(DiagnosticSink {
            path: Some(path.to_path_buf()),
            writer: Some(Box::new(BufWriter::new(file))),
            echo,
            reported: 0,
        })
    }

    /// A sink that only echoes, used when the file could not be created.
    #[must_use]
    pub fn disabled(echo: bool) -> Self {
        DiagnosticSink {
            path: None,
            writer: None,
            echo,
            reported: 0,
        }
    }

    /// Whether reports reach a file.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    /// Number of diagnostics reported so far.
    #[must_use]
    pub fn reported(&self) -> usize {
        self.reported
    }

    /// Log one diagnostic.
    ///
    /// A write failure disables the sink for the rest of the run; the
    /// diagnostic itself is still counted and echoed.
    pub fn report(&mut self, diagnostic: &Diagnostic) {
        self.reported += 1;
        tracing::debug!(kind = %diagnostic.kind, source = %diagnostic.source, "record rejected");
        if self.echo {
            println!("{diagnostic}");
        }
        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writeln!(writer, "{diagnostic}") {
                tracing::warn!(path = ?self.path, error = %e, "diagnostic sink write failed, disabling sink");
                self.writer = None;
            }
        }
    }

    /// Flush buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails to flush.
    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}
