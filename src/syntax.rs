//! Syntax filtering: structural checks and routing to genre buckets.
//!
//! A line passes when it tokenizes into exactly six non-empty fields and its
//! genre column holds one of the eight known codes. Checks run in a fixed
//! order and stop at the first failure:
//!
//! 1. more than six fields: `too-many-fields`
//! 2. fewer than six fields: `too-few-fields`
//! 3. first empty field, scanning left to right: `missing-field`
//! 4. unknown genre code: `unknown-genre`
//!
//! Accepted lines are copied verbatim to their genre's text sink.

use std::fmt;
use std::io::{BufRead, Write};

use indexmap::IndexMap;
use serde::Serialize;

use crate::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::error::Result;
use crate::genre::Genre;
use crate::tokenizer::{read_lines, tokenize};

/// Number of fields in a well-formed record.
pub const FIELD_COUNT: usize = 6;

/// The six record columns, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Column {
    /// Book title, possibly quoted.
    Title,
    /// Authors.
    Authors,
    /// Decimal price.
    Price,
    /// ISBN-10 or ISBN-13.
    Isbn,
    /// Three-letter genre code.
    Genre,
    /// Publication year.
    Year,
}

impl Column {
    /// All columns in field order.
    pub const ALL: [Column; FIELD_COUNT] = [
        Column::Title,
        Column::Authors,
        Column::Price,
        Column::Isbn,
        Column::Genre,
        Column::Year,
    ];

    /// Zero-based field index.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name used in `missing <name>` reasons.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Column::Title => "name",
            Column::Authors => "authors",
            Column::Price => "price",
            Column::Isbn => "isbn",
            Column::Genre => "genre",
            Column::Year => "year",
        }
    }
}

/// Why a line failed the syntax checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxFault {
    /// The line has this many fields, more than six.
    TooManyFields(usize),
    /// The line has this many fields, fewer than six.
    TooFewFields(usize),
    /// The first empty column.
    MissingField(Column),
    /// The genre column's value.
    UnknownGenre(String),
}

impl SyntaxFault {
    /// Diagnostic kind for this fault.
    #[must_use]
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            SyntaxFault::TooManyFields(_) => DiagnosticKind::TooManyFields,
            SyntaxFault::TooFewFields(_) => DiagnosticKind::TooFewFields,
            SyntaxFault::MissingField(_) => DiagnosticKind::MissingField,
            SyntaxFault::UnknownGenre(_) => DiagnosticKind::UnknownGenre,
        }
    }

    /// Turn the fault into a diagnostic for `line` read from `source`.
    #[must_use]
    pub fn into_diagnostic(self, source: &str, line: &str) -> Diagnostic {
        Diagnostic::new(self.kind(), source, line, self.to_string())
    }
}

impl fmt::Display for SyntaxFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxFault::TooManyFields(_) => f.write_str("Too many fields"),
            SyntaxFault::TooFewFields(_) => f.write_str("Too few fields"),
            SyntaxFault::MissingField(column) => write!(f, "missing {}", column.name()),
            SyntaxFault::UnknownGenre(_) => f.write_str("invalid genre"),
        }
    }
}

/// Check one line and return the genre it belongs to.
///
/// # Errors
///
/// Returns the first [`SyntaxFault`] found.
///
/// # Examples
///
/// ```
/// use shelver::syntax::{check_line, Column, SyntaxFault};
/// use shelver::Genre;
///
/// assert_eq!(check_line("T,A,1.00,0201038013,MTV,2000"), Ok(Genre::MoviesTv));
/// assert_eq!(
///     check_line("T,A,,0201038013,MTV,2000"),
///     Err(SyntaxFault::MissingField(Column::Price))
/// );
/// ```
pub fn check_line(line: &str) -> std::result::Result<Genre, SyntaxFault> {
    let fields = tokenize(line);

    if fields.len() > FIELD_COUNT {
        return Err(SyntaxFault::TooManyFields(fields.len()));
    }
    if fields.len() < FIELD_COUNT {
        return Err(SyntaxFault::TooFewFields(fields.len()));
    }

    if let Some(column) = Column::ALL
        .into_iter()
        .find(|column| fields[column.index()].is_empty())
    {
        return Err(SyntaxFault::MissingField(column));
    }

    let code = fields[Column::Genre.index()];
    Genre::from_code(code).ok_or_else(|| SyntaxFault::UnknownGenre(code.to_string()))
}

/// Counts collected while splitting input files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SplitReport {
    /// Input files read to the end.
    pub files_processed: Vec<String>,
    /// Input files that could not be opened or read.
    pub files_skipped: Vec<String>,
    /// Lines routed to each genre.
    pub accepted: IndexMap<Genre, usize>,
    /// Lines rejected, by kind.
    pub rejected: IndexMap<DiagnosticKind, usize>,
    /// Lines whose genre sink was unavailable.
    pub lost: usize,
    /// Genres whose sink could not be created, written or flushed. Their
    /// text files are incomplete or stale.
    pub genres_unavailable: Vec<Genre>,
}

impl SplitReport {
    /// Total lines routed to any genre.
    #[must_use]
    pub fn total_accepted(&self) -> usize {
        self.accepted.values().sum()
    }

    /// Total lines rejected.
    #[must_use]
    pub fn total_rejected(&self) -> usize {
        self.rejected.values().sum()
    }
}

/// Routes well-formed lines to per-genre text sinks.
///
/// A genre without a sink still accepts lines, but they are counted as lost
/// rather than written anywhere. A sink that fails to write or flush is
/// dropped and its genre treated the same way for the rest of the run.
#[derive(Debug)]
pub struct SyntaxFilter<W: Write> {
    sinks: IndexMap<Genre, W>,
    errors: DiagnosticSink,
    report: SplitReport,
}

impl<W: Write> SyntaxFilter<W> {
    /// Create a filter over the available genre sinks.
    ///
    /// Genres missing from `sinks` are reported as unavailable.
    pub fn new(sinks: IndexMap<Genre, W>, errors: DiagnosticSink) -> Self {
        let report = SplitReport {
            genres_unavailable: Genre::ALL
                .into_iter()
                .filter(|genre| !sinks.contains_key(genre))
                .collect(),
            ..SplitReport::default()
        };
        SyntaxFilter {
            sinks,
            errors,
            report,
        }
    }

    /// Check one line and route or report it.
    ///
    /// Returns the genre the line was routed to, or `None` if it was
    /// rejected.
    pub fn filter_line(&mut self, source: &str, line: &str) -> Option<Genre> {
        match check_line(line) {
            Ok(genre) => {
                *self.report.accepted.entry(genre).or_insert(0) += 1;
                match self.sinks.get_mut(&genre).map(|sink| writeln!(sink, "{line}")) {
                    Some(Ok(())) => {},
                    Some(Err(e)) => {
                        self.drop_sink(genre, &e);
                        self.report.lost += 1;
                    },
                    None => self.report.lost += 1,
                }
                Some(genre)
            },
            Err(fault) => {
                *self.report.rejected.entry(fault.kind()).or_insert(0) += 1;
                self.errors.report(&fault.into_diagnostic(source, line));
                None
            },
        }
    }

    /// Filter every line of one input file.
    ///
    /// A read failure part-way through is reported and the file is marked
    /// skipped; lines already routed stay routed.
    pub fn filter_reader<R: BufRead>(&mut self, source: &str, reader: R) {
        for line in read_lines(reader) {
            match line {
                Ok(line) => {
                    self.filter_line(source, &line);
                },
                Err(e) => {
                    tracing::warn!(source, error = %e, "read failed, skipping rest of file");
                    println!("Could not read file {source}, moving on to the next input file.");
                    self.report.files_skipped.push(source.to_string());
                    return;
                },
            }
        }
        self.report.files_processed.push(source.to_string());
    }

    /// Note an input file that could not be opened.
    pub fn skip_source(&mut self, source: &str) {
        self.report.files_skipped.push(source.to_string());
    }

    /// Counts so far.
    #[must_use]
    pub fn report(&self) -> &SplitReport {
        &self.report
    }

    /// Flush all sinks and return the ones still usable with the final
    /// report. A genre sink that fails to flush is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the diagnostic sink fails to flush.
    pub fn finish(mut self) -> Result<(IndexMap<Genre, W>, SplitReport)> {
        let failed: Vec<_> = self
            .sinks
            .iter_mut()
            .filter_map(|(genre, sink)| sink.flush().err().map(|e| (*genre, e)))
            .collect();
        for (genre, e) in failed {
            self.drop_sink(genre, &e);
        }
        self.errors.flush()?;
        Ok((self.sinks, self.report))
    }

    fn drop_sink(&mut self, genre: Genre, error: &std::io::Error) {
        println!(
            "{}: Could not write to the file. Further records for {genre} will be lost.",
            genre.text_file_name()
        );
        tracing::warn!(genre = %genre, error = %error, "genre sink failed, dropping it");
        self.sinks.shift_remove(&genre);
        if !self.report.genres_unavailable.contains(&genre) {
            self.report.genres_unavailable.push(genre);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_filter() -> SyntaxFilter<Vec<u8>> {
        let sinks = Genre::ALL.into_iter().map(|g| (g, Vec::new())).collect();
        SyntaxFilter::new(sinks, DiagnosticSink::disabled(false))
    }

    #[test]
    fn test_well_formed_line() {
        assert_eq!(
            check_line(r#""Dune",Herbert,12.99,0201038013,SSM,1999"#),
            Ok(Genre::SportsMemorabilia)
        );
    }

    #[test]
    fn test_too_many_fields() {
        assert_eq!(
            check_line("a,b,1,2,CCB,2000,extra"),
            Err(SyntaxFault::TooManyFields(7))
        );
    }

    #[test]
    fn test_too_few_fields() {
        assert_eq!(check_line("a,b,1,2,CCB"), Err(SyntaxFault::TooFewFields(5)));
        assert_eq!(check_line(""), Err(SyntaxFault::TooFewFields(1)));
    }

    #[test]
    fn test_quoted_commas_do_not_count() {
        assert_eq!(
            check_line(r#""a, b, c",x,1,2,CCB,2000"#),
            Ok(Genre::CartoonsComics)
        );
    }

    #[test]
    fn test_missing_field_reports_first_empty_only() {
        assert_eq!(
            check_line(",b,,2,CCB,2000"),
            Err(SyntaxFault::MissingField(Column::Title))
        );
        assert_eq!(
            check_line("a,b,1,,,2000"),
            Err(SyntaxFault::MissingField(Column::Isbn))
        );
    }

    #[test]
    fn test_trailing_delimiter_is_missing_year() {
        assert_eq!(
            check_line("a,b,1,2,CCB,"),
            Err(SyntaxFault::MissingField(Column::Year))
        );
    }

    #[test]
    fn test_unknown_genre() {
        assert_eq!(
            check_line("a,b,1,2,XYZ,2000"),
            Err(SyntaxFault::UnknownGenre("XYZ".to_string()))
        );
    }

    #[test]
    fn test_field_count_checked_before_emptiness() {
        assert_eq!(check_line(",,,,,,,"), Err(SyntaxFault::TooManyFields(8)));
    }

    #[test]
    fn test_fault_reasons() {
        assert_eq!(SyntaxFault::TooManyFields(7).to_string(), "Too many fields");
        assert_eq!(SyntaxFault::TooFewFields(2).to_string(), "Too few fields");
        assert_eq!(
            SyntaxFault::MissingField(Column::Title).to_string(),
            "missing name"
        );
        assert_eq!(
            SyntaxFault::UnknownGenre("Q".into()).to_string(),
            "invalid genre"
        );
    }

    #[test]
    fn test_filter_routes_verbatim() {
        let mut filter = memory_filter();
        let line = r#""Cats, Dogs",Smith,1.00,0201038013,HCB,2000"#;
        let input = format!("{line}\nbad line\n");
        filter.filter_reader("books.csv", input.as_bytes());

        let (sinks, report) = filter.finish().unwrap();
        assert_eq!(
            String::from_utf8(sinks[&Genre::HobbiesCollectibles].clone()).unwrap(),
            format!("{line}\n")
        );
        assert_eq!(report.total_accepted(), 1);
        assert_eq!(report.rejected[&DiagnosticKind::TooFewFields], 1);
        assert_eq!(report.files_processed, ["books.csv"]);
        assert!(sinks[&Genre::CartoonsComics].is_empty());
    }

    #[test]
    fn test_missing_sink_loses_lines() {
        let mut sinks: IndexMap<Genre, Vec<u8>> = IndexMap::new();
        sinks.insert(Genre::MoviesTv, Vec::new());
        let mut filter = SyntaxFilter::new(sinks, DiagnosticSink::disabled(false));

        let routed = filter.filter_line("f", "a,b,1,2,OTR,2000");
        assert_eq!(routed, Some(Genre::OldTimeRadio));
        assert_eq!(filter.report().lost, 1);
        assert_eq!(filter.report().genres_unavailable.len(), 7);
        assert!(!filter
            .report()
            .genres_unavailable
            .contains(&Genre::MoviesTv));
    }

    #[test]
    fn test_each_rejection_reports_once() {
        let mut filter = memory_filter();
        let input = "a,b,1,2,CCB,2000,x\na,b\na,,1,2,CCB,2000\na,b,1,2,ZZZ,2000\n";
        filter.filter_reader("f.csv", input.as_bytes());
        let report = filter.report();
        assert_eq!(report.total_rejected(), 4);
        assert_eq!(report.total_accepted(), 0);
        for kind in [
            DiagnosticKind::TooManyFields,
            DiagnosticKind::TooFewFields,
            DiagnosticKind::MissingField,
            DiagnosticKind::UnknownGenre,
        ] {
            assert_eq!(report.rejected[&kind], 1, "{kind}");
        }
    }

    /// Writer whose writes and flushes always fail.
    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::other("disk full"))
        }
    }

    /// Writer that accepts writes but fails to flush.
    #[derive(Default)]
    struct UnflushableWriter(Vec<u8>);

    impl Write for UnflushableWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::other("flush failed"))
        }
    }

    #[test]
    fn test_failing_sink_is_dropped_and_filtering_continues() {
        let mut sinks: IndexMap<Genre, Box<dyn Write>> = IndexMap::new();
        sinks.insert(Genre::CartoonsComics, Box::new(BrokenWriter));
        sinks.insert(Genre::MoviesTv, Box::new(Vec::new()));
        let mut filter = SyntaxFilter::new(sinks, DiagnosticSink::disabled(false));

        let input = "a,b,1,0201038013,CCB,2000\nonly,five,fields,x,y\nc,d,1,0201038013,MTV,2000\ne,f,1,0201038013,CCB,2001\n";
        filter.filter_reader("first.csv", input.as_bytes());
        filter.filter_reader("second.csv", "g,h,1,0201038013,MTV,2002\n".as_bytes());

        let (sinks, report) = filter.finish().unwrap();
        assert_eq!(report.files_processed, ["first.csv", "second.csv"]);
        assert!(report.files_skipped.is_empty());
        assert_eq!(report.accepted[&Genre::CartoonsComics], 2);
        assert_eq!(report.accepted[&Genre::MoviesTv], 2);
        assert_eq!(report.rejected[&DiagnosticKind::TooFewFields], 1);
        assert_eq!(report.lost, 2);
        assert!(report.genres_unavailable.contains(&Genre::CartoonsComics));
        assert!(!report.genres_unavailable.contains(&Genre::MoviesTv));
        assert!(!sinks.contains_key(&Genre::CartoonsComics));
        assert!(sinks.contains_key(&Genre::MoviesTv));
    }

    #[test]
    fn test_flush_failure_drops_only_that_genre() {
        let mut sinks: IndexMap<Genre, UnflushableWriter> = IndexMap::new();
        sinks.insert(Genre::OldTimeRadio, UnflushableWriter::default());
        let mut filter = SyntaxFilter::new(sinks, DiagnosticSink::disabled(false));
        filter.filter_line("f", "a,b,1,2,OTR,2000");

        let (sinks, report) = filter.finish().unwrap();
        assert!(sinks.is_empty());
        assert!(report.genres_unavailable.contains(&Genre::OldTimeRadio));
        assert_eq!(report.genres_unavailable.len(), 8);
        assert_eq!(report.lost, 0);
    }
}
