//! Semantic validation: typed conversion and value checks.
//!
//! Each line accepted by the syntax stage is re-tokenized and checked in a
//! fixed order, stopping at the first failure:
//!
//! 1. price parses as a finite decimal and is not negative
//! 2. ISBN checksum for its length (see [`crate::isbn`])
//! 3. year parses as an integer in `1995..=2024`
//!
//! A line that passes becomes a [`Book`]. Text that fails to parse as a
//! number is reported like an out-of-range value of the same column, so one
//! bad record never stops the run.

use std::fmt;
use std::io::BufRead;

use indexmap::IndexMap;
use serde::Serialize;

use crate::book::Book;
use crate::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::error::Result;
use crate::genre::Genre;
use crate::isbn::{IsbnCheck, IsbnValidator};
use crate::store::RecordStore;
use crate::syntax::{Column, FIELD_COUNT};
use crate::tokenizer::{read_lines, tokenize, unquote};

/// Earliest accepted publication year.
pub const MIN_YEAR: i32 = 1995;

/// Latest accepted publication year.
pub const MAX_YEAR: i32 = 2024;

/// Why a structurally sound line failed validation.
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticFault {
    /// The price is below zero.
    NegativePrice(f64),
    /// The price column is not a finite decimal number.
    UnparseablePrice(String),
    /// A 10-character ISBN failed its checksum.
    BadIsbn10(String),
    /// A 13-character ISBN failed its checksum.
    BadIsbn13(String),
    /// The year is outside `MIN_YEAR..=MAX_YEAR`.
    YearOutOfRange(i32),
    /// The year column is not an integer.
    UnparseableYear(String),
    /// The line no longer splits into six fields with a known genre.
    Malformed,
}

impl SemanticFault {
    /// Diagnostic kind for this fault.
    #[must_use]
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            SemanticFault::NegativePrice(_) | SemanticFault::UnparseablePrice(_) => {
                DiagnosticKind::BadPrice
            },
            SemanticFault::BadIsbn10(_) => DiagnosticKind::BadIsbn10,
            SemanticFault::BadIsbn13(_) => DiagnosticKind::BadIsbn13,
            SemanticFault::YearOutOfRange(_) | SemanticFault::UnparseableYear(_) => {
                DiagnosticKind::BadYear
            },
            SemanticFault::Malformed => DiagnosticKind::MalformedRecord,
        }
    }

    /// Turn the fault into a diagnostic for `line` from dataset `source`.
    #[must_use]
    pub fn into_diagnostic(self, source: &str, line: &str) -> Diagnostic {
        Diagnostic::new(self.kind(), source, line, self.to_string())
    }
}

impl fmt::Display for SemanticFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticFault::NegativePrice(_) => f.write_str("Wrong Price"),
            SemanticFault::UnparseablePrice(text) => {
                write!(f, "Wrong Price: unparseable \"{text}\"")
            },
            SemanticFault::BadIsbn10(_) => f.write_str("Invalid ISBN-10"),
            SemanticFault::BadIsbn13(_) => f.write_str("Invalid ISBN-13"),
            SemanticFault::YearOutOfRange(_) => f.write_str("Invalid year"),
            SemanticFault::UnparseableYear(text) => {
                write!(f, "Invalid year: unparseable \"{text}\"")
            },
            SemanticFault::Malformed => f.write_str("malformed record"),
        }
    }
}

/// Validate one line and build the book it describes.
///
/// # Errors
///
/// Returns the first [`SemanticFault`] found.
///
/// # Examples
///
/// ```
/// use shelver::semantic::validate_line;
/// use shelver::Genre;
///
/// let book = validate_line(r#""Dune",Herbert,12.99,0201038013,SSM,1999"#).unwrap();
/// assert_eq!(book.title, "Dune");
/// assert_eq!(book.genre, Genre::SportsMemorabilia);
/// assert!(validate_line("Dune,Herbert,-1,0201038013,SSM,1999").is_err());
/// ```
pub fn validate_line(line: &str) -> std::result::Result<Book, SemanticFault> {
    let fields = tokenize(line);
    if fields.len() != FIELD_COUNT {
        return Err(SemanticFault::Malformed);
    }

    let price = parse_price(fields[Column::Price.index()])?;

    let isbn = fields[Column::Isbn.index()];
    match IsbnValidator::check(isbn) {
        IsbnCheck::InvalidIsbn10 => return Err(SemanticFault::BadIsbn10(isbn.to_string())),
        IsbnCheck::InvalidIsbn13 => return Err(SemanticFault::BadIsbn13(isbn.to_string())),
        IsbnCheck::ValidIsbn10 | IsbnCheck::ValidIsbn13 | IsbnCheck::NotApplicable => {},
    }

    let year = parse_year(fields[Column::Year.index()])?;

    let genre =
        Genre::from_code(fields[Column::Genre.index()]).ok_or(SemanticFault::Malformed)?;

    Ok(Book {
        title: unquote(fields[Column::Title.index()]).to_string(),
        authors: fields[Column::Authors.index()].to_string(),
        price,
        isbn: isbn.to_string(),
        genre,
        year,
    })
}

fn parse_price(text: &str) -> std::result::Result<f64, SemanticFault> {
    let price: f64 = text
        .trim()
        .parse()
        .map_err(|_| SemanticFault::UnparseablePrice(text.to_string()))?;
    if !price.is_finite() {
        return Err(SemanticFault::UnparseablePrice(text.to_string()));
    }
    if price < 0.0 {
        return Err(SemanticFault::NegativePrice(price));
    }
    Ok(price)
}

fn parse_year(text: &str) -> std::result::Result<i32, SemanticFault> {
    let year: i32 = text
        .trim()
        .parse()
        .map_err(|_| SemanticFault::UnparseableYear(text.to_string()))?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(SemanticFault::YearOutOfRange(year));
    }
    Ok(year)
}

/// Counts collected while validating genre buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Books accepted into each genre's store.
    pub accepted: IndexMap<Genre, usize>,
    /// Lines rejected, by kind.
    pub rejected: IndexMap<DiagnosticKind, usize>,
    /// Genres whose text input or binary sink was unavailable.
    pub genres_skipped: Vec<Genre>,
}

impl ValidationReport {
    /// Total books accepted.
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

/// Validates genre buckets into a [`RecordStore`].
#[derive(Debug)]
pub struct SemanticValidator {
    errors: DiagnosticSink,
    report: ValidationReport,
}

impl SemanticValidator {
    /// Create a validator reporting to `errors`.
    #[must_use]
    pub fn new(errors: DiagnosticSink) -> Self {
        SemanticValidator {
            errors,
            report: ValidationReport::default(),
        }
    }

    /// Validate one line of `genre`'s bucket.
    ///
    /// Accepted books are appended to `store`; rejected lines are reported.
    pub fn validate(&mut self, genre: Genre, line: &str, store: &mut RecordStore) -> bool {
        match validate_line(line) {
            Ok(book) => {
                store.push(book);
                *self.report.accepted.entry(genre).or_insert(0) += 1;
                true
            },
            Err(fault) => {
                *self.report.rejected.entry(fault.kind()).or_insert(0) += 1;
                self.errors
                    .report(&fault.into_diagnostic(genre.dataset(), line));
                false
            },
        }
    }

    /// Validate every line of a genre's bucket.
    ///
    /// Returns the number of books accepted from this reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader fails; books accepted before the
    /// failure remain in `store`.
    pub fn validate_reader<R: BufRead>(
        &mut self,
        genre: Genre,
        reader: R,
        store: &mut RecordStore,
    ) -> Result<usize> {
        let mut accepted = 0;
        for line in read_lines(reader) {
            if self.validate(genre, &line?, store) {
                accepted += 1;
            }
        }
        Ok(accepted)
    }

    /// Note a genre whose input or output was unavailable.
    ///
    /// Books already counted as accepted for it are withdrawn, since none
    /// of them reach a dataset.
    pub fn skip_genre(&mut self, genre: Genre) {
        self.report.accepted.shift_remove(&genre);
        self.report.genres_skipped.push(genre);
    }

    /// Counts so far.
    #[must_use]
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// Flush the diagnostic sink and return the final report.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails to flush.
    pub fn finish(mut self) -> Result<ValidationReport> {
        self.errors.flush()?;
        Ok(self.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: &str, isbn: &str, year: &str) -> String {
        format!("Title,Author,{price},{isbn},MTV,{year}")
    }

    #[test]
    fn test_end_to_end_book() {
        let book = validate_line(r#""Dune",Herbert,12.99,0201038013,SSM,1999"#).unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.authors, "Herbert");
        assert!((book.price - 12.99).abs() < f64::EPSILON);
        assert_eq!(book.isbn, "0201038013");
        assert_eq!(book.genre, Genre::SportsMemorabilia);
        assert_eq!(book.year, 1999);
    }

    #[test]
    fn test_quoted_title_with_commas() {
        let book = validate_line(r#""Cats, Dogs",Smith,1.00,0201038013,HCB,2000"#).unwrap();
        assert_eq!(book.title, "Cats, Dogs");
    }

    #[test]
    fn test_price_boundary() {
        assert!(validate_line(&line("0.00", "0201038013", "2000")).is_ok());
        assert_eq!(
            validate_line(&line("-0.01", "0201038013", "2000")),
            Err(SemanticFault::NegativePrice(-0.01))
        );
    }

    #[test]
    fn test_unparseable_price() {
        let fault = validate_line(&line("12,99", "0201038013", "2000"));
        // "12,99" adds a field, so the line is malformed, not a bad price
        assert_eq!(fault, Err(SemanticFault::Malformed));

        let fault = validate_line(&line("abc", "0201038013", "2000")).unwrap_err();
        assert_eq!(fault.kind(), DiagnosticKind::BadPrice);
        assert_eq!(fault.to_string(), "Wrong Price: unparseable \"abc\"");

        let fault = validate_line(&line("NaN", "0201038013", "2000")).unwrap_err();
        assert_eq!(fault.kind(), DiagnosticKind::BadPrice);
    }

    #[test]
    fn test_isbn_failures() {
        assert_eq!(
            validate_line(&line("1", "0201038014", "2000")).unwrap_err().kind(),
            DiagnosticKind::BadIsbn10
        );
        assert_eq!(
            validate_line(&line("1", "9780201038018", "2000")).unwrap_err().kind(),
            DiagnosticKind::BadIsbn13
        );
        assert!(validate_line(&line("1", "9780201038019", "2000")).is_ok());
    }

    #[test]
    fn test_other_isbn_lengths_skip_checksum() {
        assert!(validate_line(&line("1", "12345", "2000")).is_ok());
        assert!(validate_line(&line("1", "ABCDEFGHIJKL", "2000")).is_ok());
    }

    #[test]
    fn test_year_boundary() {
        assert!(validate_line(&line("1", "0201038013", "1995")).is_ok());
        assert!(validate_line(&line("1", "0201038013", "2024")).is_ok());
        assert_eq!(
            validate_line(&line("1", "0201038013", "1994")),
            Err(SemanticFault::YearOutOfRange(1994))
        );
        assert_eq!(
            validate_line(&line("1", "0201038013", "2025")),
            Err(SemanticFault::YearOutOfRange(2025))
        );
        assert_eq!(
            validate_line(&line("1", "0201038013", "20x4")).unwrap_err().kind(),
            DiagnosticKind::BadYear
        );
    }

    #[test]
    fn test_checks_stop_at_first_failure() {
        // bad price, bad isbn and bad year: only the price is reported
        let fault = validate_line(&line("-5", "0201038014", "1900")).unwrap_err();
        assert_eq!(fault.kind(), DiagnosticKind::BadPrice);

        let fault = validate_line(&line("5", "0201038014", "1900")).unwrap_err();
        assert_eq!(fault.kind(), DiagnosticKind::BadIsbn10);
    }

    #[test]
    fn test_validator_fills_store_in_order() {
        let mut store = RecordStore::new(Genre::MoviesTv);
        let mut validator = SemanticValidator::new(DiagnosticSink::disabled(false));
        let input = format!(
            "{}\n{}\n{}\n",
            line("1", "0201038013", "2000").replace("Title", "First"),
            line("-1", "0201038013", "2000"),
            line("2", "0201038013", "2001").replace("Title", "Second"),
        );

        let accepted = validator
            .validate_reader(Genre::MoviesTv, input.as_bytes(), &mut store)
            .unwrap();
        assert_eq!(accepted, 2);

        let titles: Vec<&str> = store.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, ["First", "Second"]);

        let report = validator.finish().unwrap();
        assert_eq!(report.accepted[&Genre::MoviesTv], 2);
        assert_eq!(report.rejected[&DiagnosticKind::BadPrice], 1);
    }

    #[test]
    fn test_skipped_genre_withdraws_its_accepted_books() {
        let mut validator = SemanticValidator::new(DiagnosticSink::disabled(false));
        let mut movies = RecordStore::new(Genre::MoviesTv);
        let mut radio = RecordStore::new(Genre::OldTimeRadio);
        let good = line("1", "0201038013", "2000");
        validator.validate(Genre::MoviesTv, &good, &mut movies);
        validator.validate(Genre::MoviesTv, &line("-1", "0201038013", "2000"), &mut movies);
        validator.validate(Genre::OldTimeRadio, &good, &mut radio);

        validator.skip_genre(Genre::MoviesTv);

        let report = validator.finish().unwrap();
        assert!(!report.accepted.contains_key(&Genre::MoviesTv));
        assert_eq!(report.accepted[&Genre::OldTimeRadio], 1);
        assert_eq!(report.total_accepted(), 1);
        assert_eq!(report.rejected[&DiagnosticKind::BadPrice], 1);
        assert_eq!(report.genres_skipped, [Genre::MoviesTv]);
    }
}
