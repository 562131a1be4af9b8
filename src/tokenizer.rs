//! Quote-aware splitting of record lines into fields.
//!
//! A record line is split on `,` except where the comma sits between a pair
//! of `"` characters. Quotes are kept in the returned fields; stripping the
//! quotes around a title is the semantic stage's job. There is no escape for
//! a quote inside a quoted run, and an unmatched quote extends to the end of
//! the line.
//!
//! Scanning uses `memchr2` to jump between the two interesting bytes, which
//! are both ASCII, so field boundaries always fall on UTF-8 char boundaries.
//!
//! # Examples
//!
//! ```
//! use shelver::tokenizer::tokenize;
//!
//! let fields = tokenize(r#""Dune, Messiah",Herbert,9.99,0201038013,SSM,1999"#);
//! assert_eq!(fields.len(), 6);
//! assert_eq!(fields[0], r#""Dune, Messiah""#);
//! assert_eq!(fields[5], "1999");
//! ```

use std::io::{self, BufRead};

use smallvec::SmallVec;

/// Field delimiter.
pub const DELIMITER: u8 = b',';

/// Quote character that suspends splitting.
pub const QUOTE: u8 = b'"';

/// Fields of one line. Well-formed records have six, so they never spill.
pub type Fields<'a> = SmallVec<[&'a str; 8]>;

/// Split `line` into fields.
///
/// A trailing delimiter yields a trailing empty field, and an empty line
/// yields a single empty field.
#[must_use]
pub fn tokenize(line: &str) -> Fields<'_> {
    let bytes = line.as_bytes();
    let mut fields = Fields::new();
    let mut start = 0;
    let mut pos = 0;
    let mut in_quotes = false;

    while let Some(offset) = memchr::memchr2(DELIMITER, QUOTE, &bytes[pos..]) {
        let at = pos + offset;
        if bytes[at] == QUOTE {
            in_quotes = !in_quotes;
        } else if !in_quotes {
            fields.push(&line[start..at]);
            start = at + 1;
        }
        pos = at + 1;
    }
    fields.push(&line[start..]);
    fields
}

/// Strip one leading and one trailing quote, if present.
///
/// Only the title column is unquoted this way.
#[must_use]
pub fn unquote(field: &str) -> &str {
    let field = field.strip_prefix('"').unwrap_or(field);
    field.strip_suffix('"').unwrap_or(field)
}

/// Iterate over the lines of `reader`.
///
/// Line endings (`\n` or `\r\n`) are removed and invalid UTF-8 is replaced
/// rather than failing the whole file. A final line without a terminator is
/// still yielded; a final terminator does not yield an extra empty line.
pub fn read_lines<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<String>> {
    reader.split(b'\n').map(|chunk| {
        chunk.map(|mut bytes| {
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            match String::from_utf8(bytes) {
                Ok(line) => line,
                Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
            }
        })
    })
}
