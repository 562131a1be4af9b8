//! The validated book entity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::genre::Genre;

/// A record that passed every syntax and semantic check.
///
/// Books are only built by the semantic stage (or decoded from a dataset it
/// wrote), so the invariants below hold for every instance:
///
/// - `price >= 0.0`
/// - `year` in `1995..=2024`
/// - `isbn` passes the checksum for its length, if one applies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Title with any surrounding quotes removed.
    pub title: String,
    /// Authors column, verbatim.
    pub authors: String,
    /// Price in currency units.
    pub price: f64,
    /// ISBN column, verbatim.
    pub isbn: String,
    /// Genre bucket.
    pub genre: Genre,
    /// Publication year.
    pub year: i32,
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Authors: {}", self.authors)?;
        writeln!(f, "Price: ${}", self.price)?;
        writeln!(f, "ISBN: {}", self.isbn)?;
        writeln!(f, "Genre: {}", self.genre)?;
        writeln!(f, "Year: {}", self.year)
    }
}
