//! The control file listing the input files to split.
//!
//! The first whitespace-separated token is the number of input files `N`.
//! The remaining non-blank lines name the files, one per line. At most `N`
//! names are used; a shorter list is accepted with a warning.
//!
//! ```text
//! 3
//! books1996.csv
//! books1997.csv
//! books1998.csv
//! ```

use std::fs;
use std::path::Path;

use crate::error::{Result, ShelverError};

/// Parsed control file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFile {
    /// Count declared on the first line.
    pub expected: usize,
    /// Input file names in listed order.
    pub inputs: Vec<String>,
}

impl ControlFile {
    /// Parse control-file text.
    ///
    /// # Errors
    ///
    /// Returns [`ShelverError::ControlFile`] if the count is missing or not a
    /// non-negative integer.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelver::control::ControlFile;
    ///
    /// let control = ControlFile::parse("2\na.csv\n\n b.csv \nc.csv\n")?;
    /// assert_eq!(control.inputs, ["a.csv", "b.csv"]);
    /// # Ok::<(), shelver::ShelverError>(())
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim_start();
        let (count, rest) = text
            .split_once(char::is_whitespace)
            .unwrap_or((text, ""));

        if count.is_empty() {
            return Err(ShelverError::ControlFile(
                "missing input file count".to_string(),
            ));
        }
        let expected: usize = count.parse().map_err(|_| {
            ShelverError::ControlFile(format!("input file count is not a number: {count:?}"))
        })?;

        let inputs: Vec<String> = rest
            .lines()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .take(expected)
            .map(str::to_string)
            .collect();

        if inputs.len() < expected {
            tracing::warn!(
                expected,
                listed = inputs.len(),
                "control file lists fewer input files than declared"
            );
        }

        Ok(ControlFile { expected, inputs })
    }

    /// Read and parse a control file.
    ///
    /// # Errors
    ///
    /// Returns [`ShelverError::ControlFile`] if the file cannot be read or
    /// parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ShelverError::ControlFile(format!(
                "Could not open input file {} for reading: {e}",
                path.display()
            ))
        })?;
        Self::parse(&text)
    }
}
