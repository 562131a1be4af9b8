//! Pipeline configuration.
//!
//! This module provides [`PipelineConfig`], which says where the pipeline
//! finds its control file and writes its sinks. Every field has a default,
//! so an empty TOML document (or no file at all) is a valid configuration.
//!
//! ```toml
//! work_dir = "data"
//! control_file = "part1_input_file_names.txt"
//! syntax_error_file = "syntax_error_file.txt"
//! semantic_error_file = "semantic_error_file.txt"
//! initial_capacity = 100
//! echo_diagnostics = true
//! ```
//!
//! Relative file names are resolved against `work_dir`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, ShelverError};
use crate::genre::Genre;
use crate::store::DEFAULT_CAPACITY;

/// Default control file name.
pub const DEFAULT_CONTROL_FILE: &str = "part1_input_file_names.txt";

/// Default syntax diagnostic sink.
pub const DEFAULT_SYNTAX_ERROR_FILE: &str = "syntax_error_file.txt";

/// Default semantic diagnostic sink.
pub const DEFAULT_SEMANTIC_ERROR_FILE: &str = "semantic_error_file.txt";

/// Where the pipeline reads and writes, and how it reports.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory holding inputs, intermediate and binary sinks.
    pub work_dir: PathBuf,
    /// Control file listing the input files.
    pub control_file: PathBuf,
    /// Sink for syntax diagnostics.
    pub syntax_error_file: PathBuf,
    /// Sink for semantic diagnostics.
    pub semantic_error_file: PathBuf,
    /// Initial capacity of each genre's record store.
    pub initial_capacity: usize,
    /// Also print diagnostics to stdout.
    pub echo_diagnostics: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            work_dir: PathBuf::from("."),
            control_file: PathBuf::from(DEFAULT_CONTROL_FILE),
            syntax_error_file: PathBuf::from(DEFAULT_SYNTAX_ERROR_FILE),
            semantic_error_file: PathBuf::from(DEFAULT_SEMANTIC_ERROR_FILE),
            initial_capacity: DEFAULT_CAPACITY,
            echo_diagnostics: true,
        }
    }
}

impl PipelineConfig {
    /// Default configuration rooted at `work_dir`.
    pub fn in_dir(work_dir: impl Into<PathBuf>) -> Self {
        PipelineConfig {
            work_dir: work_dir.into(),
            ..Self::default()
        }
    }

    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ShelverError::Config`] on malformed TOML or unknown keys.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ShelverError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ShelverError::Config`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| ShelverError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    /// Resolve a file name against `work_dir`.
    #[must_use]
    pub fn resolve(&self, name: impl AsRef<Path>) -> PathBuf {
        self.work_dir.join(name)
    }

    /// Path of the control file.
    #[must_use]
    pub fn control_path(&self) -> PathBuf {
        self.resolve(&self.control_file)
    }

    /// Path of the syntax diagnostic sink.
    #[must_use]
    pub fn syntax_error_path(&self) -> PathBuf {
        self.resolve(&self.syntax_error_file)
    }

    /// Path of the semantic diagnostic sink.
    #[must_use]
    pub fn semantic_error_path(&self) -> PathBuf {
        self.resolve(&self.semantic_error_file)
    }

    /// Path of a genre's intermediate text sink.
    #[must_use]
    pub fn text_path(&self, genre: Genre) -> PathBuf {
        self.resolve(genre.text_file_name())
    }

    /// Path of a genre's binary dataset.
    #[must_use]
    pub fn binary_path(&self, genre: Genre) -> PathBuf {
        self.resolve(genre.binary_file_name())
    }
}
