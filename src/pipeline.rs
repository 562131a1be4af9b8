//! The three stages chained over a working directory.
//!
//! 1. [`Pipeline::split`] reads the control file, runs every listed input
//!    through the [`SyntaxFilter`] and writes one text sink per genre.
//! 2. [`Pipeline::validate`] runs every genre's text sink through the
//!    [`SemanticValidator`] and persists the accepted books as a binary
//!    dataset per genre.
//! 3. [`Pipeline::load`] reads the binary datasets back into a [`Library`]
//!    for the navigator.
//!
//! Faults are contained at the smallest scope that makes sense: a bad record
//! is reported and skipped, a missing input file is skipped, a genre whose
//! files cannot be used is skipped. Only the control file and the diagnostic
//! sinks are fatal, and only to the stage that needs them.
//!
//! A genre text sink that cannot be created, or that fails part-way through
//! stage 1, stays unavailable for the whole run: lines routed to it are
//! counted as lost, and [`Pipeline::run`] skips that genre in stage 2 rather
//! than persist an incomplete or stale text file.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use crate::book::Book;
use crate::config::PipelineConfig;
use crate::control::ControlFile;
use crate::diagnostic::DiagnosticSink;
use crate::error::Result;
use crate::genre::Genre;
use crate::persist::{BookReader, BookWriter};
use crate::semantic::{SemanticValidator, ValidationReport};
use crate::store::{Library, RecordStore};
use crate::syntax::{SplitReport, SyntaxFilter};

/// Reports of the two processing stages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Stage 1 counts.
    pub split: SplitReport,
    /// Stage 2 counts.
    pub validation: ValidationReport,
}

/// Runs the stages against one [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Pipeline { config }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run stage 1 then stage 2.
    ///
    /// # Errors
    ///
    /// Returns the first stage-fatal error.
    pub fn run(&self) -> Result<RunReport> {
        let split = self.split()?;
        let validation = self.validate_skipping(&split.genres_unavailable)?;
        Ok(RunReport { split, validation })
    }

    /// Stage 1: split the listed input files into genre text sinks.
    ///
    /// # Errors
    ///
    /// Returns an error if the control file cannot be read or the syntax
    /// diagnostic sink cannot be created.
    pub fn split(&self) -> Result<SplitReport> {
        let control = ControlFile::load(self.config.control_path())?;
        tracing::info!(inputs = control.inputs.len(), "splitting input files");

        let errors_path = self.config.syntax_error_path();
        let errors = DiagnosticSink::create(&errors_path, self.config.echo_diagnostics)
            .map_err(|e| {
                println!(
                    "{}: Could not open/create the file to write to.",
                    errors_path.display()
                );
                e
            })?;

        let mut sinks = IndexMap::new();
        for genre in Genre::ALL {
            let path = self.config.text_path(genre);
            match File::create(&path) {
                Ok(file) => {
                    sinks.insert(genre, BufWriter::new(file));
                },
                Err(e) => {
                    println!(
                        "{}: Could not open/create the file to write to. Records for {genre} will be lost.",
                        path.display()
                    );
                    tracing::warn!(genre = %genre, path = %path.display(), error = %e, "genre sink unavailable");
                    remove_stale(&path);
                },
            }
        }

        let mut filter = SyntaxFilter::new(sinks, errors);
        for name in &control.inputs {
            let path = self.config.resolve(name);
            match File::open(&path) {
                Ok(file) => {
                    filter.filter_reader(name, BufReader::new(file));
                    tracing::info!(source = %name, "input file split");
                },
                Err(e) => {
                    println!("Could not find file {name}, moving on to the next input file.");
                    tracing::warn!(source = %name, error = %e, "input file skipped");
                    filter.skip_source(name);
                },
            }
        }

        let (_, report) = filter.finish()?;
        tracing::info!(
            accepted = report.total_accepted(),
            rejected = report.total_rejected(),
            lost = report.lost,
            unavailable = report.genres_unavailable.len(),
            "split finished"
        );
        Ok(report)
    }

    /// Stage 2: validate each genre's text sink and persist its books.
    ///
    /// # Errors
    ///
    /// Returns an error if the semantic diagnostic sink cannot be created.
    pub fn validate(&self) -> Result<ValidationReport> {
        self.validate_skipping(&[])
    }

    /// Stage 2, leaving out genres whose text sink stage 1 could not
    /// complete. Their binary datasets are removed so a previous run's
    /// books are not shown in their place.
    ///
    /// # Errors
    ///
    /// Returns an error if the semantic diagnostic sink cannot be created.
    pub fn validate_skipping(&self, unavailable: &[Genre]) -> Result<ValidationReport> {
        let errors_path = self.config.semantic_error_path();
        let errors = DiagnosticSink::create(&errors_path, self.config.echo_diagnostics)
            .map_err(|e| {
                println!(
                    "{}: Could not open/create the file to write to.",
                    errors_path.display()
                );
                e
            })?;

        let mut validator = SemanticValidator::new(errors);
        for genre in Genre::ALL {
            if unavailable.contains(&genre) {
                println!(
                    "{}: records were lost while splitting, moving on to the next genre.",
                    genre.dataset()
                );
                tracing::warn!(genre = %genre, "genre skipped, text sink incomplete");
                remove_stale(&self.config.binary_path(genre));
                validator.skip_genre(genre);
                continue;
            }
            match self.validate_genre(genre, &mut validator) {
                Ok(written) => {
                    tracing::info!(genre = %genre, books = written, "dataset written");
                },
                Err(e) => {
                    println!("{}: {e}, moving on to the next genre.", genre.dataset());
                    tracing::warn!(genre = %genre, error = %e, "genre skipped");
                    validator.skip_genre(genre);
                },
            }
        }

        let report = validator.finish()?;
        tracing::info!(
            accepted = report.total_accepted(),
            rejected = report.total_rejected(),
            "validation finished"
        );
        Ok(report)
    }

    fn validate_genre(&self, genre: Genre, validator: &mut SemanticValidator) -> Result<usize> {
        let input = File::open(self.config.text_path(genre))?;
        let mut store = RecordStore::with_capacity(genre, self.config.initial_capacity);
        validator.validate_reader(genre, BufReader::new(input), &mut store)?;

        let output = File::create(self.config.binary_path(genre))?;
        let mut writer = BookWriter::new(BufWriter::new(output))?;
        let written = writer.write_all(&store)?;
        writer.finish()?;
        Ok(written)
    }

    /// Stage 3: load every genre's binary dataset.
    ///
    /// A dataset that cannot be read is reported and loaded as empty.
    #[must_use]
    pub fn load(&self) -> Library {
        let mut library = Library::new();
        for genre in Genre::ALL {
            match self.load_genre(genre) {
                Ok(books) => {
                    tracing::info!(genre = %genre, books = books.len(), "dataset loaded");
                    library.insert(genre, books);
                },
                Err(e) => {
                    println!("Could not open the file {}", genre.binary_file_name());
                    tracing::warn!(genre = %genre, error = %e, "dataset unavailable");
                },
            }
        }
        library
    }

    fn load_genre(&self, genre: Genre) -> Result<Vec<Book>> {
        let file = File::open(self.config.binary_path(genre))?;
        let mut reader = BookReader::new(BufReader::new(file))?;
        reader.read_all()
    }
}

/// Remove an output left over from an earlier run, if any.
fn remove_stale(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::info!(path = %path.display(), "stale output removed"),
        Err(e) if e.kind() == ErrorKind::NotFound => {},
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "stale output could not be removed");
        },
    }
}

impl From<PipelineConfig> for Pipeline {
    fn from(config: PipelineConfig) -> Self {
        Pipeline::new(config)
    }
}
