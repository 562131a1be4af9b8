#![warn(missing_docs)]

//! # Shelver
//!
//! Sorts comma-separated book records into eight genre datasets, rejecting
//! malformed records along the way, and pages through the results.
//!
//! Records flow through three stages:
//!
//! 1. **Syntax filtering** ([`syntax`]) - every line must split into six
//!    non-empty fields ([`tokenizer`]) with a known genre code ([`genre`]).
//!    Good lines are copied to their genre's text file; bad ones are
//!    reported to the syntax error file.
//! 2. **Semantic validation** ([`semantic`]) - price must be non-negative,
//!    the ISBN must pass its checksum ([`isbn`]) and the year must be in
//!    1995..=2024. Valid lines become [`Book`]s in a [`RecordStore`] and
//!    are persisted per genre ([`persist`]).
//! 3. **Viewing** ([`navigator`]) - datasets are loaded into a [`Library`]
//!    and browsed a window at a time from the console.
//!
//! ## Quick Start
//!
//! ```
//! use shelver::semantic::validate_line;
//! use shelver::syntax::check_line;
//! use shelver::Genre;
//!
//! let line = r#""Dune",Herbert,12.99,0201038013,SSM,1999"#;
//! assert_eq!(check_line(line), Ok(Genre::SportsMemorabilia));
//!
//! let book = validate_line(line).unwrap();
//! assert_eq!(book.title, "Dune");
//! assert_eq!(book.year, 1999);
//! ```
//!
//! Running all stages over a directory:
//!
//! ```no_run
//! use shelver::{Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::new(PipelineConfig::in_dir("data"));
//! let report = pipeline.run()?;
//! println!("{} books accepted", report.validation.total_accepted());
//! let library = pipeline.load();
//! # Ok::<(), shelver::ShelverError>(())
//! ```
//!
//! ## Modules
//!
//! - [`tokenizer`] - quote-aware field splitting
//! - [`genre`] - the eight genre codes and dataset names
//! - [`syntax`] - structural checks and genre routing
//! - [`isbn`] - ISBN-10 / ISBN-13 checksums
//! - [`semantic`] - value checks and [`Book`] construction
//! - [`store`] - per-genre record stores and the loaded [`Library`]
//! - [`persist`] - binary dataset reader and writer
//! - [`navigator`] - paging cursor and console viewer
//! - [`diagnostic`] - rejection reports and their sinks
//! - [`control`] - control file listing the inputs
//! - [`config`] - pipeline configuration
//! - [`pipeline`] - the stages chained over a directory
//! - [`cli`] - command-line interface
//! - [`error`] - error types and result type

pub mod book;
pub mod cli;
pub mod config;
pub mod control;
pub mod diagnostic;
pub mod error;
pub mod genre;
pub mod isbn;
pub mod navigator;
pub mod persist;
pub mod pipeline;
pub mod semantic;
pub mod store;
pub mod syntax;
pub mod tokenizer;

pub use book::Book;
pub use config::PipelineConfig;
pub use control::ControlFile;
pub use diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSink, Stage};
pub use error::{Result, ShelverError};
pub use genre::Genre;
pub use isbn::{IsbnCheck, IsbnValidator};
pub use navigator::{Navigator, PageCursor};
pub use persist::{BookReader, BookWriter};
pub use pipeline::{Pipeline, RunReport};
pub use semantic::{SemanticFault, SemanticValidator, ValidationReport};
pub use store::{Library, RecordStore};
pub use syntax::{SplitReport, SyntaxFault, SyntaxFilter};
