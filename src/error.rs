//! Error types for shelver operations.
//!
//! This module provides the [`ShelverError`] type for all fallible library
//! operations and the [`Result`] convenience type.
//!
//! Malformed records are not errors: the syntax and semantic stages report
//! them as [`Diagnostic`](crate::diagnostic::Diagnostic) values and keep going.
//! A `ShelverError` means a file, sink or configuration could not be used.

use thiserror::Error;

/// Error type for all shelver library operations.
#[derive(Error, Debug)]
pub enum ShelverError {
    /// IO error from an input file or output sink.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A book could not be encoded into a binary dataset.
    #[error("Encode error: {0}")]
    EncodeError(#[from] rmp_serde::encode::Error),

    /// A book frame could not be decoded from a binary dataset.
    #[error("Decode error: {0}")]
    DecodeError(#[from] rmp_serde::decode::Error),

    /// A binary dataset has a bad header or a truncated frame.
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// The control file listing the input files is missing or malformed.
    #[error("Control file error: {0}")]
    ControlFile(String),

    /// The configuration file could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A genre code outside the fixed table.
    #[error("Unknown genre code: {0}")]
    UnknownGenre(String),
}

/// Convenience type alias for [`std::result::Result`] with [`ShelverError`].
pub type Result<T> = std::result::Result<T, ShelverError>;
