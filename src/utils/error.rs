//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs
//! and the command layer.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while validating the input file, before any parsing
#[derive(Error, Debug)]
pub enum InputError {
    #[error("input file does not exist: {0}")]
    NotFound(PathBuf),

    #[error("input path is not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("input file is not readable: {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors that can occur while scanning a dump
///
/// Blocks the scanner cannot make sense of are skipped and tallied in
/// `SkipStats`, not reported here; only I/O failures mid-read are fatal.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("I/O error while reading input: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while writing report output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to write report: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("failed to serialize report: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("invalid output path: {0}")]
    InvalidPath(String),
}
