/*++

Licensed under the Apache-2.0 license.

File Name:

    error.rs

Abstract:

    Error types shared by the vector parser, output extraction and the runner.

--*/

use crate::parser::Label;
use std::path::PathBuf;
use thiserror::Error;

/// A vector file could not be parsed. Vector files are assumed well formed,
/// so this aborts the file it was raised for.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path:?}: file name is too short to carry a mode tag")]
    BadFileName { path: PathBuf },
    #[error("{path:?}:{line}: line is not valid UTF-8")]
    NotUtf8 { path: PathBuf, line: usize },
    #[error("{path:?}:{line}: expected {expected} line, found end of file")]
    UnexpectedEof {
        path: PathBuf,
        line: usize,
        expected: Label,
    },
    #[error("{path:?}:{line}: expected line with prefix {:?}; was {found:?}", .expected.prefix())]
    WrongLabel {
        path: PathBuf,
        line: usize,
        expected: Label,
        found: String,
    },
    #[error("{path:?}:{line}: {label} value {value:?} is not hex")]
    NotHex {
        path: PathBuf,
        line: usize,
        label: Label,
        value: String,
    },
}

/// The implementation's stdout did not contain the expected result marker.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ExtractError {
    #[error("marker {marker:?} not found in output")]
    MissingMarker { marker: &'static str },
}

/// Failures that stop the whole run rather than a single file.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("unable to enumerate vector files: {0}")]
    ListVectors(#[source] std::io::Error),
    #[error("unable to write report: {0}")]
    Report(#[source] std::io::Error),
    #[error("unable to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
