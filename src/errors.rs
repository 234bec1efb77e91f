use std::io;
use std::num::{ParseFloatError, ParseIntError};
use std::str::Utf8Error;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning raw CSV rows into typed records. Row numbers
/// are 1-based and count every row in the file, header included.
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("row {row} has {found} fields but at least {expected} are required")]
    MalformedInput {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}: field {field} is not valid UTF-8: {source}")]
    InvalidEncoding {
        row: usize,
        field: usize,
        source: Utf8Error,
    },

    #[error("row {row}: unable to parse cost {value:?}: {source}")]
    InvalidCost {
        row: usize,
        value: String,
        source: ParseFloatError,
    },

    #[error("row {row}: unable to parse amount {value:?} as a 32-bit integer: {source}")]
    InvalidAmount {
        row: usize,
        value: String,
        source: ParseIntError,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read chart markup: {0}")]
    ReadMarkup(#[from] io::Error),

    #[error("invalid chart markup: {0}")]
    InvalidMarkup(#[from] resvg::usvg::Error),

    #[error("unable to allocate a {width}x{height} canvas")]
    Canvas { width: u32, height: u32 },

    #[error("failed to encode png: {0}")]
    Encoding(String),
}

/// Top level error for a report run. Every variant is fatal.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unable to read {}: {source}", .path.display())]
    FileAccess { path: PathBuf, source: io::Error },

    #[error("malformed csv in {}: {source}", .path.display())]
    MalformedCsv { path: PathBuf, source: csv::Error },

    #[error("invalid record in {}: {source}", .path.display())]
    Records { path: PathBuf, source: RecordError },

    #[error("unable to write {}: {source}", .path.display())]
    WriteArtifact { path: PathBuf, source: io::Error },

    #[error("failed to render {}: {source}", .path.display())]
    Render { path: PathBuf, source: RenderError },

    #[error("unable to remove intermediate artifact {}: {source}", .path.display())]
    ArtifactCleanup { path: PathBuf, source: io::Error },
}

impl ReportError {
    /// Classifies a csv error raised while reading `path`. I/O faults are
    /// access errors, anything else means the file itself is malformed.
    pub fn from_csv(path: PathBuf, err: csv::Error) -> Self {
        if !err.is_io_error() {
            return ReportError::MalformedCsv { path, source: err };
        }

        match err.into_kind() {
            csv::ErrorKind::Io(source) => ReportError::FileAccess { path, source },
            // is_io_error only holds for ErrorKind::Io.
            kind => ReportError::FileAccess {
                path,
                source: io::Error::new(io::ErrorKind::Other, format!("{:?}", kind)),
            },
        }
    }
}
