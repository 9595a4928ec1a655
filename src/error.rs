use std::io;
use thiserror::Error;

/// Error type for table extraction.
///
/// Every variant carries the source path so callers can report which file of
/// a batch failed; `Parsing` also carries the range of blocks that were
/// examined.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Input file extension is not plain text.
    #[error("unsupported file type '.{extension}' for {path}: only .txt files are supported")]
    UnsupportedFileType { path: String, extension: String },

    /// Underlying byte source cannot be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Bytes decode under neither UTF-8 nor latin-1.
    #[error("could not decode {path} as UTF-8 or latin-1")]
    Encoding { path: String },

    /// A template header was found but no data region follows it.
    #[error("template file {path} has no data region")]
    EmptyData { path: String },

    /// No block of the file could be classified as tabular.
    #[error("no tabular block found in {path} ({blocks} blocks examined, lines {start}..{end})")]
    Parsing {
        path: String,
        blocks: usize,
        start: usize,
        end: usize,
    },
}

/// Result type alias for parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;
