//! Error types for color transform file formats.

use thiserror::Error;

/// Result type for file format operations.
pub type LutResult<T> = Result<T, LutError>;

/// Errors that can occur while reading, writing or validating
/// CDL and ProcessList data.
#[derive(Debug, Error)]
pub enum LutError {
    /// Malformed file content at a known location.
    #[error("Error parsing {element} ({file}). Error is: {message}. At line ({line})")]
    Parse {
        /// Root element of the document being read.
        element: String,
        /// File name, or `<memory>` for in-memory sources.
        file: String,
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// Malformed content without location (version strings, style names).
    #[error("parse error: {0}")]
    ParseError(String),

    /// Selector or file did not resolve to anything.
    #[error("{0}")]
    NotFound(String),

    /// Numeric selector outside the collection.
    #[error("The specified cccid/cccindex '{index}' is outside the valid range for this file [0,{}]", .len.saturating_sub(1))]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Number of corrections available.
        len: usize,
    },

    /// Two corrections share an id.
    #[error("Duplicate elements with 'id' found. If id is specified, it must be unique. Duplicated id: '{id}'")]
    Duplicate {
        /// The repeated id.
        id: String,
    },

    /// Parameter value not allowed in this context.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Feature not representable in the requested format version.
    #[error("version mismatch: {0}")]
    VersionMismatch(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
