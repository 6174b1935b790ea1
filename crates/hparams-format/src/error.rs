//! Error types for parameter file parsing and rendering.

use hparams_store::StoreError;

/// Errors that can occur while reading or writing parameter files.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A non-blank, non-comment line has no assignment marker.
    #[error("invalid line, missing assignment: {line:?}")]
    Format { line: String },

    /// The parsed assignment could not be inserted into the store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Wraps another error with the 1-based line number it occurred on.
    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<ParseError>,
    },

    /// A stored parameter cannot be written so that it reads back the same.
    #[error("cannot render {keypath:?}: {reason}")]
    Unrepresentable { keypath: String, reason: String },

    /// A line read from a file is not valid UTF-8.
    #[error("line is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// Comment and assignment markers that cannot work together.
    #[error("invalid parser configuration: {reason}")]
    InvalidConfig { reason: String },

    /// I/O error while reading a parameter file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// The innermost error, skipping any line-number wrappers.
    pub fn root_cause(&self) -> &ParseError {
        match self {
            ParseError::AtLine { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// The line number this error is attached to, if any.
    pub fn line_number(&self) -> Option<usize> {
        match self {
            ParseError::AtLine { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Convenience alias for parse results.
pub type ParseResult<T> = Result<T, ParseError>;
