//! Error types for IDML processing.

use std::fmt::Display;

use thiserror::Error;

/// Result type alias for IDML operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing, unwrapping or encoding documents.
///
/// Structural mismatches between two documents are never errors; they are
/// reported as [`Difference`](crate::compare::Difference) records.
#[derive(Error, Debug)]
pub enum Error {
    /// No input was supplied at all.
    #[error("input is nil")]
    NilInput,

    /// Input was supplied but contains no bytes.
    #[error("input is empty")]
    EmptyInput,

    /// The underlying XML could not be parsed.
    #[error("{context}: {message}")]
    Parse {
        /// The operation that was being performed.
        context: String,
        /// The tokenizer's description of the failure.
        message: String,
    },

    /// The namespace wrapper element was not present before end of stream.
    #[error("wrapper element {element} not found")]
    WrapperNotFound {
        /// Qualified name of the wrapper that was searched for.
        element: String,
    },

    /// Content could not be converted or written by the generic encoder.
    #[error("encode error: {0}")]
    Encode(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wraps a tokenizer failure with the operation it occurred in.
    pub fn parse(context: impl Into<String>, message: impl Display) -> Self {
        Error::Parse {
            context: context.into(),
            message: message.to_string(),
        }
    }
}

/// Rejects absent or zero-length input before any parse attempt.
pub fn require_input(input: Option<&[u8]>) -> Result<&[u8]> {
    match input {
        None => Err(Error::NilInput),
        Some([]) => Err(Error::EmptyInput),
        Some(bytes) => Ok(bytes),
    }
}
