//! Error type for the high-level API.

use std::path::PathBuf;

use thiserror::Error;

use cutline_core::TimeError;
use cutline_edit::ModelError;
use cutline_xmeml::{ReadError, WriteError};

/// Any failure of a read or write through this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading an xmeml document failed.
    #[error(transparent)]
    Read(#[from] ReadError),

    /// Writing an xmeml document failed.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// Model or JSON error.
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Time(#[from] TimeError),

    /// The format could not be inferred from a file name.
    #[error("Cannot infer timeline format from {}", path.display())]
    UnknownFormat { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        let read: Error = ReadError::AmbiguousRate {
            path: "/xmeml/sequence[1]".into(),
        }
        .into();
        assert!(matches!(read, Error::Read(_)));
        assert_eq!(read.to_string(), "No rate found for /xmeml/sequence[1]");

        let model: Error = ModelError::IndexOutOfRange { index: 3, len: 1 }.into();
        assert!(matches!(model, Error::Model(_)));
    }

    #[test]
    fn test_unknown_format_message() {
        let err = Error::UnknownFormat {
            path: PathBuf::from("cut.edl"),
        };
        assert!(err.to_string().contains("cut.edl"));
    }
}
