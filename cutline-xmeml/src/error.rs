//! Reader and writer error types.

use cutline_core::TimeError;
use cutline_edit::ModelError;
use thiserror::Error;

/// Errors raised while reading an xmeml document.
///
/// Every variant that refers to a place in the document carries the element
/// path, e.g. `/xmeml/sequence[1]/media/video/track[2]/clipitem[3]`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReadError {
    /// The document does not have the expected shape.
    #[error("Malformed document at {path}: {message}")]
    MalformedDocument { path: String, message: String },

    /// No rate could be found for an element or any of its ancestors.
    #[error("No rate found for {path}")]
    AmbiguousRate { path: String },

    /// A back-reference names an id that is never defined.
    #[error("Unresolved reference '{id}' at {path}")]
    UnresolvedReference { path: String, id: String },

    /// A construct the model cannot represent. Recoverable unless the reader
    /// runs in strict mode.
    #[error("Unsupported feature at {path}: {feature}")]
    UnsupportedFeature { path: String, feature: String },

    /// A time value in the document is invalid.
    #[error("Invalid time at {path}: {source}")]
    Time {
        path: String,
        #[source]
        source: TimeError,
    },

    /// The text is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(String),
}

impl ReadError {
    /// Whether reading can continue past this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ReadError::UnsupportedFeature { .. })
    }

    pub(crate) fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        ReadError::MalformedDocument {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<quick_xml::Error> for ReadError {
    fn from(err: quick_xml::Error) -> Self {
        ReadError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for ReadError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        ReadError::Xml(err.to_string())
    }
}

/// Errors raised while writing a timeline as xmeml.
#[derive(Error, Debug)]
pub enum WriteError {
    /// An item, offset or marker has a negative duration.
    #[error("Negative duration at {path}")]
    NegativeDuration { path: String },

    /// A transition whose in offset reaches back before its track starts.
    #[error("Transition at {path} reaches back past the start of its track")]
    TransitionBeforeStart { path: String },

    /// A rate that has no timebase/ntsc encoding.
    #[error("Rate {rate} at {path} cannot be written as a timebase")]
    UnsupportedRate { path: String, rate: f64 },

    #[error(transparent)]
    Time(#[from] TimeError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for WriteError {
    fn from(err: quick_xml::Error) -> Self {
        WriteError::Xml(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for WriteError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        WriteError::Xml(err.to_string())
    }
}

pub type ReadResult<T> = std::result::Result<T, ReadError>;
pub type WriteResult<T> = std::result::Result<T, WriteError>;
