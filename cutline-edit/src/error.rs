//! Errors raised while building or querying a composition.

use cutline_core::TimeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Index {index} is out of range (len: {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid item path {path:?}: {message}")]
    InvalidPath { path: Vec<usize>, message: String },

    #[error("Marker {index} not found at {path:?}")]
    MarkerNotFound { path: Vec<usize>, index: usize },

    #[error("Transition at {path} reaches back past the start of its track")]
    TransitionBeforeStart { path: String },

    #[error("Unknown marker color '{0}'")]
    UnknownMarkerColor(String),

    #[error("Invalid node at {path}: {source}")]
    InvalidNode {
        path: String,
        #[source]
        source: TimeError,
    },

    #[error(transparent)]
    Time(#[from] TimeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
