//! Markers: annotated ranges attached to a composition node.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use cutline_core::{RationalTime, TimeRange};

use crate::error::ModelError;
use crate::metadata::Metadata;

/// Colour/status tag of a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarkerColor {
    #[default]
    Red,
    Pink,
    Orange,
    Yellow,
    Green,
    Cyan,
    Blue,
    Purple,
    Magenta,
    Black,
    White,
}

impl MarkerColor {
    pub const ALL: [MarkerColor; 11] = [
        MarkerColor::Red,
        MarkerColor::Pink,
        MarkerColor::Orange,
        MarkerColor::Yellow,
        MarkerColor::Green,
        MarkerColor::Cyan,
        MarkerColor::Blue,
        MarkerColor::Purple,
        MarkerColor::Magenta,
        MarkerColor::Black,
        MarkerColor::White,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerColor::Red => "RED",
            MarkerColor::Pink => "PINK",
            MarkerColor::Orange => "ORANGE",
            MarkerColor::Yellow => "YELLOW",
            MarkerColor::Green => "GREEN",
            MarkerColor::Cyan => "CYAN",
            MarkerColor::Blue => "BLUE",
            MarkerColor::Purple => "PURPLE",
            MarkerColor::Magenta => "MAGENTA",
            MarkerColor::Black => "BLACK",
            MarkerColor::White => "WHITE",
        }
    }
}

impl fmt::Display for MarkerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarkerColor {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MarkerColor::ALL
            .into_iter()
            .find(|color| color.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::UnknownMarkerColor(s.to_string()))
    }
}

/// A named range in the time coordinates of the node that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub name: Option<String>,
    pub marked_range: TimeRange,
    #[serde(default)]
    pub color: MarkerColor,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Marker {
    /// Create a marker covering `marked_range`.
    pub fn new(marked_range: TimeRange) -> Self {
        Self {
            name: None,
            marked_range,
            color: MarkerColor::default(),
            metadata: Metadata::new(),
        }
    }

    /// Create a zero-length marker at `time`.
    pub fn at(time: RationalTime) -> Self {
        Self::new(TimeRange::new(time, RationalTime::zero(time.rate)))
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_color(mut self, color: MarkerColor) -> Self {
        self.color = color;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Start of the marked range.
    pub fn start_time(&self) -> RationalTime {
        self.marked_range.start_time
    }
}
