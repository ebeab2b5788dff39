//! Clips and gaps: the leaves of a track.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use cutline_core::{RationalTime, TimeRange};

use crate::error::Result;
use crate::marker::Marker;
use crate::media::MediaReference;
use crate::metadata::Metadata;

/// A trimmed piece of media placed on a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub name: Option<String>,
    /// Range used, in the media's own time coordinates.
    pub source_range: TimeRange,
    media_reference: Arc<MediaReference>,
    #[serde(default)]
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Clip {
    /// Create an unnamed clip with a missing media reference.
    pub fn new(source_range: TimeRange) -> Self {
        Self {
            name: None,
            source_range,
            media_reference: Arc::new(MediaReference::missing()),
            markers: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Point this clip at `media`, sharing it with any other holder.
    pub fn with_media(mut self, media: Arc<MediaReference>) -> Self {
        self.media_reference = media;
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn media_reference(&self) -> &Arc<MediaReference> {
        &self.media_reference
    }

    pub fn set_media_reference(&mut self, media: Arc<MediaReference>) {
        self.media_reference = media;
    }

    /// Mutable access to the media reference.
    ///
    /// If the reference is shared with other clips it is copied first, so the
    /// edit only affects this clip.
    pub fn media_reference_mut(&mut self) -> &mut MediaReference {
        Arc::make_mut(&mut self.media_reference)
    }

    /// Length of the clip on its track.
    pub fn duration(&self) -> RationalTime {
        self.source_range.duration
    }

    pub fn trimmed_range(&self) -> TimeRange {
        self.source_range
    }

    pub fn available_range(&self) -> Option<TimeRange> {
        self.media_reference.available_range().copied()
    }

    /// Check the advisory invariant that the used range lies inside the
    /// media's available range. Clips without an available range pass.
    pub fn is_within_available_range(&self) -> Result<bool> {
        match self.available_range() {
            Some(available) => Ok(available.contains_range(&self.source_range)?),
            None => Ok(true),
        }
    }
}

/// Filler: occupies track time without media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub name: Option<String>,
    pub source_range: TimeRange,
    #[serde(default)]
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Gap {
    pub fn new(duration: RationalTime) -> Self {
        Self::with_range(TimeRange::from_duration(duration))
    }

    pub fn with_range(source_range: TimeRange) -> Self {
        Self {
            name: None,
            source_range,
            markers: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    pub fn duration(&self) -> RationalTime {
        self.source_range.duration
    }
}
