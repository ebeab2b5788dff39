//! Stacks: tracks played in parallel.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use cutline_core::{RationalTime, TimeRange};

use crate::error::{ModelError, Result};
use crate::marker::Marker;
use crate::metadata::Metadata;
use crate::track::Track;

/// Ordered tracks composited on top of each other. Later tracks have higher
/// priority.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Stack {
    pub name: Option<String>,
    /// Trim applied when the stack is nested inside a track.
    pub source_range: Option<TimeRange>,
    children: Vec<Track>,
    #[serde(default)]
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_source_range(mut self, range: TimeRange) -> Self {
        self.source_range = Some(range);
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Add tracks after the existing ones.
    pub fn with_tracks(mut self, tracks: impl IntoIterator<Item = Track>) -> Self {
        self.children.extend(tracks);
        self
    }

    /// Add a track on top of the others.
    pub fn append(&mut self, track: Track) {
        self.children.push(track);
    }

    /// Insert a track at `index`; later tracks move up one place.
    pub fn insert(&mut self, index: usize, track: Track) -> Result<()> {
        if index > self.children.len() {
            return Err(ModelError::IndexOutOfRange {
                index,
                len: self.children.len(),
            });
        }
        self.children.insert(index, track);
        Ok(())
    }

    /// Detach and return the track at `index`.
    pub fn remove(&mut self, index: usize) -> Result<Track> {
        if index >= self.children.len() {
            return Err(ModelError::IndexOutOfRange {
                index,
                len: self.children.len(),
            });
        }
        Ok(self.children.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.children.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.children.get_mut(index)
    }

    /// Tracks from bottom to top.
    pub fn children(&self) -> &[Track] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Track] {
        &mut self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Range covering the longest track, starting at zero.
    pub fn available_range(&self) -> Result<TimeRange> {
        let mut longest: Option<RationalTime> = None;
        for track in &self.children {
            let duration = track.duration()?;
            longest = match longest {
                Some(current) if current.cmp_time(&duration)? != Ordering::Less => Some(current),
                _ => Some(duration),
            };
        }
        Ok(TimeRange::from_duration(longest.unwrap_or_default()))
    }

    /// The played part of the stack: its `source_range` if set, otherwise
    /// the longest track.
    pub fn trimmed_range(&self) -> Result<TimeRange> {
        match self.source_range {
            Some(range) => Ok(range),
            None => self.available_range(),
        }
    }

    /// Length of the played part.
    pub fn duration(&self) -> Result<RationalTime> {
        Ok(self.trimmed_range()?.duration)
    }

    /// Every track starts at the beginning of the stack.
    pub fn range_of_child_at_index(&self, index: usize) -> Result<TimeRange> {
        let track = self.children.get(index).ok_or(ModelError::IndexOutOfRange {
            index,
            len: self.children.len(),
        })?;
        Ok(TimeRange::from_duration(track.duration()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::Gap;
    use crate::track::TrackKind;

    fn track(duration: f64) -> Track {
        Track::new(TrackKind::Video).with_children([Gap::new(RationalTime::new(duration, 30.0))])
    }

    #[test]
    fn test_duration_is_longest_track() {
        let stack = Stack::new().with_tracks([track(100.0), track(956.0), track(351.0)]);
        assert_eq!(stack.duration().unwrap(), RationalTime::new(956.0, 30.0));
        let range = stack.range_of_child_at_index(2).unwrap();
        assert!(range.start_time.is_zero());
        assert_eq!(range.duration, RationalTime::new(351.0, 30.0));
    }

    #[test]
    fn test_empty_stack() {
        let stack = Stack::new();
        assert!(stack.is_empty());
        assert!(stack.duration().unwrap().is_zero());
        assert!(stack.range_of_child_at_index(0).is_err());
    }

    #[test]
    fn test_nested_trim() {
        let range = TimeRange::new(RationalTime::new(10.0, 30.0), RationalTime::new(5.0, 30.0));
        let stack = Stack::new().with_tracks([track(100.0)]).with_source_range(range);
        assert_eq!(stack.duration().unwrap(), RationalTime::new(5.0, 30.0));
    }
}
