//! Tracks: items played one after another.

use std::fmt;

use serde::{Deserialize, Serialize};

use cutline_core::{RationalTime, TimeRange};

use crate::error::{ModelError, Result};
use crate::item::Item;
use crate::marker::Marker;
use crate::metadata::Metadata;

/// Type of content a track holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TrackKind {
    #[default]
    Video,
    Audio,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Video => f.write_str("Video"),
            TrackKind::Audio => f.write_str("Audio"),
        }
    }
}

/// An ordered sequence of items.
///
/// Item positions are never stored: the start of child `i` is the sum of the
/// durations of children `0..i`, so inserting or removing an item moves
/// everything after it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Track {
    pub name: Option<String>,
    pub kind: TrackKind,
    /// Optional trim applied to the track's own time axis.
    pub source_range: Option<TimeRange>,
    children: Vec<Item>,
    #[serde(default)]
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Track {
    pub fn new(kind: TrackKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
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

    /// Add items after the existing children.
    pub fn with_children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Item>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Add an item after the last child.
    pub fn append(&mut self, item: impl Into<Item>) {
        self.children.push(item.into());
    }

    /// Insert an item at `index`, shifting later children right.
    pub fn insert(&mut self, index: usize, item: impl Into<Item>) -> Result<()> {
        if index > self.children.len() {
            return Err(ModelError::IndexOutOfRange {
                index,
                len: self.children.len(),
            });
        }
        self.children.insert(index, item.into());
        Ok(())
    }

    /// Detach and return the child at `index`.
    pub fn remove(&mut self, index: usize) -> Result<Item> {
        if index >= self.children.len() {
            return Err(ModelError::IndexOutOfRange {
                index,
                len: self.children.len(),
            });
        }
        Ok(self.children.remove(index))
    }

    /// Child at `index`, if there is one.
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.children.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Item> {
        self.children.get_mut(index)
    }

    /// Children in playback order.
    pub fn children(&self) -> &[Item] {
        &self.children
    }

    /// Children in playback order, for editing in place. Items cannot be
    /// added or removed through the slice; use [`Track::insert`] and
    /// [`Track::remove`].
    pub fn children_mut(&mut self) -> &mut [Item] {
        &mut self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Range covered by all children, starting at zero.
    pub fn available_range(&self) -> Result<TimeRange> {
        let total = sum_durations(self.children.iter())?;
        Ok(TimeRange::from_duration(total))
    }

    /// The played part of the track: its `source_range` if set, otherwise
    /// everything.
    pub fn trimmed_range(&self) -> Result<TimeRange> {
        match self.source_range {
            Some(range) => Ok(range),
            None => self.available_range(),
        }
    }

    /// Length of the played part of the track.
    pub fn duration(&self) -> Result<RationalTime> {
        Ok(self.trimmed_range()?.duration)
    }

    /// Range of child `index` in the track's coordinates.
    ///
    /// A transition sits on the cut before it: its range starts `in_offset`
    /// before the cut and lasts `in_offset + out_offset`.
    pub fn range_of_child_at_index(&self, index: usize) -> Result<TimeRange> {
        let child = self.children.get(index).ok_or(ModelError::IndexOutOfRange {
            index,
            len: self.children.len(),
        })?;
        let cursor = sum_durations(self.children[..index].iter())?;
        child_range(child, cursor)
    }

    /// Ranges of every child, computed in a single pass.
    pub fn range_of_all_children(&self) -> Result<Vec<TimeRange>> {
        let mut ranges = Vec::with_capacity(self.children.len());
        let mut cursor: Option<RationalTime> = None;
        for child in &self.children {
            let duration = child.duration()?;
            let start = cursor.unwrap_or_else(|| RationalTime::zero(duration.rate));
            ranges.push(child_range(child, start)?);
            cursor = Some(start.checked_add(&duration)?);
        }
        Ok(ranges)
    }
}

fn child_range(child: &Item, cursor: RationalTime) -> Result<TimeRange> {
    match child {
        Item::Transition(transition) => Ok(TimeRange::new(
            cursor.checked_sub(&transition.in_offset)?,
            transition.span()?,
        )),
        other => Ok(TimeRange::new(cursor, other.duration()?)),
    }
}

/// Sum of the durations of `items`, at the finest rate among them.
pub(crate) fn sum_durations<'a>(items: impl Iterator<Item = &'a Item>) -> Result<RationalTime> {
    let mut total: Option<RationalTime> = None;
    for item in items {
        let duration = item.duration()?;
        total = Some(match total {
            Some(sum) => sum.checked_add(&duration)?,
            None => duration,
        });
    }
    Ok(total.unwrap_or_default())
}
