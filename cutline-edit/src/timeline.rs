//! The composition root and tree-wide queries.

use serde::{Deserialize, Serialize};

use cutline_core::{RationalTime, TimeRange};

use crate::clip::Clip;
use crate::error::{ModelError, Result};
use crate::item::Item;
use crate::marker::Marker;
use crate::metadata::Metadata;
use crate::stack::Stack;
use crate::track::{Track, TrackKind};

/// Address of a node below the top-level stack.
///
/// Indices alternate between a track inside a stack and an item inside a
/// track: `[1, 4]` is item 4 of track 1, `[1, 6, 0]` is track 0 of the stack
/// sitting at item 6 of track 1. The empty path is the top-level stack.
pub type ItemPath = [usize];

/// Render a path the way errors report it, e.g. `tracks[1]/children[6]`.
pub fn format_path(path: &ItemPath) -> String {
    path.iter()
        .enumerate()
        .map(|(depth, index)| {
            if depth % 2 == 0 {
                format!("tracks[{index}]")
            } else {
                format!("children[{index}]")
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// An editorial timeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Timeline {
    pub name: Option<String>,
    /// Time of the first frame, if the source document records one.
    pub global_start_time: Option<RationalTime>,
    pub tracks: Stack,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Clone, Copy)]
enum NodeRef<'a> {
    Track(&'a Track),
    Item(&'a Item),
}

impl<'a> NodeRef<'a> {
    fn trimmed_range(&self) -> Result<TimeRange> {
        match self {
            NodeRef::Track(track) => track.trimmed_range(),
            NodeRef::Item(item) => item.trimmed_range(),
        }
    }

    fn markers(&self) -> &'a [Marker] {
        match self {
            NodeRef::Track(track) => &track.markers,
            NodeRef::Item(item) => item.markers(),
        }
    }
}

impl Timeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_global_start_time(mut self, time: RationalTime) -> Self {
        self.global_start_time = Some(time);
        self
    }

    pub fn video_tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks
            .children()
            .iter()
            .filter(|track| track.kind == TrackKind::Video)
    }

    pub fn audio_tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks
            .children()
            .iter()
            .filter(|track| track.kind == TrackKind::Audio)
    }

    pub fn duration(&self) -> Result<RationalTime> {
        self.tracks.duration()
    }

    /// Every clip in the timeline, depth first.
    pub fn clips(&self) -> Vec<&Clip> {
        let mut clips = Vec::new();
        collect_clips(&self.tracks, &mut clips);
        clips
    }

    /// The item at an even-length path.
    pub fn item_at(&self, path: &ItemPath) -> Result<&Item> {
        match self.resolve(path)?.pop() {
            Some((NodeRef::Item(item), _)) => Ok(item),
            _ => Err(ModelError::InvalidPath {
                path: path.to_vec(),
                message: "path does not end at an item".into(),
            }),
        }
    }

    /// The track at an odd-length path.
    pub fn track_at(&self, path: &ItemPath) -> Result<&Track> {
        match self.resolve(path)?.pop() {
            Some((NodeRef::Track(track), _)) => Ok(track),
            _ => Err(ModelError::InvalidPath {
                path: path.to_vec(),
                message: "path does not end at a track".into(),
            }),
        }
    }

    /// Range occupied by the node at `path`, in timeline coordinates.
    pub fn range_of_item(&self, path: &ItemPath) -> Result<TimeRange> {
        let chain = self.resolve(path)?;
        match chain.split_last() {
            Some(((_, in_parent), ancestors)) => self.map_to_timeline(ancestors, *in_parent),
            None => Ok(TimeRange::from_duration(self.tracks.duration()?)),
        }
    }

    /// Range of marker `index` of the node at `path`, in timeline
    /// coordinates.
    pub fn marker_range_in_timeline(&self, path: &ItemPath, index: usize) -> Result<TimeRange> {
        let chain = self.resolve(path)?;
        let markers = match chain.last() {
            Some((node, _)) => node.markers(),
            None => &self.tracks.markers,
        };
        let marker = markers.get(index).ok_or_else(|| ModelError::MarkerNotFound {
            path: path.to_vec(),
            index,
        })?;
        self.map_to_timeline(&chain, marker.marked_range)
    }

    /// Map a range expressed in the local time of the node at `path` into
    /// timeline coordinates.
    pub fn map_range_to_timeline(&self, path: &ItemPath, range: TimeRange) -> Result<TimeRange> {
        let chain = self.resolve(path)?;
        self.map_to_timeline(&chain, range)
    }

    /// Check every time value in the tree: valid rates and non-negative
    /// durations.
    pub fn validate(&self) -> Result<()> {
        let mut path = Vec::new();
        validate_stack(&self.tracks, &mut path)
    }

    fn map_to_timeline(&self, chain: &[(NodeRef<'_>, TimeRange)], mut range: TimeRange) -> Result<TimeRange> {
        for (node, in_parent) in chain.iter().rev() {
            let local_start = node.trimmed_range()?.start_time;
            range = range.shifted_by(&in_parent.start_time.checked_sub(&local_start)?)?;
        }
        let top_start = self.tracks.trimmed_range()?.start_time;
        Ok(range.shifted_by(&RationalTime::new(-top_start.value, top_start.rate))?)
    }

    /// Walk `path`, returning each node with its range inside its parent.
    fn resolve(&self, path: &ItemPath) -> Result<Vec<(NodeRef<'_>, TimeRange)>> {
        let invalid = |message: &str| ModelError::InvalidPath {
            path: path.to_vec(),
            message: message.to_string(),
        };

        let mut chain = Vec::with_capacity(path.len());
        let mut stack = &self.tracks;
        let mut track: Option<&Track> = None;
        let mut item: Option<&Item> = None;

        for (depth, &index) in path.iter().enumerate() {
            if depth % 2 == 0 {
                if depth > 0 {
                    stack = match item {
                        Some(Item::Stack(nested)) => nested,
                        _ => return Err(invalid("only stacks contain tracks")),
                    };
                }
                let child = stack
                    .get(index)
                    .ok_or_else(|| invalid(&format!("no track at index {index}")))?;
                chain.push((NodeRef::Track(child), stack.range_of_child_at_index(index)?));
                track = Some(child);
            } else {
                let parent = track.ok_or_else(|| invalid("items live inside tracks"))?;
                let child = parent
                    .get(index)
                    .ok_or_else(|| invalid(&format!("no item at index {index}")))?;
                chain.push((NodeRef::Item(child), parent.range_of_child_at_index(index)?));
                item = Some(child);
            }
        }
        Ok(chain)
    }
}

fn collect_clips<'a>(stack: &'a Stack, out: &mut Vec<&'a Clip>) {
    for track in stack.children() {
        for item in track.children() {
            match item {
                Item::Clip(clip) => out.push(clip),
                Item::Stack(nested) => collect_clips(nested, out),
                Item::Gap(_) | Item::Transition(_) => {}
            }
        }
    }
}

fn invalid_node(path: &[usize], source: cutline_core::TimeError) -> ModelError {
    ModelError::InvalidNode {
        path: format_path(path),
        source,
    }
}

fn validate_markers(markers: &[Marker], path: &[usize]) -> Result<()> {
    for marker in markers {
        marker
            .marked_range
            .validate()
            .map_err(|err| invalid_node(path, err))?;
    }
    Ok(())
}

fn validate_stack(stack: &Stack, path: &mut Vec<usize>) -> Result<()> {
    if let Some(range) = &stack.source_range {
        range.validate().map_err(|err| invalid_node(path, err))?;
    }
    validate_markers(&stack.markers, path)?;
    for (track_index, track) in stack.children().iter().enumerate() {
        path.push(track_index);
        if let Some(range) = &track.source_range {
            range.validate().map_err(|err| invalid_node(path, err))?;
        }
        validate_markers(&track.markers, path)?;
        for (item_index, item) in track.children().iter().enumerate() {
            path.push(item_index);
            validate_item(item, path)?;
            path.pop();
        }
        validate_transitions(track, path)?;
        path.pop();
    }
    Ok(())
}

/// A transition's in offset cannot reach back before the track starts.
fn validate_transitions(track: &Track, path: &mut Vec<usize>) -> Result<()> {
    let ranges = track.range_of_all_children()?;
    let misplaced = track
        .children()
        .iter()
        .zip(&ranges)
        .position(|(item, range)| item.is_transition() && range.start_time.is_negative());
    if let Some(index) = misplaced {
        path.push(index);
        let err = ModelError::TransitionBeforeStart {
            path: format_path(path),
        };
        path.pop();
        return Err(err);
    }
    Ok(())
}

fn validate_item(item: &Item, path: &mut Vec<usize>) -> Result<()> {
    validate_markers(item.markers(), path)?;
    let checked = match item {
        Item::Clip(clip) => clip.source_range.validate(),
        Item::Gap(gap) => gap.source_range.validate(),
        Item::Transition(transition) => transition
            .in_offset
            .validate()
            .and_then(|_| transition.out_offset.validate()),
        Item::Stack(stack) => return validate_stack(stack, path),
    };
    checked.map_err(|err| invalid_node(path, err))
}
