//! The closed set of things that can sit on a track.

use serde::{Deserialize, Serialize};

use cutline_core::{RationalTime, TimeRange};

use crate::clip::{Clip, Gap};
use crate::error::Result;
use crate::marker::Marker;
use crate::metadata::Metadata;
use crate::stack::Stack;
use crate::transition::Transition;

/// A child of a [`crate::Track`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Item {
    Clip(Clip),
    Gap(Gap),
    Transition(Transition),
    Stack(Stack),
}

impl Item {
    /// Name of the wrapped node.
    pub fn name(&self) -> Option<&str> {
        match self {
            Item::Clip(clip) => clip.name.as_deref(),
            Item::Gap(gap) => gap.name.as_deref(),
            Item::Transition(transition) => transition.name.as_deref(),
            Item::Stack(stack) => stack.name.as_deref(),
        }
    }

    /// Markers in the item's own time coordinates.
    pub fn markers(&self) -> &[Marker] {
        match self {
            Item::Clip(clip) => &clip.markers,
            Item::Gap(gap) => &gap.markers,
            Item::Transition(transition) => &transition.markers,
            Item::Stack(stack) => &stack.markers,
        }
    }

    pub fn markers_mut(&mut self) -> &mut Vec<Marker> {
        match self {
            Item::Clip(clip) => &mut clip.markers,
            Item::Gap(gap) => &mut gap.markers,
            Item::Transition(transition) => &mut transition.markers,
            Item::Stack(stack) => &mut stack.markers,
        }
    }

    /// Free-form metadata of the wrapped node.
    pub fn metadata(&self) -> &Metadata {
        match self {
            Item::Clip(clip) => &clip.metadata,
            Item::Gap(gap) => &gap.metadata,
            Item::Transition(transition) => &transition.metadata,
            Item::Stack(stack) => &stack.metadata,
        }
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        match self {
            Item::Clip(clip) => &mut clip.metadata,
            Item::Gap(gap) => &mut gap.metadata,
            Item::Transition(transition) => &mut transition.metadata,
            Item::Stack(stack) => &mut stack.metadata,
        }
    }

    /// Time this item occupies on its track. Transitions occupy none.
    pub fn duration(&self) -> Result<RationalTime> {
        match self {
            Item::Clip(clip) => Ok(clip.duration()),
            Item::Gap(gap) => Ok(gap.duration()),
            Item::Transition(transition) => Ok(transition.duration()),
            Item::Stack(stack) => stack.duration(),
        }
    }

    /// The portion of the item's own time axis that is played, in its own
    /// coordinates.
    pub fn trimmed_range(&self) -> Result<TimeRange> {
        match self {
            Item::Clip(clip) => Ok(clip.trimmed_range()),
            Item::Gap(gap) => Ok(gap.source_range),
            Item::Transition(transition) => Ok(TimeRange::from_duration(transition.duration())),
            Item::Stack(stack) => stack.trimmed_range(),
        }
    }

    /// Transitions overlap their neighbours instead of taking track time.
    pub fn is_transition(&self) -> bool {
        matches!(self, Item::Transition(_))
    }

    /// The clip, if this item is one.
    pub fn as_clip(&self) -> Option<&Clip> {
        match self {
            Item::Clip(clip) => Some(clip),
            _ => None,
        }
    }

    pub fn as_gap(&self) -> Option<&Gap> {
        match self {
            Item::Gap(gap) => Some(gap),
            _ => None,
        }
    }

    pub fn as_transition(&self) -> Option<&Transition> {
        match self {
            Item::Transition(transition) => Some(transition),
            _ => None,
        }
    }

    /// The nested stack, if this item is one.
    pub fn as_stack(&self) -> Option<&Stack> {
        match self {
            Item::Stack(stack) => Some(stack),
            _ => None,
        }
    }

    pub fn as_stack_mut(&mut self) -> Option<&mut Stack> {
        match self {
            Item::Stack(stack) => Some(stack),
            _ => None,
        }
    }

    /// Short lowercase name of the variant, used in paths and log fields.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Item::Clip(_) => "clip",
            Item::Gap(_) => "gap",
            Item::Transition(_) => "transition",
            Item::Stack(_) => "stack",
        }
    }
}

impl From<Clip> for Item {
    fn from(clip: Clip) -> Self {
        Item::Clip(clip)
    }
}

impl From<Gap> for Item {
    fn from(gap: Gap) -> Self {
        Item::Gap(gap)
    }
}

impl From<Transition> for Item {
    fn from(transition: Transition) -> Self {
        Item::Transition(transition)
    }
}

impl From<Stack> for Item {
    fn from(stack: Stack) -> Self {
        Item::Stack(stack)
    }
}
