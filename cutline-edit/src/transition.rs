//! Transitions between adjacent track items.

use serde::{Deserialize, Serialize};

use cutline_core::RationalTime;

use crate::error::Result;
use crate::marker::Marker;
use crate::metadata::Metadata;

/// Supported transition types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionType {
    #[default]
    SmpteDissolve,
    Custom(String),
}

impl TransitionType {
    pub fn as_str(&self) -> &str {
        match self {
            TransitionType::SmpteDissolve => "SMPTE_Dissolve",
            TransitionType::Custom(name) => name,
        }
    }
}

/// A transition centred on the cut between the items before and after it.
///
/// Transitions take no time on their track: `in_offset` reaches back into the
/// outgoing item and `out_offset` forward into the incoming one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub name: Option<String>,
    pub transition_type: TransitionType,
    pub in_offset: RationalTime,
    pub out_offset: RationalTime,
    #[serde(default)]
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Transition {
    pub fn new(transition_type: TransitionType, in_offset: RationalTime, out_offset: RationalTime) -> Self {
        Self {
            name: None,
            transition_type,
            in_offset,
            out_offset,
            markers: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    /// A dissolve with the given offsets.
    pub fn dissolve(in_offset: RationalTime, out_offset: RationalTime) -> Self {
        Self::new(TransitionType::SmpteDissolve, in_offset, out_offset)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Track time consumed: always zero.
    pub fn duration(&self) -> RationalTime {
        RationalTime::zero(self.in_offset.rate)
    }

    /// Total time the transition overlaps its neighbours.
    pub fn span(&self) -> Result<RationalTime> {
        Ok(self.in_offset.checked_add(&self.out_offset)?)
    }
}
