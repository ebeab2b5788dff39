//! Media references: where a clip's material lives.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use cutline_core::TimeRange;

use crate::metadata::Metadata;

/// What a clip points at.
///
/// References are shared between clips through `Arc` and are not mutated
/// once shared; [`crate::Clip::media_reference_mut`] copies on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MediaReference {
    /// Media stored outside the timeline, addressed by a locator.
    External {
        name: Option<String>,
        target_url: String,
        available_range: Option<TimeRange>,
        #[serde(default)]
        metadata: Metadata,
    },
    /// No usable media (offline, generated, or never linked).
    Missing {
        name: Option<String>,
        #[serde(default)]
        metadata: Metadata,
    },
}

impl MediaReference {
    /// An external reference with no available range.
    pub fn external(target_url: impl Into<String>) -> Self {
        MediaReference::External {
            name: None,
            target_url: target_url.into(),
            available_range: None,
            metadata: Metadata::new(),
        }
    }

    /// A missing reference.
    pub fn missing() -> Self {
        MediaReference::Missing {
            name: None,
            metadata: Metadata::new(),
        }
    }

    /// Set the available range. Has no effect on a missing reference.
    pub fn with_available_range(mut self, range: TimeRange) -> Self {
        if let MediaReference::External {
            available_range, ..
        } = &mut self
        {
            *available_range = Some(range);
        }
        self
    }

    /// Set the display name.
    pub fn with_name(mut self, new_name: impl Into<String>) -> Self {
        match &mut self {
            MediaReference::External { name, .. } | MediaReference::Missing { name, .. } => {
                *name = Some(new_name.into());
            }
        }
        self
    }

    /// Wrap in an `Arc` so several clips can share it.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            MediaReference::External { name, .. } | MediaReference::Missing { name, .. } => {
                name.as_deref()
            }
        }
    }

    pub fn target_url(&self) -> Option<&str> {
        match self {
            MediaReference::External { target_url, .. } => Some(target_url),
            MediaReference::Missing { .. } => None,
        }
    }

    pub fn available_range(&self) -> Option<&TimeRange> {
        match self {
            MediaReference::External {
                available_range, ..
            } => available_range.as_ref(),
            MediaReference::Missing { .. } => None,
        }
    }

    pub fn metadata(&self) -> &Metadata {
        match self {
            MediaReference::External { metadata, .. } | MediaReference::Missing { metadata, .. } => {
                metadata
            }
        }
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        match self {
            MediaReference::External { metadata, .. } | MediaReference::Missing { metadata, .. } => {
                metadata
            }
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, MediaReference::Missing { .. })
    }
}

impl Default for MediaReference {
    fn default() -> Self {
        Self::missing()
    }
}
