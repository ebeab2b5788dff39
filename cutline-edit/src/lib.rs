//! Composition model for editorial timelines.
//!
//! A [`Timeline`] owns one top-level [`Stack`] of [`Track`]s. Tracks hold
//! [`Item`]s played one after another; a nested [`Stack`] can itself sit on
//! a track. All times are [`cutline_core::RationalTime`] values in the local
//! coordinates of the node that carries them.
//!
//! # Example
//!
//! ```
//! use cutline_core::{RationalTime, TimeRange};
//! use cutline_edit::{Clip, Gap, MediaReference, Timeline, Track, TrackKind};
//!
//! let rt = |v| RationalTime::new(v, 24.0);
//! let media = MediaReference::external("/var/tmp/test1.mov").shared();
//!
//! let mut track = Track::new(TrackKind::Video);
//! track.append(Gap::new(rt(10.0)));
//! track.append(Clip::new(TimeRange::new(rt(112.0), rt(40.0))).with_media(media));
//!
//! let mut timeline = Timeline::new("example");
//! timeline.tracks.append(track);
//!
//! assert_eq!(timeline.duration().unwrap(), rt(50.0));
//! assert_eq!(timeline.range_of_item(&[0, 1]).unwrap().start_time, rt(10.0));
//! ```

mod clip;
mod error;
mod item;
mod marker;
mod media;
mod stack;
mod timeline;
mod track;
mod transition;

pub mod json;
pub mod metadata;

pub use clip::{Clip, Gap};
pub use error::{ModelError, Result};
pub use item::Item;
pub use marker::{Marker, MarkerColor};
pub use media::MediaReference;
pub use metadata::{Metadata, MetadataExt};
pub use stack::Stack;
pub use timeline::{format_path, ItemPath, Timeline};
pub use track::{Track, TrackKind};
pub use transition::{Transition, TransitionType};
