//! Prelude module for convenient imports.
//!
//! ```rust
//! use cutline::prelude::*;
//! ```

pub use crate::{Error, Result};

pub use crate::{RationalTime, TimeRange};

pub use crate::{
    Clip, Gap, Item, Marker, MediaReference, MetadataExt, Stack, Timeline, Track, TrackKind,
    Transition,
};

pub use crate::{read_from_file, read_from_string, write_to_file, write_to_string};
pub use crate::{AdapterOptions, Format};
