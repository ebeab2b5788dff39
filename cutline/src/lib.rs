//! # Cutline
//!
//! Editorial timeline interchange: an in-memory composition model and a
//! lossless-within-scope adapter for Final Cut Pro 7 XML (`xmeml`).
//!
//! ## Quick Start
//!
//! ```rust
//! use cutline::{read_from_string, write_to_string, Format};
//!
//! fn main() -> cutline::Result<()> {
//!     let xml = r#"<xmeml version="4"><sequence>
//!       <name>cut</name>
//!       <rate><timebase>30</timebase><ntsc>FALSE</ntsc></rate>
//!       <media><video><track>
//!         <clipitem><name>a</name><start>15</start><end>45</end><in>0</in><out>30</out></clipitem>
//!       </track></video></media>
//!     </sequence></xmeml>"#;
//!
//!     let timeline = read_from_string(xml, Format::Xmeml)?;
//!     let track = timeline.video_tracks().next().expect("one video track");
//!     assert_eq!(track.len(), 2); // leading gap, then the clip
//!
//!     let json = write_to_string(&timeline, Format::Json)?;
//!     assert_eq!(read_from_string(&json, Format::Json)?, timeline);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several crates:
//! - `cutline-core`: rational time arithmetic and frame rates
//! - `cutline-edit`: the composition model and its JSON form
//! - `cutline-xmeml`: the xmeml reader and writer
//!
//! This crate re-exports the commonly used types and adds format selection
//! and file helpers on top.

mod adapter;
mod error;
mod options;
pub mod prelude;

// Time
pub use cutline_core::{rate_for_range, FrameRate, Rational, RationalTime, TimeError, TimeRange};

// Composition model
pub use cutline_edit::{
    format_path, json, metadata, Clip, Gap, Item, ItemPath, Marker, MarkerColor, MediaReference,
    Metadata, MetadataExt, ModelError, Stack, Timeline, Track, TrackKind, Transition,
    TransitionType,
};

// xmeml adapter
pub use cutline_xmeml::{
    BackReferenceMap, IdentityMap, ReadError, ReadOutcome, ReaderConfig, WriteError, WriterConfig,
    NAMESPACE,
};

// High-level API
pub use adapter::{read_from_file, read_from_string, write_to_file, write_to_string};
pub use error::{Error, Result};
pub use options::{AdapterOptions, Format};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
