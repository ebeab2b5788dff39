//! Final Cut Pro 7 XML (`xmeml`) adapter for cutline timelines.
//!
//! [`read_from_str`] turns a document into a [`Timeline`]; [`write_to_string`]
//! does the reverse. Structure, timing, names, markers and file references
//! round-trip. Elements the model has no field for are kept under the
//! [`NAMESPACE`] metadata key of the node they belong to and written back.
//!
//! ```
//! use cutline_xmeml::{read_from_str, write_to_string};
//!
//! let text = r#"<xmeml version="4"><sequence id="sequence-1">
//!   <name>cut</name>
//!   <rate><timebase>24</timebase><ntsc>FALSE</ntsc></rate>
//!   <media><video><track>
//!     <clipitem id="clipitem-1"><name>shot</name>
//!       <start>0</start><end>48</end><in>10</in><out>58</out>
//!     </clipitem>
//!   </track></video></media>
//! </sequence></xmeml>"#;
//!
//! let timeline = read_from_str(text)?;
//! assert_eq!(timeline.clips()[0].name.as_deref(), Some("shot"));
//!
//! let written = write_to_string(&timeline)?;
//! assert_eq!(read_from_str(&written)?, timeline);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Reading is lenient by default: constructs the model cannot express are
//! reported in [`ReadOutcome::warnings`] rather than failing the read. Use
//! [`ReaderConfig::strict`] to turn them into errors.
//!
//! [`Timeline`]: cutline_edit::Timeline

mod config;
mod dom;
mod element;
mod error;
mod identity;
mod reader;
mod vendor;
mod writer;

pub use config::{ReaderConfig, WriterConfig};
pub use error::{ReadError, ReadResult, WriteError, WriteResult};
pub use identity::{BackReferenceMap, IdentityMap};
pub use reader::{read_from_str, read_with_config, ReadOutcome};
pub use vendor::NAMESPACE;
pub use writer::{write_to_string, write_with_config};
