//! JSON serialization of whole timelines.
//!
//! The output is deterministic (keys keep insertion order), which makes the
//! JSON text a convenient equality oracle for round-trip tests.

use tracing::debug;

use crate::error::Result;
use crate::timeline::Timeline;

/// Serialize a timeline to pretty-printed JSON.
pub fn to_json_string(timeline: &Timeline) -> Result<String> {
    let text = serde_json::to_string_pretty(timeline)?;
    debug!(bytes = text.len(), "Serialized timeline to JSON");
    Ok(text)
}

/// Parse a timeline from JSON produced by [`to_json_string`].
pub fn from_json_str(text: &str) -> Result<Timeline> {
    let timeline: Timeline = serde_json::from_str(text)?;
    debug!(
        tracks = timeline.tracks.len(),
        name = timeline.name.as_deref().unwrap_or(""),
        "Parsed timeline from JSON"
    );
    Ok(timeline)
}
