//! Reading xmeml documents into timelines.
//!
//! The document is parsed into an element arena, then walked once from the
//! outermost sequence down. Rates, shared files and nested sequences are
//! resolved on demand through an [`IdentityMap`], so a back-reference may
//! appear before the element that defines it.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace, warn};

use cutline_core::{FrameRate, RationalTime, TimeError, TimeRange};
use cutline_edit::{
    Clip, Gap, Item, Marker, MediaReference, Metadata, MetadataExt, ModelError, Stack, Timeline,
    Track, TrackKind, Transition, TransitionType,
};

use crate::config::ReaderConfig;
use crate::dom::{Document, NodeId};
use crate::error::{ReadError, ReadResult};
use crate::identity::IdentityMap;
use crate::vendor::{self, NAMESPACE};

/// `effectid` of the dissolve transition.
pub(crate) const DISSOLVE_EFFECT_ID: &str = "Cross Dissolve";

// Children each element kind maps onto the model. Everything else is kept
// as vendor metadata.
const SEQUENCE_FIELDS: &[&str] = &["name", "duration", "rate", "timecode", "media", "marker"];
const TRACK_FIELDS: &[&str] = &["name", "clipitem", "generatoritem", "transitionitem", "marker"];
const CLIP_FIELDS: &[&str] = &[
    "name", "duration", "rate", "start", "end", "in", "out", "file", "marker", "sequence",
];
const GENERATOR_FIELDS: &[&str] = &["name", "duration", "rate", "start", "end", "in", "out", "marker"];
const FILE_FIELDS: &[&str] = &["name", "pathurl", "rate", "duration", "timecode"];
const TRANSITION_FIELDS: &[&str] = &["start", "end", "alignment", "rate", "effect", "marker"];
const EFFECT_FIELDS: &[&str] = &["name", "effectid"];
const MARKER_FIELDS: &[&str] = &["name", "comment", "in", "out"];

/// A parsed timeline plus the constructs that were skipped or approximated.
#[derive(Debug)]
pub struct ReadOutcome {
    pub timeline: Timeline,
    /// One [`ReadError::UnsupportedFeature`] per skipped construct.
    pub warnings: Vec<ReadError>,
}

/// Read a document with the default configuration, dropping warnings.
pub fn read_from_str(text: &str) -> ReadResult<Timeline> {
    Ok(read_with_config(text, &ReaderConfig::default())?.timeline)
}

/// Read a document.
pub fn read_with_config(text: &str, config: &ReaderConfig) -> ReadResult<ReadOutcome> {
    let doc = Document::parse(text)?;
    let sequence = find_sequence(&doc)?;

    let mut reader = XmemlReader::new(&doc, config);
    let timeline = reader.read_timeline(sequence)?;

    debug!(
        name = timeline.name.as_deref().unwrap_or(""),
        tracks = timeline.tracks.len(),
        identities = reader.identity.len(),
        warnings = reader.warnings.len(),
        "Read xmeml timeline"
    );
    Ok(ReadOutcome {
        timeline,
        warnings: reader.warnings,
    })
}

/// Locate the single outermost sequence.
fn find_sequence(doc: &Document) -> ReadResult<NodeId> {
    let root = doc.root();
    match doc.name(root) {
        "sequence" => return Ok(root),
        "xmeml" => {}
        other => {
            return Err(ReadError::malformed(
                doc.path(root),
                format!("expected <xmeml>, found <{other}>"),
            ))
        }
    }

    let mut candidates: Vec<NodeId> = doc.children_named(root, "sequence").collect();
    for project in doc.children_named(root, "project") {
        if let Some(children) = doc.child(project, "children") {
            candidates.extend(doc.children_named(children, "sequence"));
        }
    }

    match candidates.as_slice() {
        [sequence] => {
            debug!(path = %doc.path(*sequence), "Found sequence");
            Ok(*sequence)
        }
        [] => Err(ReadError::malformed(doc.path(root), "document has no sequence")),
        many => Err(ReadError::malformed(
            doc.path(root),
            format!("expected one sequence, found {}", many.len()),
        )),
    }
}

struct XmemlReader<'a> {
    doc: &'a Document,
    config: &'a ReaderConfig,
    identity: IdentityMap,
    warnings: Vec<ReadError>,
    /// Ids of sequences currently being read, to reject self-nesting.
    open_sequences: HashSet<String>,
}

impl<'a> XmemlReader<'a> {
    fn new(doc: &'a Document, config: &'a ReaderConfig) -> Self {
        Self {
            doc,
            config,
            identity: IdentityMap::new(),
            warnings: Vec::new(),
            open_sequences: HashSet::new(),
        }
    }

    fn read_timeline(&mut self, sequence: NodeId) -> ReadResult<Timeline> {
        let doc = self.doc;
        let sequence = doc.definition(sequence)?;
        let (tracks, extras) = self.read_sequence(sequence)?;
        let global_start_time = self.timecode(sequence)?;

        let mut metadata = Metadata::new();
        vendor::attach(&mut metadata, extras);
        Ok(Timeline {
            name: doc.child_text(sequence, "name").map(str::to_string),
            global_start_time,
            tracks,
            metadata,
        })
    }

    /// Read a sequence as a stack, returning its unrecognized content
    /// separately so the caller decides where it lives.
    fn read_sequence(&mut self, sequence: NodeId) -> ReadResult<(Stack, Metadata)> {
        let doc = self.doc;
        let sequence = doc.definition(sequence)?;
        let Some(id) = doc.attribute(sequence, "id") else {
            return self.build_sequence(sequence);
        };

        if let Some((stack, extras)) = self.identity.sequence_with_extras(id) {
            debug!(id, "Sequence memo hit");
            return Ok((stack.clone(), extras.clone()));
        }
        if !self.open_sequences.insert(id.to_string()) {
            return Err(ReadError::malformed(
                doc.path(sequence),
                format!("sequence '{id}' contains itself"),
            ));
        }
        let built = self.build_sequence(sequence);
        self.open_sequences.remove(id);

        let (stack, extras) = built?;
        self.identity.insert_sequence(id, stack.clone(), extras.clone());
        Ok((stack, extras))
    }

    fn build_sequence(&mut self, sequence: NodeId) -> ReadResult<(Stack, Metadata)> {
        let doc = self.doc;
        let rate = self.resolve_rate(sequence)?;

        let mut stack = Stack::new();
        stack.name = doc.child_text(sequence, "name").map(str::to_string);

        let mut media_extras = Metadata::new();
        if let Some(media) = doc.child(sequence, "media") {
            for (group_name, kind) in [("video", TrackKind::Video), ("audio", TrackKind::Audio)] {
                for group in doc.children_named(media, group_name) {
                    for track in doc.children_named(group, "track") {
                        let track = self.read_track(track, kind)?;
                        stack.append(track);
                    }
                    let extras = vendor::extras(doc, group, &["track"]);
                    if !extras.is_empty() {
                        media_extras.insert(group_name.to_string(), Value::Object(extras));
                    }
                }
            }
            media_extras.extend(vendor::extras(doc, media, &["video", "audio"]));
        }
        if !media_extras.is_empty() {
            stack
                .metadata
                .namespace_mut(NAMESPACE)
                .insert("media".into(), Value::Object(media_extras));
        }

        for marker in doc.children_named(sequence, "marker") {
            let marker = self.read_marker(marker, rate)?;
            stack.markers.push(marker);
        }

        debug!(
            path = %doc.path(sequence),
            rate,
            tracks = stack.len(),
            "Read sequence"
        );
        Ok((stack, vendor::extras(doc, sequence, SEQUENCE_FIELDS)))
    }

    fn read_track(&mut self, track: NodeId, kind: TrackKind) -> ReadResult<Track> {
        let doc = self.doc;
        let rate = self.resolve_rate(track)?;

        let mut out = Track::new(kind);
        out.name = doc.child_text(track, "name").map(str::to_string);

        // Running position in frames at the track rate.
        let mut cursor = 0.0_f64;
        let mut after_transition = false;

        for child in doc.children(track) {
            match doc.name(child) {
                "clipitem" | "generatoritem" => {
                    let start = self.position(child, "start")?.unwrap_or(cursor);
                    let overlapped = start < cursor && !after_transition;
                    if start > cursor {
                        out.append(Gap::new(RationalTime::new(start - cursor, rate)));
                        cursor = start;
                    } else if overlapped {
                        self.unsupported(child, "overlapping items")?;
                    }

                    let mut item = self.read_clip_item(child)?;
                    if overlapped {
                        item.metadata_mut().namespace_mut(NAMESPACE).insert(
                            vendor::PLACEMENT_KEY.into(),
                            Value::Object(vendor::placement(doc, child)),
                        );
                    }
                    let duration = item
                        .duration()
                        .and_then(|d| Ok(d.value_rescaled_to(rate)?))
                        .map_err(|err| model_error(doc.path(child), err))?;
                    cursor = match self.position(child, "end")? {
                        Some(end) if !overlapped && end >= cursor => end,
                        _ => cursor + duration,
                    };
                    trace!(kind = item.kind_name(), name = item.name().unwrap_or(""), cursor, "Placed item");
                    out.append(item);
                    after_transition = false;
                }
                "transitionitem" => {
                    let start = self.required_number(child, "start")?;
                    let end = self.required_number(child, "end")?;
                    if start > cursor {
                        out.append(Gap::new(RationalTime::new(start - cursor, rate)));
                        cursor = start;
                    }
                    let transition = self.read_transition(child, rate, cursor - start, end - cursor)?;
                    out.append(transition);
                    after_transition = true;
                }
                "marker" => {
                    let marker = self.read_marker(child, rate)?;
                    out.markers.push(marker);
                }
                "name" => {}
                other => {
                    if doc.child(child, "start").is_some() || doc.child(child, "end").is_some() {
                        self.unsupported(child, format!("<{other}> on a track"))?;
                    }
                }
            }
        }

        vendor::attach(&mut out.metadata, vendor::extras(doc, track, TRACK_FIELDS));
        Ok(out)
    }

    /// A `<clipitem>` or `<generatoritem>`: a clip, or a stack when the
    /// clipitem wraps a nested sequence.
    fn read_clip_item(&mut self, node: NodeId) -> ReadResult<Item> {
        let doc = self.doc;
        let is_generator = doc.name(node) == "generatoritem";
        let node = doc.definition(node)?;
        let rate = self.resolve_rate(node)?;
        let name = doc.child_text(node, "name").map(str::to_string);

        for filter in doc.children_named(node, "filter") {
            let effect_id = doc
                .child(filter, "effect")
                .and_then(|effect| doc.child_text(effect, "effectid"));
            if effect_id.map_or(false, |id| id.eq_ignore_ascii_case("timeremap")) {
                self.unsupported(filter, "time remap filter")?;
            }
        }
        if doc.child(node, "multiclip").is_some() {
            self.unsupported(node, "multiclip")?;
        }

        let mut markers = Vec::new();
        for marker in doc.children_named(node, "marker") {
            markers.push(self.read_marker(marker, rate)?);
        }

        if !is_generator {
            if let Some(sequence) = doc.child(node, "sequence") {
                return self.read_nested(node, sequence, name, markers, rate);
            }
        }

        let source_range = match self.in_out_range(node, rate)? {
            Some(range) => range,
            None => {
                let in_point = self.position(node, "in")?.unwrap_or(0.0);
                let length = match (self.position(node, "start")?, self.position(node, "end")?) {
                    (Some(start), Some(end)) => end - start,
                    _ => self.number(node, "duration")?.ok_or_else(|| {
                        ReadError::malformed(doc.path(node), "clip has no in/out, start/end or duration")
                    })?,
                };
                self.range(node, in_point, length, rate)?
            }
        };

        let media = match doc.child(node, "file") {
            Some(file) if !is_generator => self.read_file(file)?,
            _ => MediaReference::missing().shared(),
        };

        let mut clip = Clip::new(source_range).with_media(media);
        clip.name = name;
        clip.markers = markers;
        let fields = if is_generator { GENERATOR_FIELDS } else { CLIP_FIELDS };
        vendor::attach(&mut clip.metadata, vendor::extras(doc, node, fields));
        Ok(Item::Clip(clip))
    }

    fn read_nested(
        &mut self,
        clip_item: NodeId,
        sequence: NodeId,
        name: Option<String>,
        markers: Vec<Marker>,
        rate: f64,
    ) -> ReadResult<Item> {
        let doc = self.doc;
        let (mut stack, sequence_extras) = self.read_sequence(sequence)?;
        if name.is_some() {
            stack.name = name;
        }
        stack.source_range = self.in_out_range(clip_item, rate)?;

        let mut own = vendor::extras(doc, clip_item, CLIP_FIELDS);
        if !sequence_extras.is_empty() {
            own.insert("sequence".into(), Value::Object(sequence_extras));
        }
        if !own.is_empty() {
            stack.metadata.namespace_mut(NAMESPACE).extend(own);
        }

        let sequence_markers = std::mem::take(&mut stack.markers);
        stack.markers = markers;
        stack.markers.extend(sequence_markers);

        trace!(name = stack.name.as_deref().unwrap_or(""), tracks = stack.len(), "Read nested sequence");
        Ok(Item::Stack(stack))
    }

    fn read_file(&mut self, file: NodeId) -> ReadResult<Arc<MediaReference>> {
        let doc = self.doc;
        let file = doc.definition(file)?;
        let id = doc.attribute(file, "id");
        if let Some(media) = id.and_then(|id| self.identity.media(id)) {
            trace!(id, "File memo hit");
            return Ok(Arc::clone(media));
        }

        let name = doc.child_text(file, "name").map(str::to_string);
        let mut metadata = Metadata::new();
        vendor::attach(&mut metadata, vendor::extras(doc, file, FILE_FIELDS));

        let media = match doc.child_text(file, "pathurl") {
            Some(url) => {
                let available_range = match self.number(file, "duration")? {
                    Some(duration) => {
                        let rate = self.resolve_rate(file)?;
                        let start = self.timecode(file)?.unwrap_or(RationalTime::zero(rate));
                        Some(
                            TimeRange::try_new(start, RationalTime::new(duration, rate))
                                .map_err(|source| time_error(doc, file, source))?,
                        )
                    }
                    None => None,
                };
                MediaReference::External {
                    name,
                    target_url: url.to_string(),
                    available_range,
                    metadata,
                }
            }
            None => MediaReference::Missing { name, metadata },
        };

        let media = Arc::new(media);
        if let Some(id) = id {
            trace!(id, "File memo miss");
            self.identity.insert_media(id, Arc::clone(&media));
        }
        Ok(media)
    }

    fn read_transition(
        &mut self,
        node: NodeId,
        track_rate: f64,
        in_frames: f64,
        out_frames: f64,
    ) -> ReadResult<Transition> {
        let doc = self.doc;
        if out_frames < 0.0 {
            return Err(ReadError::malformed(doc.path(node), "transition ends before its cut"));
        }

        let mut transition = Transition::dissolve(
            RationalTime::new(in_frames, track_rate),
            RationalTime::new(out_frames, track_rate),
        );
        let mut extras = vendor::extras(doc, node, TRANSITION_FIELDS);

        if let Some(effect) = doc.child(node, "effect") {
            transition.name = doc.child_text(effect, "name").map(str::to_string);
            transition.transition_type = match doc.child_text(effect, "effectid") {
                Some(DISSOLVE_EFFECT_ID) | None => TransitionType::SmpteDissolve,
                Some(other) => TransitionType::Custom(other.to_string()),
            };
            let effect_extras = vendor::extras(doc, effect, EFFECT_FIELDS);
            if !effect_extras.is_empty() {
                extras.insert("effect".into(), Value::Object(effect_extras));
            }
        }

        let rate = self.resolve_rate(node)?;
        for marker in doc.children_named(node, "marker") {
            transition.markers.push(self.read_marker(marker, rate)?);
        }
        vendor::attach(&mut transition.metadata, extras);
        Ok(transition)
    }

    fn read_marker(&mut self, node: NodeId, rate: f64) -> ReadResult<Marker> {
        let doc = self.doc;
        let start = self.required_number(node, "in")?;
        let duration = match self.number(node, "out")? {
            Some(out) if out >= 0.0 => out - start,
            _ => 0.0,
        };

        let mut marker = Marker::new(self.range(node, start, duration, rate)?);
        marker.name = doc
            .child_text(node, "name")
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        let mut extras = Metadata::new();
        if let Some(comment) = doc.child_text(node, "comment").filter(|c| !c.is_empty()) {
            extras.insert("comment".into(), Value::String(comment.to_string()));
        }
        extras.extend(vendor::extras(doc, node, MARKER_FIELDS));
        vendor::attach(&mut marker.metadata, extras);
        Ok(marker)
    }

    /// Rate of an element: its own `<rate>`, else the nearest ancestor's,
    /// else the configured default.
    fn resolve_rate(&mut self, node: NodeId) -> ReadResult<f64> {
        let doc = self.doc;
        let origin = doc.definition(node)?;
        if let Some(rate) = doc.attribute(origin, "id").and_then(|id| self.identity.rate(id)) {
            trace!(path = %doc.path(origin), rate, "Rate memo hit");
            return Ok(rate);
        }

        let mut found = None;
        let mut current = Some(origin);
        while let Some(candidate) = current {
            let candidate = doc.definition(candidate)?;
            if let Some(rate) = doc.attribute(candidate, "id").and_then(|id| self.identity.rate(id)) {
                found = Some(rate);
                break;
            }
            if let Some(rate_node) = doc.child(candidate, "rate") {
                found = Some(self.parse_rate(rate_node)?);
                break;
            }
            current = doc.parent(candidate);
        }

        let rate = found
            .or(self.config.default_rate)
            .ok_or_else(|| ReadError::AmbiguousRate { path: doc.path(origin) })?;
        if let Some(id) = doc.attribute(origin, "id") {
            debug!(id, rate, "Resolved rate");
            self.identity.insert_rate(id, rate);
        }
        Ok(rate)
    }

    fn parse_rate(&self, rate_node: NodeId) -> ReadResult<f64> {
        let doc = self.doc;
        let timebase = self.required_number(rate_node, "timebase")?;
        let ntsc = doc
            .child_text(rate_node, "ntsc")
            .map_or(false, |flag| flag.trim().eq_ignore_ascii_case("true"));

        let rate = if timebase.fract() == 0.0 && timebase > 0.0 && timebase <= u32::MAX as f64 {
            FrameRate::new(timebase as u32, ntsc).to_f64()
        } else if ntsc {
            timebase * 1000.0 / 1001.0
        } else {
            timebase
        };
        if !RationalTime::is_valid_rate(rate) {
            return Err(time_error(doc, rate_node, TimeError::invalid_rate(rate)));
        }
        Ok(rate)
    }

    /// Global start time from a `<timecode><frame>`.
    fn timecode(&mut self, node: NodeId) -> ReadResult<Option<RationalTime>> {
        let Some(timecode) = self.doc.child(node, "timecode") else {
            return Ok(None);
        };
        let Some(frame) = self.number(timecode, "frame")? else {
            return Ok(None);
        };
        let rate = self.resolve_rate(timecode)?;
        Ok(Some(RationalTime::new(frame, rate)))
    }

    /// Source range from `<in>`/`<out>`, when both are present.
    fn in_out_range(&self, node: NodeId, rate: f64) -> ReadResult<Option<TimeRange>> {
        match (self.position(node, "in")?, self.position(node, "out")?) {
            (Some(in_point), Some(out_point)) => {
                Ok(Some(self.range(node, in_point, out_point - in_point, rate)?))
            }
            _ => Ok(None),
        }
    }

    fn range(&self, node: NodeId, start: f64, duration: f64, rate: f64) -> ReadResult<TimeRange> {
        TimeRange::try_new(RationalTime::new(start, rate), RationalTime::new(duration, rate))
            .map_err(|source| time_error(self.doc, node, source))
    }

    /// Numeric child value; empty elements count as absent.
    fn number(&self, node: NodeId, field: &str) -> ReadResult<Option<f64>> {
        let doc = self.doc;
        let Some(child) = doc.child(node, field) else {
            return Ok(None);
        };
        let text = doc.text(child).trim();
        if text.is_empty() {
            return Ok(None);
        }
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Some(value)),
            _ => Err(ReadError::malformed(
                doc.path(child),
                format!("expected a finite number, found '{text}'"),
            )),
        }
    }

    fn required_number(&self, node: NodeId, field: &str) -> ReadResult<f64> {
        self.number(node, field)?.ok_or_else(|| {
            ReadError::malformed(
                self.doc.path(node),
                format!("<{}> has no <{field}>", self.doc.name(node)),
            )
        })
    }

    /// A position value; negative values (`-1`) mean "next to a transition".
    fn position(&self, node: NodeId, field: &str) -> ReadResult<Option<f64>> {
        Ok(self.number(node, field)?.filter(|value| *value >= 0.0))
    }

    fn unsupported(&mut self, node: NodeId, feature: impl Into<String>) -> ReadResult<()> {
        let err = ReadError::UnsupportedFeature {
            path: self.doc.path(node),
            feature: feature.into(),
        };
        warn!(error = %err, strict = self.config.strict, "Unsupported xmeml construct");
        if self.config.strict {
            return Err(err);
        }
        self.warnings.push(err);
        Ok(())
    }
}

fn time_error(doc: &Document, node: NodeId, source: TimeError) -> ReadError {
    ReadError::Time {
        path: doc.path(node),
        source,
    }
}

fn model_error(path: String, err: ModelError) -> ReadError {
    match err {
        ModelError::Time(source) => ReadError::Time { path, source },
        other => ReadError::malformed(path, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JUST_SEQUENCE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE xmeml>
<xmeml version="4">
  <sequence id="sequence-1">
    <name>just a sequence</name>
    <duration>300</duration>
    <rate><timebase>30</timebase><ntsc>FALSE</ntsc></rate>
    <media>
      <video>
        <track>
          <clipitem id="clipitem-1">
            <name>first</name>
            <start>10</start><end>110</end><in>0</in><out>100</out>
            <file id="file-1">
              <name>first.mov</name>
              <pathurl>file://localhost/media/first.mov</pathurl>
              <rate><timebase>30</timebase></rate>
              <duration>500</duration>
            </file>
          </clipitem>
          <transitionitem>
            <start>100</start><end>120</end>
            <alignment>center</alignment>
            <effect><name>Cross Dissolve</name><effectid>Cross Dissolve</effectid><effecttype>transition</effecttype></effect>
          </transitionitem>
          <clipitem id="clipitem-2">
            <name>second</name>
            <start>-1</start><end>300</end><in>20</in><out>210</out>
            <file id="file-1"/>
          </clipitem>
        </track>
      </video>
      <audio>
        <track>
          <generatoritem id="generatoritem-1">
            <name>Slug</name>
            <start>0</start><end>50</end><in>0</in><out>50</out>
            <effect><name>Slug</name><effectid>Slug</effectid></effect>
          </generatoritem>
        </track>
      </audio>
    </media>
  </sequence>
</xmeml>"#;

    fn outcome(text: &str) -> ReadOutcome {
        read_with_config(text, &ReaderConfig::default()).unwrap()
    }

    #[test]
    fn test_rate_memo_holds_one_entry() {
        let doc = Document::parse(JUST_SEQUENCE).unwrap();
        let config = ReaderConfig::default();
        let mut reader = XmemlReader::new(&doc, &config);
        let sequence = find_sequence(&doc).unwrap();

        assert_eq!(reader.resolve_rate(sequence).unwrap(), 30.0);
        assert_eq!(reader.resolve_rate(sequence).unwrap(), 30.0);
        assert_eq!(reader.identity.len(), 1);
        assert_eq!(reader.identity.rate("sequence-1"), Some(30.0));
    }

    #[test]
    fn test_gap_and_transition_placement() {
        let timeline = outcome(JUST_SEQUENCE).timeline;
        let video = timeline.video_tracks().next().unwrap();
        let kinds: Vec<_> = video.children().iter().map(Item::kind_name).collect();
        assert_eq!(kinds, vec!["gap", "clip", "transition", "clip"]);

        let gap = video.children()[0].as_gap().unwrap();
        assert_eq!(gap.duration(), RationalTime::new(10.0, 30.0));

        let transition = video.children()[2].as_transition().unwrap();
        assert_eq!(transition.in_offset, RationalTime::new(10.0, 30.0));
        assert_eq!(transition.out_offset, RationalTime::new(10.0, 30.0));
        assert_eq!(transition.transition_type, TransitionType::SmpteDissolve);
        assert_eq!(transition.name.as_deref(), Some("Cross Dissolve"));
        assert_eq!(transition.metadata[NAMESPACE]["effect"]["effecttype"], "transition");

        let ranges = video.range_of_all_children().unwrap();
        assert_eq!(ranges[3].start_time, RationalTime::new(110.0, 30.0));
    }

    #[test]
    fn test_back_referenced_file_is_shared() {
        let timeline = outcome(JUST_SEQUENCE).timeline;
        let clips = timeline.clips();
        let first = clips[0].media_reference();
        let second = clips[1].media_reference();
        assert!(Arc::ptr_eq(first, second));
        assert_eq!(first.target_url(), Some("file://localhost/media/first.mov"));
        assert_eq!(first.name(), Some("first.mov"));
        assert_eq!(
            first.available_range().unwrap().duration,
            RationalTime::new(500.0, 30.0)
        );
    }

    #[test]
    fn test_generator_becomes_missing_clip() {
        let timeline = outcome(JUST_SEQUENCE).timeline;
        let audio = timeline.audio_tracks().next().unwrap();
        let slug = audio.children()[0].as_clip().unwrap();
        assert!(slug.media_reference().is_missing());
        assert_eq!(slug.name.as_deref(), Some("Slug"));
        assert_eq!(slug.metadata[NAMESPACE]["effect"]["effectid"], "Slug");
    }

    #[test]
    fn test_forward_reference() {
        let text = r#"<xmeml version="4"><sequence>
            <rate><timebase>24</timebase></rate>
            <media><video><track>
              <clipitem><name>a</name><start>0</start><end>10</end><in>0</in><out>10</out><file id="file-7"/></clipitem>
              <clipitem><name>b</name><start>10</start><end>20</end><in>0</in><out>10</out>
                <file id="file-7"><pathurl>b.mov</pathurl></file></clipitem>
            </track></video></media></sequence></xmeml>"#;
        let timeline = outcome(text).timeline;
        let clips = timeline.clips();
        assert!(Arc::ptr_eq(clips[0].media_reference(), clips[1].media_reference()));
        assert_eq!(clips[0].media_reference().target_url(), Some("b.mov"));
    }

    #[test]
    fn test_unresolved_reference() {
        let text = r#"<xmeml><sequence><rate><timebase>24</timebase></rate>
            <media><video><track>
              <clipitem><start>0</start><end>10</end><in>0</in><out>10</out><file id="file-9"/></clipitem>
            </track></video></media></sequence></xmeml>"#;
        match read_from_str(text) {
            Err(ReadError::UnresolvedReference { path, id }) => {
                assert_eq!(id, "file-9");
                assert_eq!(path, "/xmeml/sequence[1]/media/video/track[1]/clipitem[1]/file[1]");
            }
            other => panic!("expected unresolved reference, got {other:?}"),
        }
    }

    #[test]
    fn test_ambiguous_rate_and_default() {
        let text = r#"<xmeml><sequence><name>no rate</name>
            <media><video><track>
              <clipitem><start>0</start><end>10</end><in>0</in><out>10</out></clipitem>
            </track></video></media></sequence></xmeml>"#;
        assert!(matches!(read_from_str(text), Err(ReadError::AmbiguousRate { .. })));

        let outcome = read_with_config(text, &ReaderConfig::new().default_rate(25.0)).unwrap();
        let clip = outcome.timeline.clips()[0];
        assert_eq!(clip.source_range.duration.rate, 25.0);
    }

    #[test]
    fn test_sequence_discovery() {
        assert!(matches!(
            read_from_str("<xmeml version=\"4\"></xmeml>"),
            Err(ReadError::MalformedDocument { .. })
        ));
        let two = "<xmeml><sequence><rate><timebase>24</timebase></rate></sequence>\
                   <sequence><rate><timebase>24</timebase></rate></sequence></xmeml>";
        assert!(matches!(read_from_str(two), Err(ReadError::MalformedDocument { .. })));

        let wrapped = "<xmeml><project><children><sequence><name>p</name>\
                       <rate><timebase>24</timebase></rate></sequence></children></project></xmeml>";
        assert_eq!(read_from_str(wrapped).unwrap().name.as_deref(), Some("p"));
    }

    #[test]
    fn test_self_nesting_sequence_is_rejected() {
        let text = r#"<xmeml><sequence id="sequence-1"><rate><timebase>24</timebase></rate>
            <media><video><track>
              <clipitem><start>0</start><end>10</end><in>0</in><out>10</out><sequence id="sequence-1"/></clipitem>
            </track></video></media></sequence></xmeml>"#;
        assert!(matches!(read_from_str(text), Err(ReadError::MalformedDocument { .. })));
    }

    #[test]
    fn test_unsupported_features_warn_or_fail() {
        let text = r#"<xmeml><sequence><rate><timebase>24</timebase></rate>
            <media><video><track>
              <clipitem><name>remapped</name><start>0</start><end>10</end><in>0</in><out>10</out>
                <filter><effect><name>Time Remap</name><effectid>timeremap</effectid></effect></filter>
              </clipitem>
              <clipitem><name>late</name><start>5</start><end>15</end><in>0</in><out>10</out></clipitem>
            </track></video></media></sequence></xmeml>"#;

        let lenient = outcome(text);
        assert_eq!(lenient.warnings.len(), 2);
        assert!(lenient.warnings.iter().all(ReadError::is_recoverable));
        let clips = lenient.timeline.clips();
        assert!(clips[0].metadata[NAMESPACE]["filter"].is_object());
        // The late clip is moved to the cursor; its own placement is kept.
        assert_eq!(
            clips[1].metadata[NAMESPACE][vendor::PLACEMENT_KEY],
            serde_json::json!({ "start": "5", "end": "15" })
        );
        let video = lenient.timeline.video_tracks().next().unwrap();
        assert_eq!(
            video.range_of_child_at_index(1).unwrap().start_time,
            RationalTime::new(10.0, 24.0)
        );

        let strict = read_with_config(text, &ReaderConfig::new().strict(true));
        assert!(matches!(strict, Err(ReadError::UnsupportedFeature { .. })));
    }

    #[test]
    fn test_ntsc_rate() {
        let text = r#"<xmeml><sequence><rate><timebase>30</timebase><ntsc>TRUE</ntsc></rate>
            <media><video><track>
              <clipitem><start>0</start><end>10</end><in>0</in><out>10</out></clipitem>
            </track></video></media></sequence></xmeml>"#;
        let timeline = read_from_str(text).unwrap();
        assert_eq!(timeline.clips()[0].source_range.duration.rate, 30000.0 / 1001.0);
    }

    #[test]
    fn test_markers() {
        let text = r#"<xmeml><sequence><rate><timebase>30</timebase></rate>
            <marker><name>My MArker 1</name><comment>so, this happened</comment><in>113</in><out>-1</out></marker>
            <marker><name></name><comment></comment><in>298</in><out>310</out></marker>
            </sequence></xmeml>"#;
        let timeline = read_from_str(text).unwrap();
        let markers = &timeline.tracks.markers;
        assert_eq!(markers[0].name.as_deref(), Some("My MArker 1"));
        assert_eq!(markers[0].metadata.namespaced_str(NAMESPACE, "comment"), Some("so, this happened"));
        assert!(markers[0].marked_range.duration.is_zero());
        assert!(markers[1].name.is_none());
        assert!(markers[1].metadata.is_empty());
        assert_eq!(markers[1].marked_range.duration, RationalTime::new(12.0, 30.0));
    }
}
