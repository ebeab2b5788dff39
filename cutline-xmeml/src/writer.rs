//! Writing timelines as xmeml documents.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use cutline_core::{rate_for_range, FrameRate, RationalTime, TimeRange};
use cutline_edit::{
    format_path, Clip, Item, Marker, MediaReference, Metadata, MetadataExt, Stack, Timeline, Track,
    TrackKind, Transition, TransitionType,
};

use crate::config::WriterConfig;
use crate::element::{emit_document, Element};
use crate::error::{WriteError, WriteResult};
use crate::identity::BackReferenceMap;
use crate::reader::DISSOLVE_EFFECT_ID;
use crate::vendor::{self, NAMESPACE};

/// Sequence rate used when the timeline holds no clips.
const DEFAULT_RATE: f64 = 30.0;

/// Write a timeline with the default configuration.
pub fn write_to_string(timeline: &Timeline) -> WriteResult<String> {
    write_with_config(timeline, &WriterConfig::default())
}

/// Write a timeline as a complete xmeml document.
pub fn write_with_config(timeline: &Timeline, config: &WriterConfig) -> WriteResult<String> {
    let rate = config
        .sequence_rate
        .or_else(|| first_clip_rate(&timeline.tracks))
        .unwrap_or(DEFAULT_RATE);

    let mut writer = XmemlWriter {
        ids: BackReferenceMap::new(),
    };
    let mut path = Vec::new();
    let sequence = writer.sequence(
        &timeline.tracks,
        timeline.name.as_deref().or(timeline.tracks.name.as_deref()),
        rate,
        timeline.global_start_time,
        timeline.metadata.namespace(NAMESPACE),
        &mut path,
    )?;

    let mut root = Element::new("xmeml").with_attribute("version", config.xmeml_version.as_str());
    root.push(sequence);
    let text = emit_document(&root, config)?;

    debug!(
        name = timeline.name.as_deref().unwrap_or(""),
        rate,
        ids = writer.ids.len(),
        bytes = text.len(),
        "Wrote xmeml timeline"
    );
    Ok(text)
}

/// Rate of the first clip in depth-first order.
fn first_clip_rate(stack: &Stack) -> Option<f64> {
    stack
        .children()
        .iter()
        .flat_map(|track| track.children())
        .find_map(|item| match item {
            Item::Clip(clip) => Some(rate_for_range(&clip.source_range)),
            Item::Stack(nested) => first_clip_rate(nested),
            _ => None,
        })
}

struct XmemlWriter {
    ids: BackReferenceMap,
}

impl XmemlWriter {
    fn sequence(
        &mut self,
        stack: &Stack,
        name: Option<&str>,
        rate: f64,
        start: Option<RationalTime>,
        extras: Option<&Metadata>,
        path: &mut Vec<usize>,
    ) -> WriteResult<Element> {
        let mut element = Element::new("sequence").with_attribute("id", self.ids.mint("sequence"));
        if let Some(name) = name {
            element.push_text("name", name);
        }
        element.push_text("duration", frames(stack.duration()?, rate, path)?);
        element.push(rate_element(rate, path)?);
        if let Some(start) = start {
            element.push(timecode_element(start, path)?);
        }

        let media_extras = stack
            .metadata
            .namespace(NAMESPACE)
            .and_then(|ns| ns.get("media"))
            .and_then(Value::as_object);

        let mut media = Element::new("media");
        for (group_name, kind) in [("video", TrackKind::Video), ("audio", TrackKind::Audio)] {
            let mut group = Element::new(group_name);
            for (index, track) in stack.children().iter().enumerate() {
                if track.kind != kind {
                    continue;
                }
                path.push(index);
                let written = self.track(track, rate, path);
                path.pop();
                group.push(written?);
            }
            if let Some(group_extras) = media_extras
                .and_then(|extras| extras.get(group_name))
                .and_then(Value::as_object)
            {
                vendor::apply(&mut group, group_extras, &[]);
            }
            media.push(group);
        }
        if let Some(media_extras) = media_extras {
            vendor::apply(&mut media, media_extras, &["video", "audio"]);
        }
        element.push(media);

        for marker in &stack.markers {
            element.push(marker_element(marker, rate, path)?);
        }
        if let Some(extras) = extras {
            vendor::apply(&mut element, extras, &[]);
        }
        Ok(element)
    }

    fn track(&mut self, track: &Track, rate: f64, path: &mut Vec<usize>) -> WriteResult<Element> {
        let mut element = Element::new("track");
        if let Some(name) = &track.name {
            element.push_text("name", name);
        }

        for (index, item) in track.children().iter().enumerate() {
            if has_negative_length(item)? {
                path.push(index);
                let err = negative_duration(path);
                path.pop();
                return Err(err);
            }
        }

        let placements = track.range_of_all_children()?;
        let misplaced = track
            .children()
            .iter()
            .zip(&placements)
            .position(|(item, placement)| item.is_transition() && placement.start_time.is_negative());
        if let Some(index) = misplaced {
            path.push(index);
            let err = WriteError::TransitionBeforeStart { path: location(path) };
            path.pop();
            return Err(err);
        }

        for (index, (item, placement)) in track.children().iter().zip(placements).enumerate() {
            path.push(index);
            let written = match item {
                Item::Gap(_) => Ok(None),
                Item::Clip(clip) => self.clip(clip, placement, rate, path).map(Some),
                Item::Stack(stack) => self.nested(stack, placement, rate, path).map(Some),
                Item::Transition(transition) => {
                    let id = self.ids.mint("transitionitem");
                    transition_element(transition, id, placement, rate, path).map(Some)
                }
            };
            path.pop();
            if let Some(child) = written? {
                element.push(child);
            }
        }

        for marker in &track.markers {
            element.push(marker_element(marker, rate, path)?);
        }
        if let Some(extras) = track.metadata.namespace(NAMESPACE) {
            vendor::apply(&mut element, extras, &[]);
        }
        Ok(element)
    }

    fn clip(
        &mut self,
        clip: &Clip,
        placement: TimeRange,
        sequence_rate: f64,
        path: &[usize],
    ) -> WriteResult<Element> {
        let rate = rate_for_range(&clip.source_range);
        let extras = clip.metadata.namespace(NAMESPACE);
        // A generator has no file; its effect lives in the preserved data.
        let is_generator = clip.media_reference().is_missing()
            && extras.map_or(false, |extras| extras.contains_key("effect"));
        let kind = if is_generator { "generatoritem" } else { "clipitem" };

        let mut element = Element::new(kind).with_attribute("id", self.ids.mint(kind));
        if let Some(name) = &clip.name {
            element.push_text("name", name);
        }
        element.push_text("duration", frames(clip.source_range.duration, rate, path)?);
        element.push(rate_element(rate, path)?);
        push_item_placement(&mut element, placement, extras, sequence_rate, path)?;
        push_in_out(&mut element, &clip.source_range, rate, path)?;

        if !is_generator {
            if let Some(file) = self.file(clip.media_reference(), path)? {
                element.push(file);
            }
        }
        for marker in &clip.markers {
            element.push(marker_element(marker, rate, path)?);
        }
        if let Some(extras) = extras {
            vendor::apply(&mut element, extras, &[vendor::PLACEMENT_KEY]);
        }
        trace!(kind, path = %format_path(path), "Wrote clip");
        Ok(element)
    }

    /// A nested stack becomes a clipitem wrapping its own sequence.
    fn nested(
        &mut self,
        stack: &Stack,
        placement: TimeRange,
        sequence_rate: f64,
        path: &mut Vec<usize>,
    ) -> WriteResult<Element> {
        let rate = first_clip_rate(stack).unwrap_or(sequence_rate);
        let extras = stack.metadata.namespace(NAMESPACE);

        let mut element = Element::new("clipitem").with_attribute("id", self.ids.mint("clipitem"));
        if let Some(name) = &stack.name {
            element.push_text("name", name);
        }
        element.push_text("duration", frames(stack.duration()?, rate, path)?);
        element.push(rate_element(rate, path)?);
        push_item_placement(&mut element, placement, extras, sequence_rate, path)?;
        if let Some(range) = &stack.source_range {
            push_in_out(&mut element, range, rate, path)?;
        }

        let sequence_extras = extras
            .and_then(|extras| extras.get("sequence"))
            .and_then(Value::as_object);
        let sequence = self.sequence(stack, stack.name.as_deref(), rate, None, sequence_extras, path)?;
        element.push(sequence);

        if let Some(extras) = extras {
            vendor::apply(&mut element, extras, &["media", "sequence", vendor::PLACEMENT_KEY]);
        }
        trace!(path = %format_path(path), tracks = stack.len(), "Wrote nested sequence");
        Ok(element)
    }

    /// The first use of a reference defines the `<file>`; later uses point
    /// back at its id. An anonymous missing reference writes nothing.
    fn file(&mut self, media: &Arc<MediaReference>, path: &[usize]) -> WriteResult<Option<Element>> {
        if let Some(id) = self.ids.file_id(media) {
            return Ok(Some(Element::new("file").with_attribute("id", id)));
        }
        if let MediaReference::Missing { name: None, metadata } = media.as_ref() {
            if metadata.namespace(NAMESPACE).is_none() {
                return Ok(None);
            }
        }

        let mut element = Element::new("file").with_attribute("id", self.ids.register_file(media));
        if let Some(name) = media.name() {
            element.push_text("name", name);
        }
        if let Some(url) = media.target_url() {
            element.push_text("pathurl", url);
        }
        if let Some(range) = media.available_range() {
            let rate = rate_for_range(range);
            element.push(rate_element(rate, path)?);
            element.push_text("duration", frames(range.duration, rate, path)?);
            if !range.start_time.is_zero() {
                element.push(timecode_element(range.start_time, path)?);
            }
        }
        if let Some(extras) = media.metadata().namespace(NAMESPACE) {
            vendor::apply(&mut element, extras, &[]);
        }
        Ok(Some(element))
    }
}

fn transition_element(
    transition: &Transition,
    id: String,
    placement: TimeRange,
    rate: f64,
    path: &[usize],
) -> WriteResult<Element> {
    let mut element = Element::new("transitionitem").with_attribute("id", id);
    push_placement(&mut element, placement, rate, path)?;

    let alignment = if transition.in_offset.is_zero() {
        "start"
    } else if transition.out_offset.is_zero() {
        "end"
    } else {
        "center"
    };
    element.push_text("alignment", alignment);
    element.push(rate_element(rate, path)?);

    let extras = transition.metadata.namespace(NAMESPACE);
    let mut effect = Element::new("effect");
    if let Some(name) = &transition.name {
        effect.push_text("name", name);
    }
    let effect_id = match &transition.transition_type {
        TransitionType::SmpteDissolve => DISSOLVE_EFFECT_ID,
        TransitionType::Custom(id) => id.as_str(),
    };
    effect.push_text("effectid", effect_id);
    if let Some(effect_extras) = extras
        .and_then(|extras| extras.get("effect"))
        .and_then(Value::as_object)
    {
        vendor::apply(&mut effect, effect_extras, &[]);
    }
    element.push(effect);

    for marker in &transition.markers {
        element.push(marker_element(marker, rate, path)?);
    }
    if let Some(extras) = extras {
        vendor::apply(&mut element, extras, &["effect"]);
    }
    Ok(element)
}

fn marker_element(marker: &Marker, rate: f64, path: &[usize]) -> WriteResult<Element> {
    let range = marker.marked_range;
    if range.duration.is_negative() {
        return Err(negative_duration(path));
    }

    let mut element = Element::new("marker");
    element.push_text("name", marker.name.as_deref().unwrap_or(""));
    element.push_text(
        "comment",
        marker.metadata.namespaced_str(NAMESPACE, "comment").unwrap_or(""),
    );
    element.push_text("in", frames(range.start_time, rate, path)?);
    // Zero-length markers are point markers.
    let out = if range.duration.is_zero() {
        -1
    } else {
        frames(range.end_time_exclusive()?, rate, path)?
    };
    element.push_text("out", out);

    if let Some(extras) = marker.metadata.namespace(NAMESPACE) {
        vendor::apply(&mut element, extras, &["comment"]);
    }
    Ok(element)
}

fn push_placement(element: &mut Element, placement: TimeRange, rate: f64, path: &[usize]) -> WriteResult<()> {
    element.push_text("start", frames(placement.start_time, rate, path)?);
    element.push_text("end", frames(placement.end_time_exclusive()?, rate, path)?);
    Ok(())
}

/// Track placement of a clip or nested sequence. A placement the reader
/// had to move is written back as it was read.
fn push_item_placement(
    element: &mut Element,
    placement: TimeRange,
    extras: Option<&Metadata>,
    rate: f64,
    path: &[usize],
) -> WriteResult<()> {
    let preserved = extras
        .and_then(|extras| extras.get(vendor::PLACEMENT_KEY))
        .and_then(Value::as_object);
    match preserved {
        Some(preserved) => {
            let computed = [
                frames(placement.start_time, rate, path)?,
                frames(placement.end_time_exclusive()?, rate, path)?,
            ];
            vendor::apply_placement(element, preserved, computed);
            Ok(())
        }
        None => push_placement(element, placement, rate, path),
    }
}

fn push_in_out(element: &mut Element, range: &TimeRange, rate: f64, path: &[usize]) -> WriteResult<()> {
    element.push_text("in", frames(range.start_time, rate, path)?);
    element.push_text("out", frames(range.end_time_exclusive()?, rate, path)?);
    Ok(())
}

fn rate_element(rate: f64, path: &[usize]) -> WriteResult<Element> {
    let frame_rate = FrameRate::from_f64(rate).map_err(|_| WriteError::UnsupportedRate {
        path: location(path),
        rate,
    })?;
    let mut element = Element::new("rate");
    element.push_text("timebase", frame_rate.timebase);
    element.push_text("ntsc", if frame_rate.ntsc { "TRUE" } else { "FALSE" });
    Ok(element)
}

fn timecode_element(start: RationalTime, path: &[usize]) -> WriteResult<Element> {
    let frame_rate = FrameRate::from_f64(start.rate).map_err(|_| WriteError::UnsupportedRate {
        path: location(path),
        rate: start.rate,
    })?;
    let frame = frames(start, start.rate, path)?;

    let mut element = Element::new("timecode");
    element.push(rate_element(start.rate, path)?);
    element.push_text("string", timecode_string(frame, frame_rate.timebase));
    element.push_text("frame", frame);
    element.push_text("displayformat", "NDF");
    Ok(element)
}

fn timecode_string(frame: i64, timebase: u32) -> String {
    let timebase = i64::from(timebase.max(1));
    let seconds = frame / timebase;
    format!(
        "{:02}:{:02}:{:02}:{:02}",
        seconds / 3600,
        seconds / 60 % 60,
        seconds % 60,
        frame % timebase
    )
}

/// Whole frames of `time` at `rate`; negative values are rejected.
fn frames(time: RationalTime, rate: f64, path: &[usize]) -> WriteResult<i64> {
    if time.is_negative() {
        return Err(negative_duration(path));
    }
    Ok(time.to_frames(rate)?)
}

fn has_negative_length(item: &Item) -> WriteResult<bool> {
    Ok(match item {
        Item::Transition(transition) => {
            transition.in_offset.is_negative() || transition.out_offset.is_negative()
        }
        other => other.duration()?.is_negative(),
    })
}

fn negative_duration(path: &[usize]) -> WriteError {
    WriteError::NegativeDuration {
        path: location(path),
    }
}

fn location(path: &[usize]) -> String {
    if path.is_empty() {
        "timeline".to_string()
    } else {
        format_path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_from_str;
    use cutline_edit::{Gap, MarkerColor};
    use serde_json::json;

    fn range(start: f64, duration: f64, rate: f64) -> TimeRange {
        TimeRange::new(RationalTime::new(start, rate), RationalTime::new(duration, rate))
    }

    fn sample() -> Timeline {
        let shared = MediaReference::external("file:///var/tmp/shared.mov")
            .with_available_range(range(0.0, 1000.0, 24.0))
            .shared();

        let mut video = Track::new(TrackKind::Video).named("V1");
        video.append(Clip::new(range(0.0, 48.0, 24.0)).named("a").with_media(Arc::clone(&shared)));
        video.append(Transition::dissolve(RationalTime::new(6.0, 24.0), RationalTime::new(6.0, 24.0)));
        video.append(Clip::new(range(100.0, 24.0, 24.0)).named("b").with_media(shared));
        video.append(Gap::new(RationalTime::new(12.0, 24.0)));
        video.append(
            Clip::new(range(0.0, 24.0, 24.0))
                .named("c")
                .with_marker(Marker::at(RationalTime::new(5.0, 24.0)).named("hit")),
        );

        let mut timeline = Timeline::new("sample");
        timeline.tracks.append(video);
        timeline.tracks.append(Track::new(TrackKind::Audio));
        timeline
    }

    #[test]
    fn test_positions_and_back_references() {
        let text = write_to_string(&sample()).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("<!DOCTYPE xmeml>"));
        assert!(text.contains("<xmeml version=\"4\">"));
        assert!(text.contains("<timebase>24</timebase>"));
        assert!(text.contains("<file id=\"file-1\">"));
        assert!(text.contains("<file id=\"file-1\"/>"));
        // Transition straddles the cut at 48.
        assert!(text.contains("<start>42</start>"));
        assert!(text.contains("<end>54</end>"));
        assert!(text.contains("<alignment>center</alignment>"));
        assert!(text.contains("<effectid>Cross Dissolve</effectid>"));
        // Clip after the gap starts at 48 + 24 + 12.
        assert!(text.contains("<start>84</start>"));
        assert!(text.contains("<out>-1</out>"));
    }

    #[test]
    fn test_round_trip_through_reader() {
        let original = sample();
        let reread = read_from_str(&write_to_string(&original).unwrap()).unwrap();

        assert_eq!(reread.name.as_deref(), Some("sample"));
        let video = reread.video_tracks().next().unwrap();
        let kinds: Vec<_> = video.children().iter().map(Item::kind_name).collect();
        assert_eq!(kinds, vec!["clip", "transition", "clip", "gap", "clip"]);

        let clips = reread.clips();
        assert!(Arc::ptr_eq(clips[0].media_reference(), clips[1].media_reference()));
        assert!(clips[2].media_reference().is_missing());
        assert_eq!(clips[2].markers[0].name.as_deref(), Some("hit"));
        assert_eq!(clips[2].markers[0].color, MarkerColor::Red);
        assert_eq!(reread.duration().unwrap(), original.duration().unwrap());
    }

    #[test]
    fn test_negative_duration_reports_path() {
        let mut timeline = sample();
        let track = timeline.tracks.get_mut(0).unwrap();
        track.append(Gap::with_range(TimeRange::new(
            RationalTime::zero(24.0),
            RationalTime::new(-3.0, 24.0),
        )));
        match write_to_string(&timeline) {
            Err(WriteError::NegativeDuration { path }) => assert_eq!(path, "tracks[0]/children[5]"),
            other => panic!("expected negative duration, got {other:?}"),
        }
    }

    #[test]
    fn test_leading_transition_is_rejected() {
        let mut track = Track::new(TrackKind::Video);
        track.append(Transition::dissolve(RationalTime::new(6.0, 24.0), RationalTime::new(6.0, 24.0)));
        track.append(Clip::new(range(0.0, 48.0, 24.0)));
        let mut timeline = Timeline::new("leading");
        timeline.tracks.append(track);

        assert!(matches!(
            timeline.validate(),
            Err(cutline_edit::ModelError::TransitionBeforeStart { .. })
        ));
        match write_to_string(&timeline) {
            Err(WriteError::TransitionBeforeStart { path }) => assert_eq!(path, "tracks[0]/children[0]"),
            other => panic!("expected a misplaced transition, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_rate() {
        let mut timeline = Timeline::new("odd");
        let mut track = Track::new(TrackKind::Video);
        track.append(Clip::new(range(0.0, 10.0, 23.5)));
        timeline.tracks.append(track);
        assert!(matches!(
            write_to_string(&timeline),
            Err(WriteError::UnsupportedRate { rate, .. }) if rate == 23.5
        ));
    }

    #[test]
    fn test_generator_and_preserved_data() {
        let mut slug = Clip::new(range(0.0, 30.0, 30.0)).named("Slug");
        slug.metadata.insert(
            NAMESPACE.into(),
            json!({ "effect": { "name": "Slug", "effectid": "Slug" }, "enabled": "TRUE" }),
        );
        let mut track = Track::new(TrackKind::Video);
        track.append(slug);
        let mut timeline = Timeline::new("gen");
        timeline.tracks.append(track);
        timeline.metadata.insert(NAMESPACE.into(), json!({ "@MZ.Sequence.PreviewFrameSizeHeight": "720", "uuid": "abc" }));

        let text = write_to_string(&timeline).unwrap();
        assert!(text.contains("<generatoritem id=\"generatoritem-1\">"));
        assert!(!text.contains("<file"));
        assert!(text.contains("<enabled>TRUE</enabled>"));
        assert!(text.contains("<uuid>abc</uuid>"));
        assert!(text.contains("MZ.Sequence.PreviewFrameSizeHeight=\"720\""));

        let reread = read_from_str(&text).unwrap();
        assert_eq!(reread.metadata, timeline.metadata);
        assert_eq!(reread.clips()[0].metadata, timeline.clips()[0].metadata);
    }

    #[test]
    fn test_timecode() {
        assert_eq!(timecode_string(86_400 + 3, 24), "01:00:00:03");
        let timeline = Timeline::new("tc").with_global_start_time(RationalTime::new(86_400.0, 24.0));
        let text = write_to_string(&timeline).unwrap();
        assert!(text.contains("<string>01:00:00:00</string>"));
        let reread = read_from_str(&text).unwrap();
        assert_eq!(reread.global_start_time, Some(RationalTime::new(86_400.0, 24.0)));
    }
}
