//! Property tests for track positioning.

use proptest::prelude::*;

use cutline_core::{RationalTime, TimeRange};
use cutline_edit::{Clip, Gap, Item, Track, TrackKind};

fn item_strategy() -> impl Strategy<Value = Item> {
    prop_oneof![
        (0u32..5000, 1u32..2000).prop_map(|(start, duration)| {
            Item::from(Clip::new(TimeRange::new(
                RationalTime::new(start as f64, 30.0),
                RationalTime::new(duration as f64, 30.0),
            )))
        }),
        (1u32..2000).prop_map(|duration| Item::from(Gap::new(RationalTime::new(duration as f64, 30.0)))),
    ]
}

proptest! {
    #[test]
    fn duration_is_sum_of_items(items in prop::collection::vec(item_strategy(), 0..40)) {
        let expected: f64 = items.iter().map(|item| item.duration().unwrap().value).sum();
        let track = Track::new(TrackKind::Video).with_children(items);
        prop_assert_eq!(track.duration().unwrap().value, expected);
    }

    #[test]
    fn ranges_tile_the_track(items in prop::collection::vec(item_strategy(), 1..40)) {
        let track = Track::new(TrackKind::Video).with_children(items);
        let ranges = track.range_of_all_children().unwrap();
        for (index, range) in ranges.iter().enumerate() {
            prop_assert_eq!(*range, track.range_of_child_at_index(index).unwrap());
            if index > 0 {
                prop_assert_eq!(ranges[index - 1].end_time_exclusive().unwrap(), range.start_time);
            }
        }
    }

    #[test]
    fn remove_then_insert_restores(items in prop::collection::vec(item_strategy(), 1..20), pick in any::<prop::sample::Index>()) {
        let mut track = Track::new(TrackKind::Audio).with_children(items);
        let original = track.clone();
        let index = pick.index(track.len());
        let removed = track.remove(index).unwrap();
        prop_assert_eq!(track.len(), original.len() - 1);
        track.insert(index, removed).unwrap();
        prop_assert_eq!(track, original);
    }
}
