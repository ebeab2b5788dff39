//! Per-call identity bookkeeping for the reader and the writer.

use std::collections::HashMap;
use std::sync::Arc;

use cutline_edit::{MediaReference, Metadata, Stack};

/// Values already resolved for identified elements during one read.
///
/// Keys are the document's `id` attributes. Back-references resolve through
/// this map so every clip referencing `file-1` shares one
/// `Arc<MediaReference>`, and a nested sequence is only parsed once.
#[derive(Debug, Default)]
pub struct IdentityMap {
    rates: HashMap<String, f64>,
    media: HashMap<String, Arc<MediaReference>>,
    sequences: HashMap<String, (Stack, Metadata)>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rate(&self, id: &str) -> Option<f64> {
        self.rates.get(id).copied()
    }

    pub fn media(&self, id: &str) -> Option<&Arc<MediaReference>> {
        self.media.get(id)
    }

    pub fn sequence(&self, id: &str) -> Option<&Stack> {
        self.sequences.get(id).map(|(stack, _)| stack)
    }

    /// Number of memoized entries across all kinds.
    pub fn len(&self) -> usize {
        self.rates.len() + self.media.len() + self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn insert_rate(&mut self, id: &str, rate: f64) {
        self.rates.insert(id.to_string(), rate);
    }

    pub(crate) fn insert_media(&mut self, id: &str, media: Arc<MediaReference>) {
        self.media.insert(id.to_string(), media);
    }

    pub(crate) fn insert_sequence(&mut self, id: &str, stack: Stack, extras: Metadata) {
        self.sequences.insert(id.to_string(), (stack, extras));
    }

    pub(crate) fn sequence_with_extras(&self, id: &str) -> Option<&(Stack, Metadata)> {
        self.sequences.get(id)
    }
}

/// Identifiers handed out during one write.
///
/// Each element kind has its own counter (`clipitem-1`, `clipitem-2`, ...).
/// Media references are keyed by `Arc` identity: the first clip to use a
/// reference gets the defining `<file>`, later clips get a reference to its
/// id. Two distinct references with equal content still get distinct ids.
///
/// The map holds a clone of every registered `Arc`, so an address it has
/// seen cannot be reused by another reference while the map exists.
#[derive(Debug, Default)]
pub struct BackReferenceMap {
    counters: HashMap<String, usize>,
    files: HashMap<usize, (Arc<MediaReference>, String)>,
}

impl BackReferenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next identifier for `kind`.
    pub fn mint(&mut self, kind: &str) -> String {
        let counter = self.counters.entry(kind.to_string()).or_insert(0);
        *counter += 1;
        format!("{kind}-{counter}")
    }

    /// Id already assigned to this exact reference, if any.
    pub fn file_id(&self, media: &Arc<MediaReference>) -> Option<&str> {
        self.files.get(&media_key(media)).map(|(_, id)| id.as_str())
    }

    /// Assign a fresh file id to `media`.
    pub fn register_file(&mut self, media: &Arc<MediaReference>) -> String {
        let id = self.mint("file");
        self.files
            .insert(media_key(media), (Arc::clone(media), id.clone()));
        id
    }

    /// Number of identifiers minted so far.
    pub fn len(&self) -> usize {
        self.counters.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn media_key(media: &Arc<MediaReference>) -> usize {
    Arc::as_ptr(media) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_per_kind() {
        let mut map = BackReferenceMap::new();
        assert_eq!(map.mint("clipitem"), "clipitem-1");
        assert_eq!(map.mint("clipitem"), "clipitem-2");
        assert_eq!(map.mint("sequence"), "sequence-1");
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_equal_references_get_distinct_ids() {
        let mut map = BackReferenceMap::new();
        let first = MediaReference::external("/var/tmp/test1.mov").shared();
        let second = MediaReference::external("/var/tmp/test1.mov").shared();
        assert_eq!(first, second);

        let first_id = map.register_file(&first);
        assert!(map.file_id(&second).is_none());
        let second_id = map.register_file(&second);

        assert_ne!(first_id, second_id);
        assert_eq!(map.file_id(&first), Some(first_id.as_str()));
        assert_eq!(map.file_id(&first.clone()), Some(first_id.as_str()));
    }

    #[test]
    fn test_registered_reference_outlives_caller() {
        let mut map = BackReferenceMap::new();
        let id = {
            let dropped = MediaReference::external("/var/tmp/gone.mov").shared();
            map.register_file(&dropped)
        };
        // The map's clone keeps the old allocation, so a new reference
        // never lands on the registered address.
        let fresh = MediaReference::external("/var/tmp/new.mov").shared();
        assert!(map.file_id(&fresh).is_none());
        assert_ne!(map.register_file(&fresh), id);
    }

    #[test]
    fn test_identity_map_counts_entries() {
        let mut map = IdentityMap::new();
        assert!(map.is_empty());
        map.insert_rate("sequence-1", 30.0);
        map.insert_rate("sequence-1", 30.0);
        map.insert_media("file-1", MediaReference::missing().shared());
        map.insert_sequence("sequence-2", Stack::new().named("inner"), Metadata::new());
        assert_eq!(map.len(), 3);
        assert_eq!(map.rate("sequence-1"), Some(30.0));
        assert_eq!(map.sequence("sequence-2").and_then(|s| s.name.as_deref()), Some("inner"));
        assert!(map.media("file-2").is_none());
    }
}
