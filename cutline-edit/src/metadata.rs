//! Free-form metadata attached to every composition node.
//!
//! Keys are namespaced: adapters keep the data they cannot map onto the
//! model under their own top-level key (for example `fcp_xml`).

use serde_json::{Map, Value};

/// Ordered mapping from string keys to arbitrarily nested values.
pub type Metadata = Map<String, Value>;

/// Namespace helpers for [`Metadata`].
pub trait MetadataExt {
    /// The object stored under `namespace`, if there is one.
    fn namespace(&self, namespace: &str) -> Option<&Metadata>;

    /// The object stored under `namespace`, created (or replaced, if the
    /// existing value is not an object) on demand.
    fn namespace_mut(&mut self, namespace: &str) -> &mut Metadata;

    /// A string value inside a namespace.
    fn namespaced_str(&self, namespace: &str, key: &str) -> Option<&str> {
        self.namespace(namespace)?.get(key)?.as_str()
    }
}

impl MetadataExt for Metadata {
    fn namespace(&self, namespace: &str) -> Option<&Metadata> {
        self.get(namespace)?.as_object()
    }

    fn namespace_mut(&mut self, namespace: &str) -> &mut Metadata {
        let entry = self
            .entry(namespace.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        match entry {
            Value::Object(map) => map,
            _ => unreachable!("namespace entry was just made an object"),
        }
    }
}
