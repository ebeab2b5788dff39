//! Preservation of elements the model has no field for.
//!
//! Unrecognized children and attributes are stored under the `fcp_xml`
//! metadata key of the node they belong to. An element becomes a string when
//! it only has text; otherwise an object holding `@attribute` keys, a
//! `#text` key and one key per child name, with repeated children collected
//! into an array. The writer turns the same shape back into elements.

use serde_json::{Map, Value};

use cutline_edit::Metadata;

use crate::dom::{Document, NodeId};
use crate::element::Element;

/// Metadata namespace used for dialect-specific data.
pub const NAMESPACE: &str = "fcp_xml";

const TEXT_KEY: &str = "#text";

/// Key holding the `<start>`/`<end>` of an item the reader had to move.
pub(crate) const PLACEMENT_KEY: &str = "placement";

const PLACEMENT_FIELDS: [&str; 2] = ["start", "end"];

/// Convert one element to its JSON form.
pub(crate) fn element_to_value(doc: &Document, id: NodeId) -> Value {
    let node = doc.node(id);
    if node.attributes.is_empty() && node.children.is_empty() {
        return Value::String(node.text.clone());
    }

    let mut object = Map::new();
    for (key, value) in &node.attributes {
        object.insert(format!("@{key}"), Value::String(value.clone()));
    }
    if !node.text.is_empty() {
        object.insert(TEXT_KEY.to_string(), Value::String(node.text.clone()));
    }
    for child in doc.children(id) {
        insert_repeated(&mut object, doc.name(child), element_to_value(doc, child));
    }
    Value::Object(object)
}

/// Collect the attributes and children of `id` that the reader does not map
/// onto the model. The `id` attribute is identity, not data, and is skipped.
pub(crate) fn extras(doc: &Document, id: NodeId, recognized: &[&str]) -> Metadata {
    let mut object = Map::new();
    for (key, value) in &doc.node(id).attributes {
        if key != "id" {
            object.insert(format!("@{key}"), Value::String(value.clone()));
        }
    }
    for child in doc.children(id) {
        let name = doc.name(child);
        if !recognized.contains(&name) {
            insert_repeated(&mut object, name, element_to_value(doc, child));
        }
    }
    object
}

/// The `<start>`/`<end>` children of `id` as written in the document.
pub(crate) fn placement(doc: &Document, id: NodeId) -> Metadata {
    PLACEMENT_FIELDS
        .iter()
        .filter_map(|&field| Some((field.to_string(), element_to_value(doc, doc.child(id, field)?))))
        .collect()
}

/// Write `<start>`/`<end>`, taking each from `preserved` when it is there.
pub(crate) fn apply_placement(
    element: &mut Element,
    preserved: &Metadata,
    computed: [i64; 2],
) {
    for (field, frames) in PLACEMENT_FIELDS.into_iter().zip(computed) {
        match preserved.get(field) {
            Some(value) => element.children.extend(value_to_elements(field, value)),
            None => element.push_text(field, frames),
        }
    }
}

fn insert_repeated(object: &mut Map<String, Value>, key: &str, value: Value) {
    match object.get_mut(key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            object.insert(key.to_string(), value);
        }
    }
}

/// Store `extras` under the namespace key, leaving `metadata` untouched when
/// there is nothing to keep.
pub(crate) fn attach(metadata: &mut Metadata, extras: Metadata) {
    if !extras.is_empty() {
        metadata.insert(NAMESPACE.to_string(), Value::Object(extras));
    }
}

/// Elements for one JSON value stored under `name`.
pub(crate) fn value_to_elements(name: &str, value: &Value) -> Vec<Element> {
    match value {
        Value::Array(items) => items
            .iter()
            .flat_map(|item| value_to_elements(name, item))
            .collect(),
        Value::Object(object) => {
            let mut element = Element::new(name);
            apply(&mut element, object, &[]);
            vec![element]
        }
        Value::String(text) => vec![Element::text_node(name, text)],
        Value::Null => vec![Element::new(name)],
        other => vec![Element::text_node(name, other)],
    }
}

/// Write preserved attributes, text and children into `element`, skipping
/// the keys in `skip` (the ones the caller writes itself).
pub(crate) fn apply(element: &mut Element, extras: &Metadata, skip: &[&str]) {
    for (key, value) in extras {
        if skip.contains(&key.as_str()) {
            continue;
        }
        if let Some(attribute) = key.strip_prefix('@') {
            element.attributes.push((attribute.to_string(), scalar_text(value)));
        } else if key == TEXT_KEY {
            element.text = Some(scalar_text(value));
        } else {
            element.children.extend(value_to_elements(key, value));
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CLIP: &str = r#"<clipitem id="clipitem-4" frameBlend="FALSE">
        <name>shot</name>
        <enabled>TRUE</enabled>
        <link><linkclipref>clipitem-4</linkclipref><mediatype>video</mediatype></link>
        <link><linkclipref>clipitem-9</linkclipref><mediatype>audio</mediatype></link>
        <labels><label2>Iris</label2></labels>
        <comments/>
    </clipitem>"#;

    fn parsed() -> (Document, NodeId) {
        let doc = Document::parse(CLIP).unwrap();
        let root = doc.root();
        (doc, root)
    }

    #[test]
    fn test_extras_shape() {
        let (doc, root) = parsed();
        let extras = extras(&doc, root, &["name"]);
        assert_eq!(
            Value::Object(extras),
            json!({
                "@frameBlend": "FALSE",
                "enabled": "TRUE",
                "link": [
                    { "linkclipref": "clipitem-4", "mediatype": "video" },
                    { "linkclipref": "clipitem-9", "mediatype": "audio" }
                ],
                "labels": { "label2": "Iris" },
                "comments": ""
            })
        );
    }

    #[test]
    fn test_extras_survive_a_write() {
        let (doc, root) = parsed();
        let first = extras(&doc, root, &["name"]);

        let mut element = Element::new("clipitem");
        element.push_text("name", "shot");
        apply(&mut element, &first, &[]);
        let text = crate::element::emit_document(&element, &crate::WriterConfig::default()).unwrap();

        let reparsed = Document::parse(&text).unwrap();
        let second = extras(&reparsed, reparsed.root(), &["name"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_attach_skips_empty() {
        let mut metadata = Metadata::new();
        attach(&mut metadata, Metadata::new());
        assert!(metadata.is_empty());
        let mut extras = Metadata::new();
        extras.insert("enabled".into(), json!("TRUE"));
        attach(&mut metadata, extras);
        assert_eq!(metadata[NAMESPACE]["enabled"], "TRUE");
    }
}
