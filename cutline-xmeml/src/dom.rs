//! A read-only element arena built from the document text.
//!
//! Reading needs random access (parent lookups for rate inheritance, jumps to
//! the element defining a back-referenced id), so the event stream is folded
//! into an arena of nodes first.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ReadError, ReadResult};

pub(crate) type NodeId = usize;

/// Elements whose position among same-named siblings is shown in paths.
const INDEXED: &[&str] = &[
    "sequence",
    "track",
    "clipitem",
    "generatoritem",
    "transitionitem",
    "marker",
    "file",
    "filter",
];

#[derive(Debug)]
pub(crate) struct Node {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

#[derive(Debug)]
pub(crate) struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    /// `(element name, id)` to the element carrying the content.
    definitions: HashMap<(String, String), NodeId>,
}

impl Document {
    pub fn parse(text: &str) -> ReadResult<Self> {
        // Leaf text is kept verbatim; names may carry meaningful spaces.
        let mut reader = Reader::from_str(text);

        let mut nodes: Vec<Node> = Vec::new();
        let mut open: Vec<NodeId> = Vec::new();
        let mut root = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let id = push_node(&mut nodes, &e, open.last().copied(), &mut root)?;
                    open.push(id);
                }
                Event::Empty(e) => {
                    push_node(&mut nodes, &e, open.last().copied(), &mut root)?;
                }
                Event::End(_) => {
                    if let Some(closed) = open.pop() {
                        drop_layout_text(&mut nodes[closed]);
                    }
                }
                Event::Text(e) => {
                    if let Some(&current) = open.last() {
                        nodes[current].text.push_str(&e.unescape()?);
                    }
                }
                Event::CData(e) => {
                    if let Some(&current) = open.last() {
                        nodes[current]
                            .text
                            .push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(&unclosed) = open.last() {
            return Err(ReadError::malformed(
                format!("/{}", nodes[unclosed].name),
                "unexpected end of document",
            ));
        }
        let root = root.ok_or_else(|| ReadError::malformed("/", "document has no root element"))?;

        let mut document = Self {
            nodes,
            root,
            definitions: HashMap::new(),
        };
        document.index_definitions();
        Ok(document)
    }

    fn index_definitions(&mut self) {
        for (index, node) in self.nodes.iter().enumerate() {
            if !has_content(node) {
                continue;
            }
            if let Some((_, id)) = node.attributes.iter().find(|(key, _)| key == "id") {
                self.definitions
                    .entry((node.name.clone(), id.clone()))
                    .or_insert(index);
            }
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id].name
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id].children.iter().copied()
    }

    pub fn child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id).find(|&child| self.nodes[child].name == name)
    }

    pub fn children_named<'a>(&'a self, id: NodeId, name: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.children(id).filter(move |&child| self.nodes[child].name == name)
    }

    pub fn text(&self, id: NodeId) -> &str {
        &self.nodes[id].text
    }

    pub fn child_text(&self, id: NodeId, name: &str) -> Option<&str> {
        self.child(id, name).map(|child| self.text(child))
    }

    pub fn attribute(&self, id: NodeId, key: &str) -> Option<&str> {
        self.nodes[id]
            .attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.as_str())
    }

    /// The element defining `id`'s content.
    ///
    /// An element with an `id` attribute and no content is a back-reference
    /// to the element of the same name and id that has content.
    pub fn definition(&self, id: NodeId) -> ReadResult<NodeId> {
        let node = &self.nodes[id];
        let Some(reference) = self.attribute(id, "id") else {
            return Ok(id);
        };
        if has_content(node) {
            return Ok(id);
        }
        self.definitions
            .get(&(node.name.clone(), reference.to_string()))
            .copied()
            .ok_or_else(|| ReadError::UnresolvedReference {
                path: self.path(id),
                id: reference.to_string(),
            })
    }

    /// Slash-separated location of an element, e.g.
    /// `/xmeml/sequence[1]/media/video/track[2]`.
    pub fn path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id];
            let segment = match node.parent {
                Some(parent) if INDEXED.contains(&node.name.as_str()) => {
                    let position = self.nodes[parent]
                        .children
                        .iter()
                        .filter(|&&sibling| self.nodes[sibling].name == node.name)
                        .position(|&sibling| sibling == node_id)
                        .unwrap_or(0);
                    format!("{}[{}]", node.name, position + 1)
                }
                _ => node.name.clone(),
            };
            segments.push(segment);
            current = node.parent;
        }
        segments.reverse();
        format!("/{}", segments.join("/"))
    }
}

fn has_content(node: &Node) -> bool {
    !node.children.is_empty() || !node.text.trim().is_empty()
}

/// Indentation between child elements is layout, not content.
fn drop_layout_text(node: &mut Node) {
    if node.children.is_empty() {
        return;
    }
    let trimmed = node.text.trim();
    if trimmed.len() != node.text.len() {
        node.text = trimmed.to_string();
    }
}

fn push_node(
    nodes: &mut Vec<Node>,
    start: &BytesStart<'_>,
    parent: Option<NodeId>,
    root: &mut Option<NodeId>,
) -> ReadResult<NodeId> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }

    let id = nodes.len();
    match parent {
        Some(parent) => nodes[parent].children.push(id),
        None if root.is_some() => {
            return Err(ReadError::malformed(format!("/{name}"), "multiple root elements"));
        }
        None => *root = Some(id),
    }
    nodes.push(Node {
        name,
        attributes,
        text: String::new(),
        children: Vec::new(),
        parent,
    });
    Ok(id)
}
