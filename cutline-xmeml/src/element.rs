//! Owned element tree built by the writer and emitted with quick-xml.

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::config::WriterConfig;
use crate::error::WriteResult;

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// `<name>text</name>`
    pub fn text_node(name: impl Into<String>, text: impl ToString) -> Self {
        Self {
            name: name.into(),
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn push_text(&mut self, name: &str, text: impl ToString) {
        self.children.push(Element::text_node(name, text));
    }

    fn is_empty(&self) -> bool {
        self.children.is_empty() && self.text.as_deref().map_or(true, str::is_empty)
    }
}

/// Serialize `root` as a complete document.
pub(crate) fn emit_document(root: &Element, config: &WriterConfig) -> WriteResult<String> {
    let buffer = Cursor::new(Vec::new());
    let mut writer = if config.indent > 0 {
        Writer::new_with_indent(buffer, b' ', config.indent)
    } else {
        Writer::new(buffer)
    };

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    if config.include_doctype {
        writer.write_event(Event::DocType(BytesText::from_escaped("xmeml")))?;
    }
    write_element(&mut writer, root)?;

    let mut bytes = writer.into_inner().into_inner();
    bytes.push(b'\n');
    Ok(String::from_utf8(bytes)?)
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, element: &Element) -> WriteResult<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = element.text.as_deref().filter(|text| !text.is_empty()) {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_nested() {
        let mut root = Element::new("xmeml").with_attribute("version", "4");
        let mut clip = Element::new("clipitem").with_attribute("id", "clipitem-1");
        clip.push_text("name", "a < b");
        clip.push(Element::new("file").with_attribute("id", "file-1"));
        root.push(clip);

        let text = emit_document(&root, &WriterConfig::default().include_doctype(false)).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(!text.contains("DOCTYPE"));
        assert!(text.contains("<name>a &lt; b</name>"));
        assert!(text.contains("<file id=\"file-1\"/>"));
    }

    #[test]
    fn test_doctype_and_compact() {
        let root = Element::new("xmeml");
        let text = emit_document(&root, &WriterConfig::default().indent(0)).unwrap();
        assert!(text.contains("<!DOCTYPE xmeml>"));
        assert!(text.contains("<xmeml/>"));
    }
}
