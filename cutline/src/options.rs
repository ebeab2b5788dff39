//! Format selection and adapter options.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use cutline_xmeml::{ReaderConfig, WriterConfig};

/// Serialized forms a timeline can be read from or written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// Final Cut Pro 7 XML interchange.
    #[default]
    Xmeml,
    /// The model's own JSON form.
    Json,
}

impl Format {
    /// Infer the format from a file extension (`.xml`, `.json`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        if extension.eq_ignore_ascii_case("xml") {
            Some(Format::Xmeml)
        } else if extension.eq_ignore_ascii_case("json") {
            Some(Format::Json)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Format::Xmeml => "xml",
            Format::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Xmeml => f.write_str("xmeml"),
            Format::Json => f.write_str("json"),
        }
    }
}

/// Options for one read or write, using the builder pattern.
///
/// Deserializable, so an application can keep it in its own config file:
///
/// ```
/// use cutline::{AdapterOptions, Format};
///
/// let options: AdapterOptions = serde_json::from_str(
///     r#"{ "format": "xmeml", "reader": { "strict": true }, "writer": { "indent": 4 } }"#,
/// )?;
/// assert_eq!(options.format, Format::Xmeml);
/// assert!(options.reader.strict);
/// assert_eq!(options.writer.indent, 4);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterOptions {
    pub format: Format,
    pub reader: ReaderConfig,
    pub writer: WriterConfig,
}

impl AdapterOptions {
    /// Create options with defaults (xmeml, lenient reading).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the format.
    #[must_use]
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Rate to assume when an xmeml document declares none.
    #[must_use]
    pub fn default_rate(mut self, rate: f64) -> Self {
        self.reader = self.reader.default_rate(rate);
        self
    }

    /// Fail on constructs the model cannot represent.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.reader = self.reader.strict(strict);
        self
    }

    /// Rate of the written sequence.
    #[must_use]
    pub fn sequence_rate(mut self, rate: f64) -> Self {
        self.writer = self.writer.sequence_rate(rate);
        self
    }

    /// Spaces per indentation level in written XML.
    #[must_use]
    pub fn indent(mut self, indent: usize) -> Self {
        self.writer = self.writer.indent(indent);
        self
    }

    /// Emit `<!DOCTYPE xmeml>`.
    #[must_use]
    pub fn include_doctype(mut self, include: bool) -> Self {
        self.writer = self.writer.include_doctype(include);
        self
    }

    /// Set the reader configuration.
    #[must_use]
    pub fn reader_config(mut self, config: ReaderConfig) -> Self {
        self.reader = config;
        self
    }

    /// Set the writer configuration.
    #[must_use]
    pub fn writer_config(mut self, config: WriterConfig) -> Self {
        self.writer = config;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("cut.xml")), Some(Format::Xmeml));
        assert_eq!(Format::from_path(Path::new("CUT.XML")), Some(Format::Xmeml));
        assert_eq!(Format::from_path(Path::new("cut.json")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("cut.edl")), None);
        assert_eq!(Format::from_path(Path::new("cut")), None);
    }

    #[test]
    fn test_builder() {
        let options = AdapterOptions::new()
            .format(Format::Json)
            .default_rate(25.0)
            .strict(true)
            .sequence_rate(24.0)
            .indent(0)
            .include_doctype(false);

        assert_eq!(options.format, Format::Json);
        assert_eq!(options.reader.default_rate, Some(25.0));
        assert!(options.reader.strict);
        assert_eq!(options.writer.sequence_rate, Some(24.0));
        assert_eq!(options.writer.indent, 0);
        assert!(!options.writer.include_doctype);
        assert_eq!(options.writer.xmeml_version, "4");
    }
}
