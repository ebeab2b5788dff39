//! Reader and writer configuration.

use serde::{Deserialize, Serialize};

/// Options for reading xmeml.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Rate used when neither an element nor any ancestor declares one.
    pub default_rate: Option<f64>,
    /// Fail on unsupported constructs instead of collecting warnings.
    pub strict: bool,
}

impl ReaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn default_rate(mut self, rate: f64) -> Self {
        self.default_rate = Some(rate);
        self
    }

    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Options for writing xmeml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Value of the `version` attribute on `<xmeml>`.
    pub xmeml_version: String,
    /// Spaces per indentation level; 0 writes everything on one line.
    pub indent: usize,
    /// Rate of the written sequence. Defaults to the first clip's rate.
    pub sequence_rate: Option<f64>,
    /// Emit `<!DOCTYPE xmeml>` after the XML declaration.
    pub include_doctype: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            xmeml_version: "4".into(),
            indent: 2,
            sequence_rate: None,
            include_doctype: true,
        }
    }
}

impl WriterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn xmeml_version(mut self, version: impl Into<String>) -> Self {
        self.xmeml_version = version.into();
        self
    }

    #[must_use]
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    #[must_use]
    pub fn sequence_rate(mut self, rate: f64) -> Self {
        self.sequence_rate = Some(rate);
        self
    }

    #[must_use]
    pub fn include_doctype(mut self, include: bool) -> Self {
        self.include_doctype = include;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_defaults() {
        let config = WriterConfig::default();
        assert_eq!(config.xmeml_version, "4");
        assert_eq!(config.indent, 2);
        assert!(config.include_doctype);
        assert!(config.sequence_rate.is_none());
    }

    #[test]
    fn test_partial_config_from_json() {
        let config: WriterConfig = serde_json::from_str(r#"{ "indent": 4 }"#).unwrap();
        assert_eq!(config.indent, 4);
        assert_eq!(config.xmeml_version, "4");

        let reader: ReaderConfig = serde_json::from_str(r#"{ "strict": true }"#).unwrap();
        assert!(reader.strict);
        assert!(reader.default_rate.is_none());
    }

    #[test]
    fn test_builders() {
        let config = ReaderConfig::new().default_rate(25.0).strict(true);
        assert_eq!(config.default_rate, Some(25.0));
        assert!(config.strict);
    }
}
