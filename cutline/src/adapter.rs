//! Reading and writing timelines in the supported formats.

use std::fs;
use std::path::Path;

use tracing::info;

use cutline_edit::{json, Timeline};
use cutline_xmeml::ReadOutcome;

use crate::error::{Error, Result};
use crate::options::{AdapterOptions, Format};

/// Parse a timeline from text in `format`, with default options.
pub fn read_from_string(text: &str, format: Format) -> Result<Timeline> {
    AdapterOptions::new().format(format).read(text)
}

/// Serialize a timeline to `format`, with default options.
pub fn write_to_string(timeline: &Timeline, format: Format) -> Result<String> {
    AdapterOptions::new().format(format).write(timeline)
}

/// Read a file, choosing the format from its extension.
pub fn read_from_file(path: impl AsRef<Path>) -> Result<Timeline> {
    let path = path.as_ref();
    options_for(path)?.read_file(path)
}

/// Write a file, choosing the format from its extension.
pub fn write_to_file(timeline: &Timeline, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    options_for(path)?.write_file(timeline, path)
}

fn options_for(path: &Path) -> Result<AdapterOptions> {
    let format = Format::from_path(path).ok_or_else(|| Error::UnknownFormat {
        path: path.to_path_buf(),
    })?;
    Ok(AdapterOptions::new().format(format))
}

impl AdapterOptions {
    /// Parse a timeline, dropping reader warnings.
    pub fn read(&self, text: &str) -> Result<Timeline> {
        Ok(self.read_outcome(text)?.timeline)
    }

    /// Parse a timeline and report what the reader skipped.
    ///
    /// JSON input never produces warnings, but is validated since it may
    /// come from anywhere.
    pub fn read_outcome(&self, text: &str) -> Result<ReadOutcome> {
        match self.format {
            Format::Xmeml => Ok(cutline_xmeml::read_with_config(text, &self.reader)?),
            Format::Json => {
                let timeline = json::from_json_str(text)?;
                timeline.validate()?;
                Ok(ReadOutcome {
                    timeline,
                    warnings: Vec::new(),
                })
            }
        }
    }

    /// Serialize a timeline.
    pub fn write(&self, timeline: &Timeline) -> Result<String> {
        match self.format {
            Format::Xmeml => Ok(cutline_xmeml::write_with_config(timeline, &self.writer)?),
            Format::Json => Ok(json::to_json_string(timeline)?),
        }
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<Timeline> {
        let path = path.as_ref();
        info!(path = %path.display(), format = %self.format, "Reading timeline");
        let text = fs::read_to_string(path)?;
        self.read(&text)
    }

    pub fn write_file(&self, timeline: &Timeline, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.write(timeline)?;
        info!(path = %path.display(), format = %self.format, bytes = text.len(), "Writing timeline");
        fs::write(path, text)?;
        Ok(())
    }
}
