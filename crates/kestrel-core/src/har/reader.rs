use super::types::TimingArchive;
use crate::{Error, Result};
use std::path::Path;

pub struct HarReader;

impl HarReader {
    /// Read and parse a HAR file from the given path
    pub fn from_file(path: &Path) -> Result<TimingArchive> {
        tracing::debug!("Reading HAR file from: {}", path.display());

        let content = std::fs::read_to_string(path)?;
        let archive = Self::parse(&content)?;

        tracing::info!(
            "Successfully parsed HAR file {} with {} entries",
            path.display(),
            archive.log.entries.len()
        );

        Ok(archive)
    }

    /// Parse HAR JSON text. Any structural problem, including a single
    /// entry without a numeric `time`, rejects the whole archive.
    pub fn parse(content: &str) -> Result<TimingArchive> {
        tracing::debug!("Parsing HAR from string");

        serde_json::from_str(content).map_err(|e| Error::MalformedArchive(e.to_string()))
    }
}
