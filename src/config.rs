use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::provider::{LiveRecord, RecordType};

/// Declared state of a zone: the apex domain plus the records it should hold.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub domain: String,
    pub records: Vec<Record>,
}

/// One declared record from the configuration file.
///
/// `matched_live` never comes from the file; the reconcile pass fills it in
/// for records that end up in the update bucket.
#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    /// Short name, with `"@"` standing for the zone apex.
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub content: String,
    #[serde(default, rename = "proxy")]
    pub proxied: bool,
    #[serde(skip)]
    pub matched_live: Option<LiveRecord>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config = serde_yaml::from_str(content)?;
        Ok(config)
    }
}
