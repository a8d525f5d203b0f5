//! Metadata layer configuration

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the per-object metadata document on each disk
pub const DEFAULT_METADATA_FILE: &str = "xl.json";

/// Document format tag written by the erasure layer
pub const XL_META_FORMAT: &str = "xl";

/// Current metadata document version
pub const XL_META_VERSION: &str = "1.0.1";

/// Previous metadata document version, still readable
pub const XL_META_VERSION_100: &str = "1.0.0";

/// A recognized `(version, format)` combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatVersion {
    pub version: String,
    pub format: String,
}

impl FormatVersion {
    pub fn new(version: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            format: format.into(),
        }
    }
}

/// Configuration for reading and validating metadata documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetaConfig {
    /// File name of the metadata document under each object directory
    pub metadata_file: String,

    /// Version/format pairs a document must carry to be trusted
    pub accepted_formats: Vec<FormatVersion>,
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            metadata_file: DEFAULT_METADATA_FILE.to_string(),
            accepted_formats: vec![
                FormatVersion::new(XL_META_VERSION, XL_META_FORMAT),
                FormatVersion::new(XL_META_VERSION_100, XL_META_FORMAT),
            ],
        }
    }
}

impl MetaConfig {
    /// Replace the accepted version/format pairs
    pub fn with_accepted_formats(mut self, accepted: Vec<FormatVersion>) -> Self {
        self.accepted_formats = accepted;
        self
    }

    /// Whether `(version, format)` is one of the accepted combinations
    pub fn is_valid(&self, version: &str, format: &str) -> bool {
        self.accepted_formats
            .iter()
            .any(|f| f.version == version && f.format == format)
    }

    /// Path of the metadata document for `object`, relative to its bucket
    pub fn metadata_path(&self, object: &str) -> String {
        let object = object.trim_matches('/');
        if object.is_empty() {
            self.metadata_file.clone()
        } else {
            format!("{}/{}", object, self.metadata_file)
        }
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.metadata_file.is_empty() || self.metadata_file.contains('/') {
            return Err(Error::Config(format!(
                "invalid metadata file name: {:?}",
                self.metadata_file
            )));
        }
        if self.accepted_formats.is_empty() {
            return Err(Error::Config(
                "at least one accepted format is required".to_string(),
            ));
        }
        Ok(())
    }
}
