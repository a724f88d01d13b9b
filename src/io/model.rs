//! Snapshot metadata and file naming

use crate::{Error, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Layout version written into every snapshot
pub const FORMAT_VERSION: &str = "1";

/// Metadata stored in the safetensors header
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotMetadata {
    /// Network name (generator, discriminator, q_network)
    pub network: String,
    /// Training step the snapshot was taken at
    pub step: u64,
    /// RFC 3339 creation time
    pub created: String,
}

impl SnapshotMetadata {
    pub fn new(network: impl Into<String>, step: u64) -> Self {
        Self { network: network.into(), step, created: Utc::now().to_rfc3339() }
    }

    pub(crate) fn to_map(&self) -> HashMap<String, String> {
        HashMap::from([
            ("format_version".to_string(), FORMAT_VERSION.to_string()),
            ("network".to_string(), self.network.clone()),
            ("step".to_string(), self.step.to_string()),
            ("created".to_string(), self.created.clone()),
        ])
    }

    pub(crate) fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let field = |key: &str| {
            map.get(key)
                .cloned()
                .ok_or_else(|| Error::Serialization(format!("snapshot metadata lacks '{key}'")))
        };
        let step = field("step")?
            .parse()
            .map_err(|e| Error::Serialization(format!("snapshot step is not an integer: {e}")))?;
        Ok(Self { network: field("network")?, step, created: field("created").unwrap_or_default() })
    }
}

/// `<dir>/<network>.safetensors`
pub fn snapshot_path(dir: impl AsRef<Path>, network: &str) -> PathBuf {
    dir.as_ref().join(format!("{network}.safetensors"))
}
