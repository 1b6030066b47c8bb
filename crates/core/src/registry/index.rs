//! TOML-file-backed registry index
//!
//! Index format:
//!
//! ```toml
//! [packages."androidx.core:core-ktx"]
//! versions = ["1.13.1", "1.15.0"]
//!
//! [packages."androidx.core:core-ktx".artifacts."1.15.0"]
//! sha256 = "..."
//! ```
//!
//! A version listed in `versions` resolves even without an `artifacts`
//! entry; the entry only adds checksum metadata.

use super::{sort_versions, ArtifactEntry, PackageRegistry};
use crate::descriptor::schema::Coordinate;
use crate::error::{Error, ErrorCode, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Registry backed by a TOML index file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexRegistry {
    #[serde(default)]
    packages: BTreeMap<String, PackageEntry>,
}

/// One coordinate's entry in the index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PackageEntry {
    /// Published versions
    #[serde(default)]
    versions: Vec<String>,

    /// Optional per-version artifact metadata
    #[serde(default)]
    artifacts: BTreeMap<String, ArtifactEntry>,
}

impl IndexRegistry {
    /// Load a registry index from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::new(
                ErrorCode::RegistryIndexError,
                format!("Failed to read registry index {}: {}", path.display(), e),
            )
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| e.with_context(format!("While loading registry index {}", path.display())))
    }

    /// Parse a registry index from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let registry: Self = toml::from_str(content).map_err(|e| {
            Error::new(
                ErrorCode::RegistryIndexError,
                format!("Registry index parse error: {}", e),
            )
            .with_source(e)
        })?;

        tracing::debug!(packages = registry.packages.len(), "registry index loaded");
        Ok(registry)
    }

    /// Number of coordinates in the index
    pub fn package_count(&self) -> usize {
        self.packages.len()
    }
}

impl PackageRegistry for IndexRegistry {
    fn lookup(&self, coordinate: &Coordinate, version: &str) -> Option<ArtifactEntry> {
        let entry = self.packages.get(&coordinate.to_string())?;
        if !entry.versions.iter().any(|v| v == version) {
            return None;
        }
        Some(entry.artifacts.get(version).cloned().unwrap_or_default())
    }

    fn available_versions(&self, coordinate: &Coordinate) -> Vec<String> {
        sort_versions(
            self.packages
                .get(&coordinate.to_string())
                .map(|entry| entry.versions.clone())
                .unwrap_or_default(),
        )
    }
}
