//! Descriptor file loading

use super::schema::DescriptorSchema;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// A loaded descriptor plus the path it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    pub schema: DescriptorSchema,
    pub path: Option<PathBuf>,
}

impl Descriptor {
    /// Load a descriptor from an explicit path, or search standard locations.
    ///
    /// Loading is a pure function of the file content: loading the same
    /// unchanged file twice yields structurally identical descriptors.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let descriptor_path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::descriptor_not_found(p));
                }
                p.to_path_buf()
            }
            None => find_descriptor_file().ok_or_else(|| {
                Error::descriptor_not_found("droidforge.toml")
                    .with_context("No descriptor found in standard locations")
            })?,
        };

        tracing::debug!(path = %descriptor_path.display(), "loading descriptor");

        let schema = load_descriptor_file(&descriptor_path)?;
        Ok(Self {
            schema,
            path: Some(descriptor_path),
        })
    }

    /// Parse a descriptor from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let schema = parse_descriptor(content, None)?;
        Ok(Self { schema, path: None })
    }
}

/// Find a descriptor file in standard locations
fn find_descriptor_file() -> Option<PathBuf> {
    let candidates = [
        "droidforge.toml",
        ".droidforge.toml",
        "android/droidforge.toml",
    ];

    candidates
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

/// Load and parse a TOML descriptor file
fn load_descriptor_file(path: &Path) -> Result<DescriptorSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::malformed(format!(
            "Failed to read descriptor {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_descriptor(&content, Some(path))
}

fn parse_descriptor(content: &str, path: Option<&Path>) -> Result<DescriptorSchema> {
    toml::from_str(content).map_err(|e| {
        let location = path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<inline>".to_string());
        Error::from(e).with_context(format!("While parsing descriptor {}", location))
    })
}
