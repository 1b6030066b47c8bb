//! Package registry and dependency resolution
//!
//! The descriptor declares `(coordinate, version)` pairs; resolving them is
//! delegated to a [`PackageRegistry`] collaborator. Resolution walks the
//! declarations in order and aborts on the first unresolvable coordinate —
//! there is no partial success and no retry.
//!
//! Two registries are provided: [`InMemoryRegistry`] (tests, programmatic
//! use) and [`index::IndexRegistry`] (a TOML index file on disk). Network
//! fetch is deliberately out of scope; the registry answers from its index.

pub mod index;

use crate::descriptor::schema::{Coordinate, DependencyDeclaration, DependencyScope};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Registry metadata for one published artifact version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    /// Expected checksum of the artifact, when the index records one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// A resolver collaborator that answers coordinate lookups
pub trait PackageRegistry {
    /// Look up an exact `(coordinate, version)` pair
    fn lookup(&self, coordinate: &Coordinate, version: &str) -> Option<ArtifactEntry>;

    /// Versions the registry has for a coordinate, in ascending order
    fn available_versions(&self, coordinate: &Coordinate) -> Vec<String>;
}

/// A dependency declaration resolved against the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedArtifact {
    /// Library coordinate
    pub coordinate: Coordinate,
    /// Resolved version
    pub version: String,
    /// Scope the dependency was declared with
    pub scope: DependencyScope,
    /// Repository-relative artifact path
    pub path: String,
    /// Checksum from the index, when recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// Resolve all declarations in declaration order.
///
/// Fails with a resolution error naming the first unresolvable coordinate;
/// the error context lists the versions the registry does have for it.
pub fn resolve_all(
    registry: &dyn PackageRegistry,
    declarations: &[DependencyDeclaration],
) -> Result<Vec<ResolvedArtifact>> {
    let mut resolved = Vec::with_capacity(declarations.len());

    for declaration in declarations {
        let coordinate = &declaration.coordinate;
        let version = &declaration.version;

        match registry.lookup(coordinate, version) {
            Some(entry) => {
                tracing::debug!(%coordinate, %version, "resolved");
                resolved.push(ResolvedArtifact {
                    coordinate: coordinate.clone(),
                    version: version.clone(),
                    scope: declaration.scope,
                    path: coordinate.repository_path(version),
                    sha256: entry.sha256,
                });
            }
            None => {
                let available = registry.available_versions(coordinate);
                let context = if available.is_empty() {
                    format!("Registry has no entry for {}", coordinate)
                } else {
                    format!(
                        "Registry has {} at: {}",
                        coordinate,
                        available.join(", ")
                    )
                };
                return Err(Error::unresolvable(&coordinate.to_string(), version)
                    .with_context(context));
            }
        }
    }

    tracing::info!(count = resolved.len(), "dependency resolution complete");
    Ok(resolved)
}

/// Sort version strings ascending, semver-aware where versions parse
pub(crate) fn sort_versions(mut versions: Vec<String>) -> Vec<String> {
    versions.sort_by(|a, b| {
        match (semver::Version::parse(a), semver::Version::parse(b)) {
            (Ok(va), Ok(vb)) => va.cmp(&vb),
            _ => a.cmp(b),
        }
    });
    versions
}

/// In-memory registry, primarily for tests and programmatic population
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    packages: HashMap<Coordinate, BTreeMap<String, ArtifactEntry>>,
}

impl InMemoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a version of a coordinate, replacing any existing entry
    pub fn add(&mut self, coordinate: Coordinate, version: impl Into<String>, entry: ArtifactEntry) {
        self.packages
            .entry(coordinate)
            .or_default()
            .insert(version.into(), entry);
    }

    /// Builder-style [`add`](Self::add)
    pub fn with(mut self, coordinate: Coordinate, version: impl Into<String>) -> Self {
        self.add(coordinate, version, ArtifactEntry::default());
        self
    }
}

impl PackageRegistry for InMemoryRegistry {
    fn lookup(&self, coordinate: &Coordinate, version: &str) -> Option<ArtifactEntry> {
        self.packages
            .get(coordinate)
            .and_then(|versions| versions.get(version))
            .cloned()
    }

    fn available_versions(&self, coordinate: &Coordinate) -> Vec<String> {
        sort_versions(
            self.packages
                .get(coordinate)
                .map(|versions| versions.keys().cloned().collect())
                .unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Descriptor, STARTER_DESCRIPTOR};
    use crate::error::ErrorCode;

    fn populated_registry() -> InMemoryRegistry {
        InMemoryRegistry::new()
            .with(Coordinate::new("com.android.tools", "desugar_jdk_libs"), "2.0.4")
            .with(Coordinate::new("androidx.multidex", "multidex"), "2.0.1")
            .with(Coordinate::new("androidx.core", "core-ktx"), "1.15.0")
            .with(Coordinate::new("androidx.work", "work-runtime-ktx"), "2.10.0")
    }

    fn starter_declarations() -> Vec<DependencyDeclaration> {
        Descriptor::from_toml_str(STARTER_DESCRIPTOR)
            .unwrap()
            .schema
            .dependencies
    }

    #[test]
    fn test_resolve_all_declared_coordinates() {
        let registry = populated_registry();
        let resolved = resolve_all(&registry, &starter_declarations()).unwrap();

        assert_eq!(resolved.len(), 4);
        assert_eq!(resolved[0].coordinate.artifact, "desugar_jdk_libs");
        assert_eq!(resolved[0].scope, DependencyScope::CoreDesugaring);
        assert_eq!(
            resolved[2].path,
            "androidx/core/core-ktx/1.15.0/core-ktx-1.15.0"
        );
    }

    #[test]
    fn test_resolution_preserves_declaration_order() {
        let registry = populated_registry();
        let declarations = starter_declarations();
        let resolved = resolve_all(&registry, &declarations).unwrap();

        let declared: Vec<_> = declarations.iter().map(|d| &d.coordinate).collect();
        let got: Vec<_> = resolved.iter().map(|r| &r.coordinate).collect();
        assert_eq!(declared, got);
    }

    #[test]
    fn test_missing_entry_names_first_unresolvable() {
        let mut registry = populated_registry();
        registry.packages.remove(&Coordinate::new("androidx.multidex", "multidex"));

        let err = resolve_all(&registry, &starter_declarations()).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnresolvableCoordinate);
        assert!(err.message.contains("androidx.multidex:multidex"));
    }

    #[test]
    fn test_wrong_version_lists_available() {
        let registry = InMemoryRegistry::new()
            .with(Coordinate::new("androidx.core", "core-ktx"), "1.13.1")
            .with(Coordinate::new("androidx.core", "core-ktx"), "1.12.0");

        let declarations = vec![DependencyDeclaration {
            coordinate: Coordinate::new("androidx.core", "core-ktx"),
            version: "1.15.0".to_string(),
            scope: DependencyScope::Implementation,
        }];

        let err = resolve_all(&registry, &declarations).unwrap_err();
        let context = err.context.unwrap();
        assert!(context.contains("1.12.0, 1.13.1"));
    }

    #[test]
    fn test_empty_declarations_resolve_to_nothing() {
        let registry = InMemoryRegistry::new();
        let resolved = resolve_all(&registry, &[]).unwrap();
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_sort_versions_is_semver_aware() {
        let sorted = sort_versions(vec![
            "2.10.0".to_string(),
            "2.2.0".to_string(),
            "2.9.1".to_string(),
        ]);
        assert_eq!(sorted, vec!["2.2.0", "2.9.1", "2.10.0"]);
    }
}
