//! Descriptor schema definitions
//!
//! Typed model of the declarative build descriptor (`droidforge.toml`).
//! The descriptor is authored once, read at every build invocation, and
//! never mutated at runtime; none of these types expose mutation APIs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Default minimum SDK level. Notification support requires at least 21.
pub const DEFAULT_MIN_SDK: u32 = 21;

/// Root descriptor schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorSchema {
    /// Application identity (required)
    pub application: ApplicationIdentity,

    /// SDK version set (required)
    pub sdk: SdkVersionSet,

    #[serde(default)]
    pub compatibility: CompatibilityOptions,

    #[serde(default)]
    pub versioning: VersioningInfo,

    #[serde(default)]
    pub dex: DexOptions,

    #[serde(default)]
    pub features: FeatureFlags,

    /// Named signing profiles
    #[serde(default)]
    pub signing: BTreeMap<String, SigningProfile>,

    /// Per-variant build settings
    #[serde(default)]
    pub build_types: BTreeMap<String, BuildType>,

    /// Declared dependencies, in declaration order
    #[serde(default)]
    pub dependencies: Vec<DependencyDeclaration>,
}

impl DescriptorSchema {
    /// Dependencies declared with the desugaring-support scope
    pub fn desugaring_dependencies(&self) -> impl Iterator<Item = &DependencyDeclaration> {
        self.dependencies
            .iter()
            .filter(|d| d.scope == DependencyScope::CoreDesugaring)
    }
}

/// Application identity: namespace and application id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationIdentity {
    /// Code namespace (reverse-domain identifier)
    pub namespace: String,

    /// Published application id (reverse-domain identifier)
    pub application_id: String,
}

/// Compile, minimum, and target SDK levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkVersionSet {
    /// SDK level the sources are compiled against
    pub compile_sdk: u32,

    /// Lowest SDK level the artifact supports
    #[serde(default = "default_min_sdk")]
    pub min_sdk: u32,

    /// SDK level the artifact is tested against
    pub target_sdk: u32,
}

fn default_min_sdk() -> u32 {
    DEFAULT_MIN_SDK
}

/// Java language level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JavaLevel {
    #[serde(rename = "8")]
    V8,
    #[serde(rename = "11")]
    V11,
    #[serde(rename = "17")]
    V17,
    #[serde(rename = "21")]
    V21,
}

impl fmt::Display for JavaLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            JavaLevel::V8 => "8",
            JavaLevel::V11 => "11",
            JavaLevel::V17 => "17",
            JavaLevel::V21 => "21",
        };
        write!(f, "{}", level)
    }
}

/// Language-level compatibility and desugaring options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityOptions {
    /// Source language level
    #[serde(default = "default_java_level")]
    pub source_compatibility: JavaLevel,

    /// Target bytecode level
    #[serde(default = "default_java_level")]
    pub target_compatibility: JavaLevel,

    /// Kotlin JVM target
    #[serde(default = "default_java_level")]
    pub jvm_target: JavaLevel,

    /// Back-port newer runtime-library APIs to older platform levels
    #[serde(default = "default_true")]
    pub core_library_desugaring: bool,
}

impl Default for CompatibilityOptions {
    fn default() -> Self {
        Self {
            source_compatibility: default_java_level(),
            target_compatibility: default_java_level(),
            jvm_target: default_java_level(),
            core_library_desugaring: true,
        }
    }
}

fn default_java_level() -> JavaLevel {
    JavaLevel::V11
}

fn default_true() -> bool {
    true
}

/// Artifact versioning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersioningInfo {
    /// Monotonically increasing release counter
    #[serde(default = "default_version_code")]
    pub version_code: u32,

    /// Human-readable version string
    #[serde(default = "default_version_name")]
    pub version_name: String,

    /// Version code of the previous release, when release tooling supplies it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_version_code: Option<u32>,
}

impl Default for VersioningInfo {
    fn default() -> Self {
        Self {
            version_code: default_version_code(),
            version_name: default_version_name(),
            previous_version_code: None,
        }
    }
}

fn default_version_code() -> u32 {
    1
}

fn default_version_name() -> String {
    "1.0.0".to_string()
}

/// Dex packaging options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DexOptions {
    /// Split across multiple dex containers when the method limit is exceeded
    #[serde(default = "default_true")]
    pub multidex: bool,

    /// Anticipated method-reference count, when tooling can estimate it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_method_count: Option<u64>,
}

impl Default for DexOptions {
    fn default() -> Self {
        Self {
            multidex: true,
            estimated_method_count: None,
        }
    }
}

/// Feature declarations that tighten validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FeatureFlags {
    /// Application schedules notifications (raises the minimum SDK floor)
    #[serde(default)]
    pub notifications: bool,
}

/// A named signing profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningProfile {
    /// Path to the keystore file
    pub keystore: String,

    /// Alias of the signing key inside the keystore
    pub key_alias: String,
}

/// Per-variant build settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildType {
    /// Name of the signing profile this variant is signed with
    pub signing_config: String,
}

/// Dependency scope: how the artifact consumes a library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyScope {
    /// Regular compile-and-package dependency
    Implementation,
    /// Desugaring-support library
    CoreDesugaring,
}

impl fmt::Display for DependencyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyScope::Implementation => write!(f, "implementation"),
            DependencyScope::CoreDesugaring => write!(f, "coredesugaring"),
        }
    }
}

/// A `group:artifact` library coordinate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coordinate {
    /// Group id, e.g. `androidx.core`
    pub group: String,
    /// Artifact id, e.g. `core-ktx`
    pub artifact: String,
}

impl Coordinate {
    /// Create a coordinate from group and artifact parts
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
        }
    }

    /// Maven-repository-style relative path for a given version,
    /// e.g. `androidx/core/core-ktx/1.15.0/core-ktx-1.15.0`
    pub fn repository_path(&self, version: &str) -> String {
        format!(
            "{}/{}/{}/{}-{}",
            self.group.replace('.', "/"),
            self.artifact,
            version,
            self.artifact,
            version
        )
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)
    }
}

impl FromStr for Coordinate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((group, artifact))
                if !group.is_empty() && !artifact.is_empty() && !artifact.contains(':') =>
            {
                Ok(Self::new(group, artifact))
            }
            _ => Err(format!(
                "Invalid coordinate '{}': expected 'group:artifact'",
                s
            )),
        }
    }
}

impl TryFrom<String> for Coordinate {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Coordinate> for String {
    fn from(c: Coordinate) -> Self {
        c.to_string()
    }
}

/// A declared dependency: coordinate, exact version, and scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDeclaration {
    /// Library coordinate (`group:artifact`)
    pub coordinate: Coordinate,

    /// Exact version to resolve
    pub version: String,

    /// Consumption scope
    #[serde(default = "default_scope")]
    pub scope: DependencyScope,
}

fn default_scope() -> DependencyScope {
    DependencyScope::Implementation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_parse() {
        let c: Coordinate = "androidx.core:core-ktx".parse().unwrap();
        assert_eq!(c.group, "androidx.core");
        assert_eq!(c.artifact, "core-ktx");
        assert_eq!(c.to_string(), "androidx.core:core-ktx");
    }

    #[test]
    fn test_coordinate_parse_rejects_malformed() {
        assert!("no-colon".parse::<Coordinate>().is_err());
        assert!(":artifact".parse::<Coordinate>().is_err());
        assert!("group:".parse::<Coordinate>().is_err());
        assert!("a:b:c".parse::<Coordinate>().is_err());
    }

    #[test]
    fn test_coordinate_repository_path() {
        let c = Coordinate::new("androidx.work", "work-runtime-ktx");
        assert_eq!(
            c.repository_path("2.10.0"),
            "androidx/work/work-runtime-ktx/2.10.0/work-runtime-ktx-2.10.0"
        );
    }

    #[test]
    fn test_java_level_display() {
        assert_eq!(JavaLevel::V11.to_string(), "11");
        assert_eq!(JavaLevel::V21.to_string(), "21");
    }

    #[test]
    fn test_compatibility_defaults() {
        let compat = CompatibilityOptions::default();
        assert_eq!(compat.source_compatibility, JavaLevel::V11);
        assert_eq!(compat.target_compatibility, JavaLevel::V11);
        assert!(compat.core_library_desugaring);
    }

    #[test]
    fn test_dex_defaults() {
        let dex = DexOptions::default();
        assert!(dex.multidex);
        assert!(dex.estimated_method_count.is_none());
    }

    #[test]
    fn test_dependency_scope_from_toml() {
        let dep: DependencyDeclaration = toml::from_str(
            r#"
            coordinate = "com.android.tools:desugar_jdk_libs"
            version = "2.0.4"
            scope = "coredesugaring"
            "#,
        )
        .unwrap();
        assert_eq!(dep.scope, DependencyScope::CoreDesugaring);
        assert_eq!(dep.coordinate.group, "com.android.tools");
    }

    #[test]
    fn test_dependency_scope_defaults_to_implementation() {
        let dep: DependencyDeclaration = toml::from_str(
            r#"
            coordinate = "androidx.multidex:multidex"
            version = "2.0.1"
            "#,
        )
        .unwrap();
        assert_eq!(dep.scope, DependencyScope::Implementation);
    }
}
