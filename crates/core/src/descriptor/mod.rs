//! Build descriptor: schema and loading
//!
//! The descriptor is a declarative TOML record consumed once per build
//! invocation. This module holds its typed schema and the loader; semantic
//! rules live in [`crate::validation`], dependency resolution in
//! [`crate::registry`].

pub mod loader;
pub mod schema;

pub use loader::Descriptor;
pub use schema::DescriptorSchema;

/// Starter descriptor written by `droidforge init`.
///
/// Mirrors a typical notification-capable application: SDK 36 against a
/// minimum of 21, Java 11 with core-library desugaring, multidex, and the
/// support libraries those options require.
pub const STARTER_DESCRIPTOR: &str = r#"[application]
namespace = "com.example.app"
application_id = "com.example.app"

[sdk]
compile_sdk = 36
# Must stay at 21 or above for notification support
min_sdk = 21
target_sdk = 36

[compatibility]
source_compatibility = "11"
target_compatibility = "11"
jvm_target = "11"
core_library_desugaring = true

[versioning]
version_code = 1
version_name = "1.0.0"

[dex]
multidex = true

[features]
notifications = true

[signing.debug]
keystore = "debug.keystore"
key_alias = "androiddebugkey"

[build_types.debug]
signing_config = "debug"

[build_types.release]
signing_config = "debug"

[[dependencies]]
coordinate = "com.android.tools:desugar_jdk_libs"
version = "2.0.4"
scope = "coredesugaring"

[[dependencies]]
coordinate = "androidx.multidex:multidex"
version = "2.0.1"

[[dependencies]]
coordinate = "androidx.core:core-ktx"
version = "1.15.0"

[[dependencies]]
coordinate = "androidx.work:work-runtime-ktx"
version = "2.10.0"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::schema::DependencyScope;

    #[test]
    fn test_starter_descriptor_parses() {
        let descriptor = Descriptor::from_toml_str(STARTER_DESCRIPTOR).unwrap();
        let schema = &descriptor.schema;

        assert_eq!(schema.sdk.compile_sdk, 36);
        assert_eq!(schema.sdk.min_sdk, 21);
        assert_eq!(schema.sdk.target_sdk, 36);
        assert_eq!(schema.dependencies.len(), 4);
        assert_eq!(
            schema.dependencies[0].scope,
            DependencyScope::CoreDesugaring
        );
        assert!(schema.build_types.contains_key("release"));
    }

    #[test]
    fn test_starter_descriptor_declaration_order() {
        let descriptor = Descriptor::from_toml_str(STARTER_DESCRIPTOR).unwrap();
        let coordinates: Vec<String> = descriptor
            .schema
            .dependencies
            .iter()
            .map(|d| d.coordinate.to_string())
            .collect();

        assert_eq!(
            coordinates,
            vec![
                "com.android.tools:desugar_jdk_libs",
                "androidx.multidex:multidex",
                "androidx.core:core-ktx",
                "androidx.work:work-runtime-ktx",
            ]
        );
    }
}
