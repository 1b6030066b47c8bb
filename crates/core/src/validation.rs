//! Descriptor validation
//!
//! Enforces the semantic invariants of a loaded descriptor:
//! - reverse-domain shape of namespace and application id
//! - SDK ordering (`min_sdk <= target_sdk <= compile_sdk`)
//! - minimum SDK floor for notification support
//! - multidex requirement against the dex method-reference limit
//! - desugaring / dependency-scope coherence
//! - signing totality across build types
//! - version-code rules
//!
//! Violations are collected into a [`ValidationResult`]; all of them are
//! fatal to the build. Warnings are reported but never block.

use crate::descriptor::schema::{DependencyScope, DescriptorSchema};
use crate::error::{Error, ErrorCode, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Method-reference limit of a single legacy dex container
pub const DEX_METHOD_LIMIT: u64 = 65_536;

/// Minimum SDK level required for notification support
pub const NOTIFICATION_MIN_SDK: u32 = 21;

/// Reverse-domain identifier shape, e.g. `com.example.app`
const REVERSE_DOMAIN_PATTERN: &str = r"^[a-zA-Z][a-zA-Z0-9_]*(\.[a-zA-Z][a-zA-Z0-9_]*)+$";

/// Validation error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
    /// Expected value (if applicable)
    pub expected: Option<String>,
    /// Actual value (if applicable)
    pub actual: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get all warnings
    pub fn warnings(&self) -> &[ValidationError] {
        &self.warnings
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning);
    }

    /// Convert to Result, mapping the first error to its typed code
    pub fn to_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            let code = self
                .errors
                .first()
                .map(|e| error_code_for(&e.code))
                .unwrap_or(ErrorCode::InvalidDescriptor);
            let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
            Err(Error::new(
                code,
                format!("Descriptor validation failed: {}", messages.join("; ")),
            ))
        }
    }
}

fn error_code_for(code: &str) -> ErrorCode {
    match code {
        "IDENTIFIER" => ErrorCode::InvalidIdentifier,
        "SDK_ORDER" => ErrorCode::SdkOrderViolation,
        "SDK_FLOOR" => ErrorCode::SdkFloorViolation,
        "MULTIDEX_REQUIRED" => ErrorCode::MultidexRequired,
        "DESUGARING" => ErrorCode::DesugaringMismatch,
        "SIGNING" => ErrorCode::SigningUnresolved,
        "VERSION_CODE" => ErrorCode::VersionCodeInvalid,
        _ => ErrorCode::InvalidDescriptor,
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    /// Validate that a field is not empty
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: "Field is required".to_string(),
                code: "REQUIRED".to_string(),
                expected: Some("non-empty value".to_string()),
                actual: Some("empty".to_string()),
            });
        }
        self
    }

    /// Validate against a regex pattern
    pub fn pattern(
        mut self,
        field: &str,
        value: &str,
        pattern: &str,
        description: &str,
        code: &str,
    ) -> Self {
        match Regex::new(pattern) {
            Ok(re) => {
                if !re.is_match(value) {
                    self.result.add_error(ValidationError {
                        field: field.to_string(),
                        message: format!("Must match {}", description),
                        code: code.to_string(),
                        expected: Some(description.to_string()),
                        actual: Some(value.to_string()),
                    });
                }
            }
            Err(_) => {
                self.result.add_error(ValidationError {
                    field: field.to_string(),
                    message: "Invalid validation pattern".to_string(),
                    code: "INTERNAL".to_string(),
                    expected: None,
                    actual: None,
                });
            }
        }
        self
    }

    /// Add a custom validation; the closure returns an error on violation
    pub fn custom<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> Option<ValidationError>,
    {
        if let Some(error) = f() {
            self.result.add_error(error);
        }
        self
    }

    /// Add a warning (non-blocking) when the condition holds
    pub fn warn_if(mut self, field: &str, condition: bool, message: &str) -> Self {
        if condition {
            self.result.add_warning(ValidationError {
                field: field.to_string(),
                message: message.to_string(),
                code: "WARNING".to_string(),
                expected: None,
                actual: None,
            });
        }
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}

/// Validate a descriptor against all semantic rules
pub fn validate_descriptor(schema: &DescriptorSchema) -> ValidationResult {
    let mut result = Validator::new()
        .pattern(
            "application.namespace",
            &schema.application.namespace,
            REVERSE_DOMAIN_PATTERN,
            "reverse-domain identifier (e.g. com.example.app)",
            "IDENTIFIER",
        )
        .pattern(
            "application.application_id",
            &schema.application.application_id,
            REVERSE_DOMAIN_PATTERN,
            "reverse-domain identifier (e.g. com.example.app)",
            "IDENTIFIER",
        )
        .required("versioning.version_name", &schema.versioning.version_name)
        .validate();

    check_sdk_versions(schema, &mut result);
    check_dex_options(schema, &mut result);
    check_desugaring(schema, &mut result);
    check_signing(schema, &mut result);
    check_versioning(schema, &mut result);
    check_compatibility(schema, &mut result);
    check_duplicate_dependencies(schema, &mut result);

    if result.is_valid() {
        tracing::debug!(
            warnings = result.warnings().len(),
            "descriptor validation passed"
        );
    } else {
        tracing::debug!(errors = result.errors().len(), "descriptor validation failed");
    }

    result
}

/// Validate a descriptor, converting violations to a typed error
pub fn ensure_valid(schema: &DescriptorSchema) -> Result<()> {
    validate_descriptor(schema).to_result()
}

fn check_sdk_versions(schema: &DescriptorSchema, result: &mut ValidationResult) {
    let sdk = &schema.sdk;

    if !(sdk.min_sdk <= sdk.target_sdk && sdk.target_sdk <= sdk.compile_sdk) {
        result.add_error(ValidationError {
            field: "sdk".to_string(),
            message: "SDK levels must satisfy min_sdk <= target_sdk <= compile_sdk".to_string(),
            code: "SDK_ORDER".to_string(),
            expected: Some("min_sdk <= target_sdk <= compile_sdk".to_string()),
            actual: Some(format!(
                "min_sdk={}, target_sdk={}, compile_sdk={}",
                sdk.min_sdk, sdk.target_sdk, sdk.compile_sdk
            )),
        });
    }

    if schema.features.notifications && sdk.min_sdk < NOTIFICATION_MIN_SDK {
        result.add_error(ValidationError {
            field: "sdk.min_sdk".to_string(),
            message: format!(
                "Notification support requires min_sdk >= {}",
                NOTIFICATION_MIN_SDK
            ),
            code: "SDK_FLOOR".to_string(),
            expected: Some(format!(">= {}", NOTIFICATION_MIN_SDK)),
            actual: Some(sdk.min_sdk.to_string()),
        });
    }
}

fn check_dex_options(schema: &DescriptorSchema, result: &mut ValidationResult) {
    if let Some(count) = schema.dex.estimated_method_count {
        if count > DEX_METHOD_LIMIT && !schema.dex.multidex {
            result.add_error(ValidationError {
                field: "dex.multidex".to_string(),
                message: format!(
                    "Estimated method count {} exceeds the single-dex limit of {}; multidex must be enabled",
                    count, DEX_METHOD_LIMIT
                ),
                code: "MULTIDEX_REQUIRED".to_string(),
                expected: Some("multidex = true".to_string()),
                actual: Some("multidex = false".to_string()),
            });
        }
    }
}

fn check_desugaring(schema: &DescriptorSchema, result: &mut ValidationResult) {
    let has_desugaring_dep = schema.desugaring_dependencies().next().is_some();
    let enabled = schema.compatibility.core_library_desugaring;

    if enabled && !has_desugaring_dep {
        result.add_error(ValidationError {
            field: "compatibility.core_library_desugaring".to_string(),
            message: "Desugaring is enabled but no coredesugaring-scoped dependency is declared"
                .to_string(),
            code: "DESUGARING".to_string(),
            expected: Some("a dependency with scope = \"coredesugaring\"".to_string()),
            actual: Some("none declared".to_string()),
        });
    }

    if !enabled && has_desugaring_dep {
        result.add_error(ValidationError {
            field: "dependencies".to_string(),
            message: "A coredesugaring-scoped dependency is declared but desugaring is disabled"
                .to_string(),
            code: "DESUGARING".to_string(),
            expected: Some("core_library_desugaring = true".to_string()),
            actual: Some("core_library_desugaring = false".to_string()),
        });
    }
}

fn check_signing(schema: &DescriptorSchema, result: &mut ValidationResult) {
    for (variant, build_type) in &schema.build_types {
        if !schema.signing.contains_key(&build_type.signing_config) {
            result.add_error(ValidationError {
                field: format!("build_types.{}.signing_config", variant),
                message: format!(
                    "Build type '{}' references unknown signing profile '{}'",
                    variant, build_type.signing_config
                ),
                code: "SIGNING".to_string(),
                expected: Some(format!(
                    "one of: {}",
                    schema
                        .signing
                        .keys()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
                actual: Some(build_type.signing_config.clone()),
            });
        }
    }
}

fn check_versioning(schema: &DescriptorSchema, result: &mut ValidationResult) {
    let versioning = &schema.versioning;

    if versioning.version_code == 0 {
        result.add_error(ValidationError {
            field: "versioning.version_code".to_string(),
            message: "version_code must be at least 1".to_string(),
            code: "VERSION_CODE".to_string(),
            expected: Some(">= 1".to_string()),
            actual: Some("0".to_string()),
        });
    }

    if let Some(previous) = versioning.previous_version_code {
        if versioning.version_code <= previous {
            result.add_error(ValidationError {
                field: "versioning.version_code".to_string(),
                message: "version_code must increase between releases".to_string(),
                code: "VERSION_CODE".to_string(),
                expected: Some(format!("> {}", previous)),
                actual: Some(versioning.version_code.to_string()),
            });
        }
    }
}

fn check_compatibility(schema: &DescriptorSchema, result: &mut ValidationResult) {
    let compat = &schema.compatibility;

    if compat.source_compatibility != compat.target_compatibility {
        result.add_warning(ValidationError {
            field: "compatibility".to_string(),
            message: format!(
                "source_compatibility ({}) differs from target_compatibility ({})",
                compat.source_compatibility, compat.target_compatibility
            ),
            code: "WARNING".to_string(),
            expected: None,
            actual: None,
        });
    }

    if compat.jvm_target != compat.target_compatibility {
        result.add_warning(ValidationError {
            field: "compatibility.jvm_target".to_string(),
            message: format!(
                "jvm_target ({}) differs from target_compatibility ({})",
                compat.jvm_target, compat.target_compatibility
            ),
            code: "WARNING".to_string(),
            expected: None,
            actual: None,
        });
    }
}

fn check_duplicate_dependencies(schema: &DescriptorSchema, result: &mut ValidationResult) {
    let mut seen = std::collections::HashSet::new();
    for dep in &schema.dependencies {
        if !seen.insert(&dep.coordinate) {
            result.add_warning(ValidationError {
                field: "dependencies".to_string(),
                message: format!("Coordinate declared more than once: {}", dep.coordinate),
                code: "WARNING".to_string(),
                expected: None,
                actual: Some(dep.coordinate.to_string()),
            });
        }
    }
}

/// Check whether the declared dependencies cover notification support:
/// WorkManager plus core-ktx, per the support-library requirements.
pub fn has_notification_dependencies(schema: &DescriptorSchema) -> bool {
    let declared: Vec<String> = schema
        .dependencies
        .iter()
        .filter(|d| d.scope == DependencyScope::Implementation)
        .map(|d| d.coordinate.to_string())
        .collect();

    declared.iter().any(|c| c == "androidx.work:work-runtime-ktx")
        && declared.iter().any(|c| c == "androidx.core:core-ktx")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Descriptor, STARTER_DESCRIPTOR};

    fn starter() -> DescriptorSchema {
        Descriptor::from_toml_str(STARTER_DESCRIPTOR).unwrap().schema
    }

    #[test]
    fn test_starter_descriptor_is_valid() {
        let result = validate_descriptor(&starter());
        assert!(result.is_valid(), "errors: {:?}", result.errors());
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn test_sdk_ordering_holds_after_validate() {
        let schema = starter();
        assert!(ensure_valid(&schema).is_ok());
        assert!(schema.sdk.min_sdk <= schema.sdk.target_sdk);
        assert!(schema.sdk.target_sdk <= schema.sdk.compile_sdk);
    }

    #[test]
    fn test_min_sdk_above_target_is_invalid() {
        let mut schema = starter();
        schema.sdk.min_sdk = 30;
        schema.sdk.target_sdk = 21;

        let err = ensure_valid(&schema).unwrap_err();
        assert!(err.is_invalid());
        assert_eq!(err.code, ErrorCode::SdkOrderViolation);
    }

    #[test]
    fn test_target_above_compile_is_invalid() {
        let mut schema = starter();
        schema.sdk.target_sdk = schema.sdk.compile_sdk + 1;

        let result = validate_descriptor(&schema);
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].code, "SDK_ORDER");
    }

    #[test]
    fn test_notification_floor() {
        let mut schema = starter();
        schema.sdk.min_sdk = 19;

        let result = validate_descriptor(&schema);
        assert!(result.errors().iter().any(|e| e.code == "SDK_FLOOR"));
    }

    #[test]
    fn test_notification_floor_not_enforced_without_feature() {
        let mut schema = starter();
        schema.features.notifications = false;
        schema.sdk.min_sdk = 19;

        let result = validate_descriptor(&schema);
        assert!(!result.errors().iter().any(|e| e.code == "SDK_FLOOR"));
    }

    #[test]
    fn test_multidex_required_over_method_limit() {
        let mut schema = starter();
        schema.dex.multidex = false;
        schema.dex.estimated_method_count = Some(DEX_METHOD_LIMIT + 1);

        let err = ensure_valid(&schema).unwrap_err();
        assert_eq!(err.code, ErrorCode::MultidexRequired);
    }

    #[test]
    fn test_multidex_not_required_under_method_limit() {
        let mut schema = starter();
        schema.dex.multidex = false;
        schema.dex.estimated_method_count = Some(DEX_METHOD_LIMIT);

        let result = validate_descriptor(&schema);
        assert!(!result.errors().iter().any(|e| e.code == "MULTIDEX_REQUIRED"));
    }

    #[test]
    fn test_desugaring_without_support_dependency() {
        let mut schema = starter();
        schema.dependencies.retain(|d| d.scope != DependencyScope::CoreDesugaring);

        let err = ensure_valid(&schema).unwrap_err();
        assert_eq!(err.code, ErrorCode::DesugaringMismatch);
    }

    #[test]
    fn test_desugaring_dependency_without_flag() {
        let mut schema = starter();
        schema.compatibility.core_library_desugaring = false;

        let result = validate_descriptor(&schema);
        assert!(result.errors().iter().any(|e| e.code == "DESUGARING"));
    }

    #[test]
    fn test_unknown_signing_profile() {
        let mut schema = starter();
        schema
            .build_types
            .get_mut("release")
            .unwrap()
            .signing_config = "upload".to_string();

        let err = ensure_valid(&schema).unwrap_err();
        assert_eq!(err.code, ErrorCode::SigningUnresolved);
    }

    #[test]
    fn test_invalid_application_id() {
        let mut schema = starter();
        schema.application.application_id = "not a domain".to_string();

        let err = ensure_valid(&schema).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidIdentifier);
    }

    #[test]
    fn test_single_segment_identifier_rejected() {
        let mut schema = starter();
        schema.application.namespace = "app".to_string();

        let result = validate_descriptor(&schema);
        assert!(result.errors().iter().any(|e| e.code == "IDENTIFIER"));
    }

    #[test]
    fn test_version_code_zero_rejected() {
        let mut schema = starter();
        schema.versioning.version_code = 0;

        let err = ensure_valid(&schema).unwrap_err();
        assert_eq!(err.code, ErrorCode::VersionCodeInvalid);
    }

    #[test]
    fn test_version_code_must_increase() {
        let mut schema = starter();
        schema.versioning.version_code = 5;
        schema.versioning.previous_version_code = Some(5);

        let result = validate_descriptor(&schema);
        assert!(result.errors().iter().any(|e| e.code == "VERSION_CODE"));
    }

    #[test]
    fn test_compat_mismatch_is_warning_only() {
        let mut schema = starter();
        schema.compatibility.source_compatibility =
            crate::descriptor::schema::JavaLevel::V17;

        let result = validate_descriptor(&schema);
        assert!(result.is_valid());
        assert!(!result.warnings().is_empty());
    }

    #[test]
    fn test_duplicate_dependency_warns() {
        let mut schema = starter();
        let dup = schema.dependencies[1].clone();
        schema.dependencies.push(dup);

        let result = validate_descriptor(&schema);
        assert!(result.is_valid());
        assert!(result
            .warnings()
            .iter()
            .any(|w| w.message.contains("androidx.multidex:multidex")));
    }

    #[test]
    fn test_notification_dependencies_detected() {
        assert!(has_notification_dependencies(&starter()));

        let mut schema = starter();
        schema
            .dependencies
            .retain(|d| d.coordinate.artifact != "work-runtime-ktx");
        assert!(!has_notification_dependencies(&schema));
    }
}
