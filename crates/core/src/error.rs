//! Error handling for descriptor processing
//!
//! This module provides structured error types with:
//! - Numeric error codes grouped by family
//! - Detailed error context
//! - Recovery suggestions
//! - Serializable error reports
//!
//! The three fatal families the build pipeline distinguishes are malformed
//! descriptors (3xxx), semantically invalid descriptors (4xxx), and
//! dependency resolution failures (5xxx).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // General errors (1xxx)
    Unknown = 1000,
    Internal = 1001,

    // IO errors (2xxx)
    IoError = 2000,
    FileNotFound = 2001,
    PermissionDenied = 2002,

    // Malformed descriptor errors (3xxx)
    MalformedDescriptor = 3000,
    DescriptorNotFound = 3001,
    DescriptorParseError = 3002,
    MissingField = 3003,
    InvalidFieldValue = 3004,

    // Invalid descriptor errors (4xxx)
    InvalidDescriptor = 4000,
    InvalidIdentifier = 4001,
    SdkOrderViolation = 4002,
    SdkFloorViolation = 4003,
    MultidexRequired = 4004,
    DesugaringMismatch = 4005,
    SigningUnresolved = 4006,
    VersionCodeInvalid = 4007,

    // Dependency resolution errors (5xxx)
    ResolutionError = 5000,
    UnresolvableCoordinate = 5001,
    RegistryIndexError = 5002,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            1 => "General",
            2 => "IO",
            3 => "Descriptor",
            4 => "Validation",
            5 => "Resolution",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {}", ctx)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Convert to a serializable report
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code,
            code_str: self.code.to_string(),
            category: self.code.category().to_string(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            source: self.source.as_ref().map(|e| e.to_string()),
        }
    }

    /// True for the malformed-descriptor family (3xxx)
    pub fn is_malformed(&self) -> bool {
        self.code.code() / 1000 == 3
    }

    /// True for the invalid-descriptor family (4xxx)
    pub fn is_invalid(&self) -> bool {
        self.code.code() / 1000 == 4
    }

    /// True for the resolution family (5xxx)
    pub fn is_resolution(&self) -> bool {
        self.code.code() / 1000 == 5
    }

    // Convenience constructors

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IoError, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedDescriptor, message)
    }

    pub fn descriptor_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::DescriptorNotFound,
            format!("Descriptor not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Run 'droidforge init' to create a starter droidforge.toml")
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field is missing: {}", field),
        )
        .with_suggestion(format!("Add '{}' to the descriptor", field))
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidDescriptor, message)
    }

    pub fn resolution(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResolutionError, message)
    }

    pub fn unresolvable(coordinate: &str, version: &str) -> Self {
        Self::new(
            ErrorCode::UnresolvableCoordinate,
            format!("Unresolvable coordinate: {}:{}", coordinate, version),
        )
        .with_suggestion("Check the coordinate spelling and the registry index contents")
    }
}

/// Serializable error report for logging and JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub code_str: String,
    pub category: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for CLI commands
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const VALIDATION_ERROR: i32 = 2;
    pub const DESCRIPTOR_ERROR: i32 = 3;
    pub const RESOLUTION_ERROR: i32 = 6;
}

// Implement From for common error types

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(
            ErrorCode::DescriptorParseError,
            format!("TOML parse error: {}", err),
        )
        .with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(
            ErrorCode::DescriptorParseError,
            format!("JSON error: {}", err),
        )
        .with_source(err)
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::new(ErrorCode::Internal, format!("Regex error: {}", err)).with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_suggestion(suggestion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::MalformedDescriptor.to_string(), "E3000");
        assert_eq!(ErrorCode::UnresolvableCoordinate.to_string(), "E5001");
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::DescriptorParseError.category(), "Descriptor");
        assert_eq!(ErrorCode::SdkOrderViolation.category(), "Validation");
        assert_eq!(ErrorCode::UnresolvableCoordinate.category(), "Resolution");
    }

    #[test]
    fn test_error_families() {
        assert!(Error::missing_field("application_id").is_malformed());
        assert!(Error::new(ErrorCode::SdkOrderViolation, "bad order").is_invalid());
        assert!(Error::unresolvable("androidx.core:core-ktx", "1.15.0").is_resolution());
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::descriptor_not_found("/path/to/droidforge.toml")
            .with_context("While loading build configuration");

        assert_eq!(err.code, ErrorCode::DescriptorNotFound);
        assert!(err.context.is_some());
        assert!(err.suggestion.is_some());
    }

    #[test]
    fn test_error_report_serialization() {
        let err = Error::unresolvable("androidx.work:work-runtime-ktx", "2.10.0")
            .with_context("During dependency resolution");

        let report = err.to_report();
        let json = serde_json::to_string(&report).unwrap();

        assert!(json.contains("E5001"));
        assert!(json.contains("Resolution"));
    }
}
