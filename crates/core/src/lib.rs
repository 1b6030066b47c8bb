//! Core library for Droidforge build descriptors
//!
//! This crate provides the typed build-configuration descriptor and the
//! operations a build front end needs:
//!
//! - **Descriptor**: TOML schema and loader for `droidforge.toml`
//! - **Validation**: semantic rules (SDK ordering, multidex, signing, ...)
//! - **Resolution**: dependency lookup against a package registry index
//! - **Error handling**: coded errors with context and recovery suggestions
//!
//! # Example
//!
//! ```rust,no_run
//! use droidforge_core::descriptor::Descriptor;
//! use droidforge_core::validation::ensure_valid;
//!
//! let descriptor = Descriptor::load(None).expect("no descriptor found");
//! ensure_valid(&descriptor.schema).expect("descriptor is invalid");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod descriptor;
pub mod error;
pub mod registry;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::descriptor::schema::{
        Coordinate, DependencyDeclaration, DependencyScope, DescriptorSchema,
    };
    pub use crate::descriptor::Descriptor;
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::registry::{resolve_all, PackageRegistry, ResolvedArtifact};
    pub use crate::validation::{validate_descriptor, ValidationResult, Validator};
}
