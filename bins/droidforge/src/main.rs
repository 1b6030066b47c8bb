//! Droidforge CLI
//!
//! Loads, validates, and resolves declarative Android build descriptors.

use anyhow::Result;
use clap::{Parser, Subcommand};
use droidforge_cli::output::{format_count, Status};
use droidforge_core::descriptor::{Descriptor, STARTER_DESCRIPTOR};
use droidforge_core::error::{exit_codes, Error, ErrorCode};
use droidforge_core::registry::index::IndexRegistry;
use droidforge_core::registry::{resolve_all, PackageRegistry};
use droidforge_core::validation::{self, validate_descriptor};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "droidforge")]
#[command(about = "Declarative Android build descriptors: load, validate, resolve")]
#[command(version)]
struct Cli {
    /// Descriptor file path (default: search standard locations)
    #[arg(short, long, global = true)]
    descriptor: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the descriptor and check all semantic rules
    Validate,

    /// Resolve declared dependencies against a registry index
    Resolve {
        /// Registry index file
        #[arg(long, default_value = "registry-index.toml")]
        index: PathBuf,
    },

    /// Print the effective descriptor after defaults
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a starter descriptor
    Init {
        /// Where to write the descriptor
        #[arg(default_value = "droidforge.toml")]
        path: PathBuf,
    },

    /// Diagnose the descriptor and registry setup
    Doctor {
        /// Registry index file to check, if any
        #[arg(long)]
        index: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    init_tracing(cli.verbose, cli.quiet);

    let descriptor_path = cli.descriptor.as_deref();
    let exit_code = match cli.command {
        Commands::Validate => run_validate(descriptor_path),
        Commands::Resolve { index } => run_resolve(descriptor_path, &index),
        Commands::Show { json } => run_show(descriptor_path, json),
        Commands::Init { path } => run_init(&path),
        Commands::Doctor { index } => run_doctor(descriptor_path, index.as_deref()),
    };

    std::process::exit(exit_code);
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact());

    // Ignored if a subscriber is already installed (tests)
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Map an error to the process exit code for its family
fn exit_code_for(error: &Error) -> i32 {
    if error.is_malformed() {
        exit_codes::DESCRIPTOR_ERROR
    } else if error.is_invalid() {
        exit_codes::VALIDATION_ERROR
    } else if error.is_resolution() {
        exit_codes::RESOLUTION_ERROR
    } else {
        exit_codes::FAILURE
    }
}

fn load_descriptor(path: Option<&Path>) -> Result<Descriptor, i32> {
    match Descriptor::load(path) {
        Ok(descriptor) => Ok(descriptor),
        Err(e) => {
            Status::error(&format!("Failed to load descriptor: {}", e));
            Err(exit_code_for(&e))
        }
    }
}

fn run_validate(path: Option<&Path>) -> i32 {
    let descriptor = match load_descriptor(path) {
        Ok(d) => d,
        Err(code) => return code,
    };

    if let Some(p) = &descriptor.path {
        Status::info(&format!("Validating {}", p.display()));
    }

    let result = validate_descriptor(&descriptor.schema);

    for warning in result.warnings() {
        Status::warning(&warning.to_string());
    }

    if result.is_valid() {
        let sdk = &descriptor.schema.sdk;
        Status::success(&format!(
            "Descriptor is valid (min_sdk={}, target_sdk={}, compile_sdk={})",
            sdk.min_sdk, sdk.target_sdk, sdk.compile_sdk
        ));
        exit_codes::SUCCESS
    } else {
        for error in result.errors() {
            Status::error(&error.to_string());
        }
        Status::error(&format!(
            "Validation failed with {}",
            format_count(result.errors().len(), "error", "errors")
        ));
        exit_codes::VALIDATION_ERROR
    }
}

fn run_resolve(path: Option<&Path>, index: &Path) -> i32 {
    let descriptor = match load_descriptor(path) {
        Ok(d) => d,
        Err(code) => return code,
    };

    if let Err(e) = validation::ensure_valid(&descriptor.schema) {
        Status::error(&format!("{}", e));
        return exit_code_for(&e);
    }

    let registry = match IndexRegistry::load(index) {
        Ok(r) => r,
        Err(e) => {
            Status::error(&format!("{}", e));
            return exit_code_for(&e);
        }
    };

    match resolve_all(&registry, &descriptor.schema.dependencies) {
        Ok(resolved) => {
            for artifact in &resolved {
                Status::success(&format!(
                    "{}:{} [{}]",
                    artifact.coordinate, artifact.version, artifact.scope
                ));
                Status::detail("path", &artifact.path);
                if let Some(sha256) = &artifact.sha256 {
                    Status::detail("sha256", sha256);
                }
            }
            Status::success(&format!(
                "Resolved {}",
                format_count(resolved.len(), "artifact", "artifacts")
            ));
            exit_codes::SUCCESS
        }
        Err(e) => {
            Status::error(&format!("{}", e));
            exit_code_for(&e)
        }
    }
}

fn run_show(path: Option<&Path>, json: bool) -> i32 {
    let descriptor = match load_descriptor(path) {
        Ok(d) => d,
        Err(code) => return code,
    };

    let rendered = if json {
        serde_json::to_string_pretty(&descriptor.schema).map_err(Error::from)
    } else {
        toml::to_string_pretty(&descriptor.schema).map_err(|e| {
            Error::new(ErrorCode::Internal, format!("Failed to render descriptor: {}", e))
        })
    };

    match rendered {
        Ok(text) => {
            println!("{}", text);
            exit_codes::SUCCESS
        }
        Err(e) => {
            Status::error(&format!("{}", e));
            exit_codes::FAILURE
        }
    }
}

fn run_init(path: &Path) -> i32 {
    if path.exists() {
        Status::error(&format!(
            "Refusing to overwrite existing {}",
            path.display()
        ));
        return exit_codes::FAILURE;
    }

    match std::fs::write(path, STARTER_DESCRIPTOR) {
        Ok(()) => {
            Status::success(&format!("Wrote starter descriptor to {}", path.display()));
            exit_codes::SUCCESS
        }
        Err(e) => {
            Status::error(&format!("Failed to write {}: {}", path.display(), e));
            exit_codes::FAILURE
        }
    }
}

fn run_doctor(path: Option<&Path>, index: Option<&Path>) -> i32 {
    Status::header("Descriptor");

    let descriptor = match Descriptor::load(path) {
        Ok(d) => {
            if let Some(p) = &d.path {
                Status::success(&format!("Descriptor loads: {}", p.display()));
            } else {
                Status::success("Descriptor loads");
            }
            d
        }
        Err(e) => {
            Status::error(&format!("{}", e));
            return exit_code_for(&e);
        }
    };

    let schema = &descriptor.schema;
    let result = validate_descriptor(schema);
    if result.is_valid() {
        Status::success("Semantic rules pass");
    } else {
        for error in result.errors() {
            Status::error(&error.to_string());
        }
    }
    for warning in result.warnings() {
        Status::warning(&warning.to_string());
    }

    Status::header("Features");
    Status::detail("application_id", &schema.application.application_id);
    Status::detail(
        "sdk",
        &format!(
            "min={} target={} compile={}",
            schema.sdk.min_sdk, schema.sdk.target_sdk, schema.sdk.compile_sdk
        ),
    );
    Status::detail("multidex", &schema.dex.multidex.to_string());
    Status::detail(
        "desugaring",
        &schema.compatibility.core_library_desugaring.to_string(),
    );
    Status::detail("notifications", &schema.features.notifications.to_string());

    if schema.features.notifications && !validation::has_notification_dependencies(schema) {
        Status::warning(
            "Notifications are declared but work-runtime-ktx and core-ktx are not both present",
        );
    }

    let mut exit = if result.is_valid() {
        exit_codes::SUCCESS
    } else {
        exit_codes::VALIDATION_ERROR
    };

    if let Some(index_path) = index {
        Status::header("Registry");
        match IndexRegistry::load(index_path) {
            Ok(registry) => {
                Status::success(&format!(
                    "Index loads: {} ({})",
                    index_path.display(),
                    format_count(registry.package_count(), "package", "packages")
                ));

                let missing: Vec<String> = schema
                    .dependencies
                    .iter()
                    .filter(|d| registry.lookup(&d.coordinate, &d.version).is_none())
                    .map(|d| format!("{}:{}", d.coordinate, d.version))
                    .collect();

                if missing.is_empty() {
                    Status::success("All declared coordinates are resolvable");
                } else {
                    for coordinate in &missing {
                        Status::error(&format!("Not in index: {}", coordinate));
                    }
                    exit = exit_codes::RESOLUTION_ERROR;
                }
            }
            Err(e) => {
                Status::error(&format!("{}", e));
                exit = exit_code_for(&e);
            }
        }
    }

    exit
}
