//! Incremental source generator for Datodia fixture containers.
//!
//! This crate provides:
//! - A module tree walk from the crate root over `mod` declarations
//! - Syntax lowering and type-path resolution with `syn`
//! - Discovery of marked builders and record types
//! - Aggregation into a de-duplicated registration set
//! - Emission of the `Container` and record builder sources
//! - Salsa-based incremental computation with per-step tracking
//! - A build-script front end ([`configure`])

pub mod aggregate;
pub mod build_script;
pub mod catalog;
pub mod driver;
pub mod emit;
pub mod error;
pub mod extract;
pub mod layout;
pub mod model;
pub mod options;
pub mod salsa_db;
pub mod symbols;
pub mod syntax;

pub use build_script::{Builder, configure};
pub use catalog::builtin_builders;
pub use driver::{GeneratorDriver, RunReason, RunResult, StepRun};
pub use error::{Error, Result};
pub use layout::{CrateLayout, ModuleLocation};
pub use model::{
    BuilderDefinition, Constructor, Diagnostic, Extraction, GeneratedSource, Parameter, Severity,
    codes,
};
pub use options::{GeneratorOptions, MarkerPolicy};
pub use salsa_db::{CancellationFlag, GeneratorDatabase, Step};
pub use symbols::{
    CapabilityIndex, DeclaredType, ItemIndex, full_namespace, implements_capability,
};
