//! Salsa input types for the generator.
//!
//! Input types are the entry points for incremental computation.
//! Changes to inputs automatically invalidate dependent queries.

use std::path::PathBuf;

use super::Db;
use crate::options::{GeneratorOptions, MarkerPolicy};

/// Input: one source file of the host crate.
///
/// Whether and where the file sits in the module tree is derived from the
/// crate's `mod` declarations, not from the path alone.
#[salsa::input]
pub struct SourceFile {
    /// Path to the source file
    pub path: PathBuf,

    /// Content of the source file
    pub text: String,
}

/// Input: the set of source files making up the crate, in file order.
#[salsa::input]
pub struct Compilation {
    pub files: Vec<SourceFile>,

    /// Directory holding the crate root file (`lib.rs` or `main.rs`)
    pub source_dir: PathBuf,
}

/// Input: extraction and emission settings.
///
/// Mirrors [`GeneratorOptions`]; changing any field invalidates every
/// extraction and emission step.
#[salsa::input]
pub struct GeneratorSettings {
    pub policy: MarkerPolicy,

    /// Last path segment of the marker attribute
    pub marker: String,

    /// Path of the builder trait
    pub capability: String,

    /// Module holding generated record builders
    pub generated_root: String,
}

impl GeneratorSettings {
    /// Snapshot the settings as plain options.
    pub fn options(self, db: &dyn Db) -> GeneratorOptions {
        GeneratorOptions {
            policy: self.policy(db),
            marker: self.marker(db),
            capability: self.capability(db),
            generated_root: self.generated_root(db),
        }
    }
}
