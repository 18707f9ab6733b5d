//! Salsa-based incremental computation database for the generator.
//!
//! This module provides memoized queries for:
//! - Module tree layout
//! - Source file lowering
//! - Capability (trait impl) and declared type indexing
//! - Marked-builder and record extraction
//! - Aggregation and source emission
//!
//! Changes to inputs automatically invalidate dependent queries,
//! enabling efficient incremental recomputation.
//!
//! # Module Organization
//!
//! - [`inputs`] - Input types (SourceFile, Compilation, GeneratorSettings)
//! - [`queries`] - Tracked query functions
//! - [`journal`] - Step execution journal and cancellation flag

mod inputs;
mod journal;
mod queries;

use std::path::PathBuf;

use salsa::Setter;

use crate::options::GeneratorOptions;

// Re-export public types
pub use inputs::{Compilation, GeneratorSettings, SourceFile};
pub use journal::{CancellationFlag, Cancelled, Step, StepJournal};
pub use queries::{
    COMPILATION_KEY, QueryResult, aggregated_builders, capability_index, container_source,
    crate_layout, file_capabilities, file_key, file_location, file_syntax, item_index,
    marked_builders, module_declarations, record_sources, records,
};

/// Database capabilities the tracked queries rely on.
#[salsa::db]
pub trait Db: salsa::Database {
    /// Journal receiving one entry per executed step.
    fn journal(&self) -> &StepJournal;

    /// Flag checked at the start of extraction and emission steps.
    fn cancellation(&self) -> &CancellationFlag;
}

/// The concrete database implementation.
///
/// Create an instance with [`GeneratorDatabase::new()`] and use the helper
/// methods to manage inputs.
#[salsa::db]
#[derive(Default, Clone)]
pub struct GeneratorDatabase {
    storage: salsa::Storage<Self>,
    journal: StepJournal,
    cancellation: CancellationFlag,
}

#[salsa::db]
impl salsa::Database for GeneratorDatabase {}

#[salsa::db]
impl Db for GeneratorDatabase {
    fn journal(&self) -> &StepJournal {
        &self.journal
    }

    fn cancellation(&self) -> &CancellationFlag {
        &self.cancellation
    }
}

impl GeneratorDatabase {
    /// Create a new database.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Input Management
    // =========================================================================

    /// Create a new source file input.
    pub fn set_source(&self, path: PathBuf, text: String) -> SourceFile {
        SourceFile::new(self, path, text)
    }

    /// Update an existing source file's content.
    ///
    /// This will invalidate all queries that depend on this source.
    pub fn update_source(&mut self, source: SourceFile, text: String) {
        source.set_text(self).to(text);
    }

    /// Create the compilation input.
    pub fn create_compilation(&self, files: Vec<SourceFile>, source_dir: PathBuf) -> Compilation {
        Compilation::new(self, files, source_dir)
    }

    /// Replace the file list of a compilation.
    pub fn update_files(&mut self, compilation: Compilation, files: Vec<SourceFile>) {
        compilation.set_files(self).to(files);
    }

    /// Move the crate root to another directory.
    ///
    /// This invalidates the layout and every step depending on a file's
    /// location.
    pub fn update_source_dir(&mut self, compilation: Compilation, source_dir: PathBuf) {
        compilation.set_source_dir(self).to(source_dir);
    }

    /// Create the settings input from options.
    pub fn create_settings(&self, options: &GeneratorOptions) -> GeneratorSettings {
        GeneratorSettings::new(
            self,
            options.policy,
            options.marker.clone(),
            options.capability.clone(),
            options.generated_root.clone(),
        )
    }

    /// Update settings, touching only the fields that changed.
    pub fn update_settings(&mut self, settings: GeneratorSettings, options: &GeneratorOptions) {
        if settings.policy(self) != options.policy {
            settings.set_policy(self).to(options.policy);
        }
        if settings.marker(self) != options.marker {
            settings.set_marker(self).to(options.marker.clone());
        }
        if settings.capability(self) != options.capability {
            settings.set_capability(self).to(options.capability.clone());
        }
        if settings.generated_root(self) != options.generated_root {
            settings
                .set_generated_root(self)
                .to(options.generated_root.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crate_root(db: &GeneratorDatabase, text: &str) -> (SourceFile, Compilation) {
        let file = db.set_source(PathBuf::from("src/lib.rs"), text.to_string());
        let compilation = db.create_compilation(vec![file], PathBuf::from("src"));
        (file, compilation)
    }

    #[test]
    fn test_update_source_invalidates_syntax() {
        let mut db = GeneratorDatabase::new();
        let (file, compilation) = crate_root(&db, "pub struct A;");

        let count = |db: &GeneratorDatabase| {
            file_syntax(db, file, compilation)
                .ok()
                .map(|s| s.structs.len())
        };
        assert_eq!(count(&db), Some(1));

        db.update_source(file, "pub struct A; pub struct B;".to_string());
        assert_eq!(count(&db), Some(2));
    }

    #[test]
    fn test_update_source_dir_relocates_root() {
        let mut db = GeneratorDatabase::new();
        let (file, compilation) = crate_root(&db, "pub struct A;");
        assert!(file_location(&db, file, compilation).is_some());

        db.update_source_dir(compilation, PathBuf::from("lib"));
        assert!(file_location(&db, file, compilation).is_none());
        assert_eq!(file_syntax(&db, file, compilation), QueryResult::Ok(Default::default()));
    }

    #[test]
    fn test_update_settings_changes_generated_root() {
        let mut db = GeneratorDatabase::new();
        let (_, compilation) = crate_root(&db, "pub struct A;");
        let settings = db.create_settings(&GeneratorOptions::default());

        let before = aggregated_builders(&db, compilation, settings);
        assert_eq!(before[3].namespace, "generated");

        db.update_settings(settings, &GeneratorOptions::default().with_generated_root("fixtures"));
        let after = aggregated_builders(&db, compilation, settings);
        assert_eq!(after[3].namespace, "fixtures");
    }

    #[test]
    fn test_unchanged_settings_do_not_invalidate() {
        let mut db = GeneratorDatabase::new();
        let (_, compilation) = crate_root(&db, "");
        let settings = db.create_settings(&GeneratorOptions::default());

        aggregated_builders(&db, compilation, settings);
        db.journal().drain();

        db.update_settings(settings, &GeneratorOptions::default());
        aggregated_builders(&db, compilation, settings);
        assert!(db.journal().drain().is_empty());
    }
}
