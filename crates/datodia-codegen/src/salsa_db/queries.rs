//! Salsa tracked query functions.
//!
//! These functions are memoized by Salsa. Results are cached and only
//! recomputed when their inputs change. Each one records its execution in the
//! database's [`StepJournal`](super::StepJournal) before doing any work.
//!
//! Per-file steps depend on their own file, its location in the module tree
//! and the settings, so editing one file re-executes only that file's steps.
//! Whole-crate steps re-execute when a per-file result changes, and are
//! backdated when their output is equal to the previous one.

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::aggregate;
use crate::catalog::builtin_builders;
use crate::emit::{render_container_source, render_record_builder_source};
use crate::extract::{self, FileContext};
use crate::layout::{CrateLayout, ModuleLocation, normalize_path};
use crate::model::{BuilderDefinition, Extraction, GeneratedSource};
use crate::symbols::{CapabilityIndex, ItemIndex};
use crate::syntax::{FileSyntax, ImplNode, ModuleDecl, SourceParser};

use super::Db;
use super::inputs::{Compilation, GeneratorSettings, SourceFile};
use super::journal::Step;

/// Journal key of compilation-wide steps.
pub const COMPILATION_KEY: &str = "compilation";

/// Result wrapper for Salsa queries that can fail.
///
/// Salsa needs `Clone + Eq + Hash` results, so the error is kept as a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryResult<T> {
    /// Query succeeded with a result
    Ok(T),
    /// Query failed with an error message
    Err(String),
}

impl<T> QueryResult<T> {
    /// Returns true if the query succeeded.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Returns true if the query failed.
    pub fn is_err(&self) -> bool {
        matches!(self, Self::Err(_))
    }

    /// Get the result if successful.
    pub fn ok(&self) -> Option<&T> {
        match self {
            Self::Ok(v) => Some(v),
            Self::Err(_) => None,
        }
    }

    /// Get the error message if failed.
    pub fn err(&self) -> Option<&str> {
        match self {
            Self::Ok(_) => None,
            Self::Err(e) => Some(e),
        }
    }
}

impl<T: Default> QueryResult<T> {
    /// The result, or `T::default()` on failure.
    pub fn unwrap_or_default(self) -> T {
        match self {
            Self::Ok(v) => v,
            Self::Err(_) => T::default(),
        }
    }
}

/// Journal key of a per-file step.
pub fn file_key(db: &dyn Db, file: SourceFile) -> String {
    file.path(db).display().to_string()
}

/// Tracked function: File module declarations of one source file.
///
/// Unparsable files declare nothing; [`file_syntax`] reports them.
#[salsa::tracked]
pub fn module_declarations(db: &dyn Db, file: SourceFile) -> Vec<ModuleDecl> {
    db.journal().record(Step::Modules, file_key(db, file));

    SourceParser::parse_modules(&file.text(db), &file.path(db)).unwrap_or_default()
}

/// Tracked function: The crate's module tree.
///
/// Only reads the declarations of files the walk reaches.
#[salsa::tracked]
pub fn crate_layout(db: &dyn Db, compilation: Compilation) -> CrateLayout {
    db.journal().record(Step::Layout, COMPILATION_KEY);

    let files: FxHashMap<PathBuf, SourceFile> = compilation
        .files(db)
        .into_iter()
        .map(|file| (normalize_path(&file.path(db)), file))
        .collect();

    CrateLayout::build(&compilation.source_dir(db), |path| {
        files
            .get(path)
            .map(|&file| module_declarations(db, file))
    })
}

/// Tracked function: Where `file` sits in the module tree, if anywhere.
///
/// Not journaled: it only projects [`crate_layout`], so that a layout change
/// elsewhere in the tree leaves this file's steps cached.
#[salsa::tracked]
pub fn file_location(
    db: &dyn Db,
    file: SourceFile,
    compilation: Compilation,
) -> Option<ModuleLocation> {
    crate_layout(db, compilation)
        .location(&file.path(db))
        .cloned()
}

/// Tracked function: Lower a source file's declarations.
///
/// Files outside the module tree lower to an empty syntax. Unparsable files
/// produce an error instead so the driver can report them.
#[salsa::tracked]
pub fn file_syntax(
    db: &dyn Db,
    file: SourceFile,
    compilation: Compilation,
) -> QueryResult<FileSyntax> {
    db.journal().record(Step::Syntax, file_key(db, file));

    let Some(location) = file_location(db, file, compilation) else {
        tracing::debug!("{} is not part of the module tree", file.path(db).display());
        return QueryResult::Ok(FileSyntax::default());
    };

    let path = file.path(db);
    let text = file.text(db);

    let mut parser = SourceParser::new(&location.module_path).module_visible(location.visible);
    match parser.parse_str(&text, &path) {
        Ok(syntax) => QueryResult::Ok(syntax),
        Err(e) => {
            tracing::warn!("Skipping {}: {}", path.display(), e);
            QueryResult::Err(e.to_string())
        }
    }
}

/// Tracked function: Trait implementations declared in one file.
#[salsa::tracked]
pub fn file_capabilities(
    db: &dyn Db,
    file: SourceFile,
    compilation: Compilation,
) -> Vec<ImplNode> {
    db.journal().record(Step::Capabilities, file_key(db, file));

    file_syntax(db, file, compilation).unwrap_or_default().impls
}

/// Tracked function: Trait implementations of the whole crate.
#[salsa::tracked]
pub fn capability_index(db: &dyn Db, compilation: Compilation) -> CapabilityIndex {
    db.journal().record(Step::CapabilityIndex, COMPILATION_KEY);

    let impls = compilation
        .files(db)
        .into_iter()
        .flat_map(|file| file_capabilities(db, file, compilation))
        .collect();
    CapabilityIndex::new(impls)
}

/// Tracked function: Types and traits declared anywhere in the crate.
#[salsa::tracked]
pub fn item_index(db: &dyn Db, compilation: Compilation) -> ItemIndex {
    db.journal().record(Step::ItemIndex, COMPILATION_KEY);

    ItemIndex::new(
        compilation
            .files(db)
            .into_iter()
            .flat_map(|file| file_syntax(db, file, compilation).unwrap_or_default().items),
    )
}

/// Tracked function: Marked builders declared in one file.
#[salsa::tracked]
pub fn marked_builders(
    db: &dyn Db,
    file: SourceFile,
    compilation: Compilation,
    settings: GeneratorSettings,
) -> Extraction {
    db.cancellation().check();
    db.journal().record(Step::MarkedBuilders, file_key(db, file));

    let Some(location) = file_location(db, file, compilation) else {
        return Extraction::default();
    };
    let QueryResult::Ok(syntax) = file_syntax(db, file, compilation) else {
        return Extraction::default();
    };

    // Files without marked structs must not depend on the crate-wide index.
    let marker = settings.marker(db);
    if !syntax
        .structs
        .iter()
        .any(|node| extract::is_marked_builder(node, &marker))
    {
        return Extraction::default();
    }

    let index = capability_index(db, compilation);
    let options = settings.options(db);
    let path = file.path(db);
    let ctx = FileContext {
        path: &path,
        module_path: &location.module_path,
        options: &options,
        cancellation: db.cancellation(),
    };
    extract::extract_marked_builders(ctx, &syntax, &index)
}

/// Tracked function: Records declared in one file.
#[salsa::tracked]
pub fn records(
    db: &dyn Db,
    file: SourceFile,
    compilation: Compilation,
    settings: GeneratorSettings,
) -> Extraction {
    db.cancellation().check();
    db.journal().record(Step::Records, file_key(db, file));

    let Some(location) = file_location(db, file, compilation) else {
        return Extraction::default();
    };
    let QueryResult::Ok(syntax) = file_syntax(db, file, compilation) else {
        return Extraction::default();
    };

    let options = settings.options(db);

    // Records whose fields only mention types of this file must not depend
    // on the crate-wide index.
    let foreign = syntax
        .structs
        .iter()
        .filter(|node| extract::is_record(node, &location.module_path, &options.marker))
        .flat_map(|node| node.shape.fields())
        .flat_map(|field| &field.type_paths)
        .any(|path| !syntax.declares(path));
    let items = if foreign {
        item_index(db, compilation)
    } else {
        ItemIndex::new(syntax.items.clone())
    };

    let path = file.path(db);
    let ctx = FileContext {
        path: &path,
        module_path: &location.module_path,
        options: &options,
        cancellation: db.cancellation(),
    };
    extract::extract_records(ctx, &syntax, &items)
}

/// Tracked function: The ordered, de-duplicated builder set.
#[salsa::tracked]
pub fn aggregated_builders(
    db: &dyn Db,
    compilation: Compilation,
    settings: GeneratorSettings,
) -> Vec<BuilderDefinition> {
    db.journal().record(Step::Aggregate, COMPILATION_KEY);

    let files = compilation.files(db);
    let marked: Vec<BuilderDefinition> = files
        .iter()
        .flat_map(|&file| marked_builders(db, file, compilation, settings).definitions)
        .collect();
    let record_definitions: Vec<BuilderDefinition> = files
        .iter()
        .flat_map(|&file| records(db, file, compilation, settings).definitions)
        .collect();

    aggregate::aggregate(builtin_builders(), marked, record_definitions)
}

/// Tracked function: The container source.
#[salsa::tracked]
pub fn container_source(
    db: &dyn Db,
    compilation: Compilation,
    settings: GeneratorSettings,
) -> GeneratedSource {
    db.cancellation().check();
    db.journal().record(Step::ContainerSource, COMPILATION_KEY);

    render_container_source(&aggregated_builders(db, compilation, settings))
}

/// Tracked function: One builder source per record.
#[salsa::tracked]
pub fn record_sources(
    db: &dyn Db,
    compilation: Compilation,
    settings: GeneratorSettings,
) -> Vec<GeneratedSource> {
    db.cancellation().check();
    db.journal().record(Step::RecordSources, COMPILATION_KEY);

    aggregated_builders(db, compilation, settings)
        .iter()
        .filter(|definition| definition.constructor.is_some())
        .map(render_record_builder_source)
        .collect()
}
