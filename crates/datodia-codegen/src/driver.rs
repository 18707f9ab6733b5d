//! Generator driver.
//!
//! Owns the salsa database and its inputs, runs the pipeline and reports how
//! every tracked step fared compared to the previous run.

use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use walkdir::WalkDir;

use crate::emit::{MODULE_TREE_FILE, render_module_tree};
use crate::error::{Error, Result};
use crate::model::{BuilderDefinition, Diagnostic, GeneratedSource, Severity, codes};
use crate::options::{GeneratorOptions, MarkerPolicy};
use crate::salsa_db::{
    COMPILATION_KEY, CancellationFlag, Cancelled, Compilation, Db, GeneratorDatabase,
    GeneratorSettings, QueryResult, SourceFile, Step, aggregated_builders, capability_index,
    container_source, crate_layout, file_capabilities, file_key, file_syntax, item_index,
    marked_builders, module_declarations, record_sources, records,
};

/// How a tracked step output compares to the previous run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunReason {
    /// The output did not exist in the previous run.
    New,
    /// The step re-executed and produced a different output.
    Modified,
    /// The step re-executed and produced an equal output.
    Unchanged,
    /// The step did not re-execute.
    Cached,
    /// The output existed in the previous run but not in this one.
    Removed,
}

impl RunReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RunReason::New => "new",
            RunReason::Modified => "modified",
            RunReason::Unchanged => "unchanged",
            RunReason::Cached => "cached",
            RunReason::Removed => "removed",
        }
    }
}

impl fmt::Display for RunReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One tracked step output of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRun {
    pub step: Step,
    /// File path for per-file steps, `compilation` otherwise.
    pub key: String,
    pub reason: RunReason,
}

/// Output of [`GeneratorDriver::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// The container source followed by one source per record builder.
    pub sources: Vec<GeneratedSource>,
    /// The aggregated builder set, in registration order.
    pub definitions: Vec<BuilderDefinition>,
    pub diagnostics: Vec<Diagnostic>,
    /// Sorted by step, then key.
    pub tracked_steps: Vec<StepRun>,
}

impl RunResult {
    /// Find a generated source by hint name.
    pub fn source(&self, hint_name: &str) -> Option<&GeneratedSource> {
        self.sources.iter().find(|source| source.hint_name == hint_name)
    }

    /// Tracked outputs of one step.
    pub fn steps(&self, step: Step) -> impl Iterator<Item = &StepRun> {
        self.tracked_steps.iter().filter(move |run| run.step == step)
    }

    /// All sources assembled into one includable file.
    pub fn module_tree(&self) -> String {
        render_module_tree(&self.sources)
    }

    /// Write the module tree to `dir`, returning the written path.
    ///
    /// The file is left untouched when its content is already up to date.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(MODULE_TREE_FILE);
        let text = self.module_tree();

        let current = fs::read_to_string(&path).ok();
        if current.as_deref() != Some(text.as_str()) {
            fs::write(&path, text)?;
            tracing::debug!("Wrote {}", path.display());
        }

        Ok(path)
    }
}

/// Runs the generator over a set of source files.
///
/// Inputs persist between runs, so a run after an edit only re-executes the
/// steps the edit affects. Only files reachable through `mod` declarations
/// from the root file in [`source_dir`](Self::source_dir) contribute builders.
pub struct GeneratorDriver {
    db: GeneratorDatabase,
    options: GeneratorOptions,
    settings: GeneratorSettings,
    compilation: Compilation,
    /// Source files in file order.
    files: Vec<(PathBuf, SourceFile)>,
    /// Output fingerprints of the previous run.
    fingerprints: FxHashMap<(Step, String), u64>,
}

impl GeneratorDriver {
    pub fn new(options: GeneratorOptions) -> Self {
        let db = GeneratorDatabase::new();
        let settings = db.create_settings(&options);
        let compilation = db.create_compilation(Vec::new(), PathBuf::from("src"));

        Self {
            db,
            options,
            settings,
            compilation,
            files: Vec::new(),
            fingerprints: FxHashMap::default(),
        }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Replace the options. Only steps depending on changed fields re-run.
    pub fn set_options(&mut self, options: GeneratorOptions) {
        self.db.update_settings(self.settings, &options);
        self.options = options;
    }

    /// A handle that cancels the current (or next) run.
    pub fn cancellation(&self) -> CancellationFlag {
        self.db.cancellation().clone()
    }

    /// Paths of the tracked source files, in file order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|(path, _)| path.as_path())
    }

    /// Directory holding the crate root file. Defaults to `src`.
    pub fn source_dir(&self) -> PathBuf {
        self.compilation.source_dir(&self.db)
    }

    /// Move the crate root. Paths of sources are resolved against it.
    pub fn set_source_dir(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        if self.source_dir() != dir {
            self.db.update_source_dir(self.compilation, dir);
        }
    }

    /// Add or update a source file.
    ///
    /// The file takes part in generation once a `mod` declaration reaches it
    /// from the crate root, e.g. `src/lib.rs` declaring `mod models;` for
    /// `src/models.rs`.
    pub fn set_source(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        let path = path.into();
        let text = text.into();

        if let Some(&(_, file)) = self.files.iter().find(|(p, _)| *p == path) {
            if file.text(&self.db) != text {
                self.db.update_source(file, text);
            }
            return;
        }

        let file = self.db.set_source(path.clone(), text);
        self.files.push((path, file));
        self.sync_files();
    }

    /// Stop tracking a source file. Returns whether it was tracked.
    pub fn remove_source(&mut self, path: impl AsRef<Path>) -> bool {
        let before = self.files.len();
        self.files.retain(|(p, _)| p != path.as_ref());
        let removed = self.files.len() != before;
        if removed {
            self.sync_files();
        }
        removed
    }

    /// Load every `.rs` file below `root` and make it the source directory.
    ///
    /// Files are added in path order. `src/bin` is skipped since its files
    /// belong to other crates. Previously loaded files below `root` that no
    /// longer exist are removed. Returns the number of files found.
    pub fn add_directory(&mut self, root: impl AsRef<Path>) -> Result<usize> {
        let root = root.as_ref();
        self.set_source_dir(root);
        let mut found: FxHashSet<PathBuf> = FxHashSet::default();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !(entry.depth() == 1 && entry.file_name() == "bin"));

        for entry in walker {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "rs") {
                continue;
            }

            let text = fs::read_to_string(path)?;
            self.set_source(path.to_path_buf(), text);
            found.insert(path.to_path_buf());
        }

        let stale: Vec<PathBuf> = self
            .files
            .iter()
            .map(|(path, _)| path)
            .filter(|path| path.starts_with(root) && !found.contains(*path))
            .cloned()
            .collect();
        for path in stale {
            tracing::debug!("Removing {}", path.display());
            self.remove_source(&path);
        }

        tracing::debug!("Loaded {} source files from {}", found.len(), root.display());
        Ok(found.len())
    }

    fn sync_files(&mut self) {
        let files = self.files.iter().map(|(_, file)| *file).collect();
        self.db.update_files(self.compilation, files);
    }

    /// Run the pipeline.
    ///
    /// Returns [`Error::Cancelled`] when the cancellation flag is raised
    /// during the run; the flag is then cleared so the next run proceeds.
    pub fn run(&mut self) -> Result<RunResult> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.collect()));

        match outcome {
            Ok(result) => {
                tracing::info!(
                    "Generated {} builders ({} sources) from {} files",
                    result.definitions.len(),
                    result.sources.len(),
                    self.files.len()
                );
                Ok(result)
            }
            Err(payload) if payload.is::<Cancelled>() || payload.is::<salsa::Cancelled>() => {
                self.db.journal().drain();
                self.db.cancellation().reset();
                tracing::info!("Generation cancelled");
                Err(Error::Cancelled)
            }
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    fn collect(&mut self) -> RunResult {
        let db = &self.db;
        let compilation = self.compilation;
        let settings = self.settings;

        let container = container_source(db, compilation, settings);
        let mut sources = vec![container.clone()];
        let builders = record_sources(db, compilation, settings);
        sources.extend(builders.iter().cloned());
        let definitions = aggregated_builders(db, compilation, settings);

        let mut outputs: Vec<(Step, String, u64)> = Vec::new();
        let mut diagnostics = Vec::new();

        for (path, file) in &self.files {
            let key = file_key(db, *file);

            let modules = module_declarations(db, *file);
            outputs.push((Step::Modules, key.clone(), fingerprint(&modules)));

            let syntax = file_syntax(db, *file, compilation);
            if let QueryResult::Err(message) = &syntax
                && self.options.policy == MarkerPolicy::Diagnose
            {
                diagnostics.push(Diagnostic {
                    code: codes::UNPARSABLE_FILE,
                    severity: Severity::Warning,
                    message: message.clone(),
                    path: path.clone(),
                    line: 0,
                });
            }
            outputs.push((Step::Syntax, key.clone(), fingerprint(&syntax)));

            let impls = file_capabilities(db, *file, compilation);
            outputs.push((Step::Capabilities, key.clone(), fingerprint(&impls)));

            let marked = marked_builders(db, *file, compilation, settings);
            diagnostics.extend(marked.diagnostics.iter().cloned());
            outputs.push((Step::MarkedBuilders, key.clone(), fingerprint(&marked)));

            let found = records(db, *file, compilation, settings);
            outputs.push((Step::Records, key, fingerprint(&found)));
        }

        let compilation_outputs = [
            (Step::Layout, fingerprint(&crate_layout(db, compilation))),
            (Step::CapabilityIndex, fingerprint(&capability_index(db, compilation))),
            (Step::ItemIndex, fingerprint(&item_index(db, compilation))),
            (Step::Aggregate, fingerprint(&definitions)),
            (Step::ContainerSource, fingerprint(&container)),
            (Step::RecordSources, fingerprint(&builders)),
        ];
        for (step, hash) in compilation_outputs {
            outputs.push((step, COMPILATION_KEY.to_string(), hash));
        }

        let tracked_steps = self.classify(outputs);

        RunResult {
            sources,
            definitions,
            diagnostics,
            tracked_steps,
        }
    }

    /// Compare this run's outputs with the previous run's.
    fn classify(&mut self, outputs: Vec<(Step, String, u64)>) -> Vec<StepRun> {
        let executed: FxHashSet<(Step, String)> = self.db.journal().drain().into_iter().collect();
        let mut current: FxHashMap<(Step, String), u64> = FxHashMap::default();
        let mut tracked_steps = Vec::with_capacity(outputs.len());

        for (step, key, hash) in outputs {
            let id = (step, key);
            let reason = match self.fingerprints.get(&id) {
                None => RunReason::New,
                Some(_) if !executed.contains(&id) => RunReason::Cached,
                Some(previous) if *previous == hash => RunReason::Unchanged,
                Some(_) => RunReason::Modified,
            };
            tracked_steps.push(StepRun {
                step: id.0,
                key: id.1.clone(),
                reason,
            });
            current.insert(id, hash);
        }

        for (step, key) in self.fingerprints.keys() {
            if !current.contains_key(&(*step, key.clone())) {
                tracked_steps.push(StepRun {
                    step: *step,
                    key: key.clone(),
                    reason: RunReason::Removed,
                });
            }
        }

        tracked_steps.sort_by(|a, b| (a.step, &a.key).cmp(&(b.step, &b.key)));
        self.fingerprints = current;
        tracked_steps
    }
}

impl Default for GeneratorDriver {
    fn default() -> Self {
        Self::new(GeneratorOptions::default())
    }
}

fn fingerprint<T: Hash>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}
