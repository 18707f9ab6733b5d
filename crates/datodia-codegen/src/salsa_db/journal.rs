//! Execution journal and cooperative cancellation.
//!
//! Salsa does not say whether a query result was recomputed or reused, so
//! every tracked step records its own execution here. The driver combines the
//! journal with output fingerprints to classify each step output.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A tracked pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    /// Collect one file's `mod` declarations.
    Modules,
    /// Walk the module tree from the crate root.
    Layout,
    /// Lower one file's syntax.
    Syntax,
    /// Collect one file's trait implementations.
    Capabilities,
    /// Merge trait implementations of all files.
    CapabilityIndex,
    /// Merge declared types of all files.
    ItemIndex,
    /// Extract marked builders from one file.
    MarkedBuilders,
    /// Extract records from one file.
    Records,
    /// Combine built-in, marked and record builders.
    Aggregate,
    /// Render the container.
    ContainerSource,
    /// Render record builders.
    RecordSources,
}

impl Step {
    pub const ALL: [Step; 11] = [
        Step::Modules,
        Step::Layout,
        Step::Syntax,
        Step::Capabilities,
        Step::CapabilityIndex,
        Step::ItemIndex,
        Step::MarkedBuilders,
        Step::Records,
        Step::Aggregate,
        Step::ContainerSource,
        Step::RecordSources,
    ];

    /// Tracking name of the step.
    pub fn as_str(self) -> &'static str {
        match self {
            Step::Modules => "modules",
            Step::Layout => "crate_layout",
            Step::Syntax => "syntax",
            Step::Capabilities => "capabilities",
            Step::CapabilityIndex => "capability_index",
            Step::ItemIndex => "item_index",
            Step::MarkedBuilders => "marked_builders",
            Step::Records => "records",
            Step::Aggregate => "aggregate",
            Step::ContainerSource => "container_source",
            Step::RecordSources => "record_sources",
        }
    }

    /// Whether the step runs once per source file.
    pub fn is_per_file(self) -> bool {
        matches!(
            self,
            Step::Modules
                | Step::Syntax
                | Step::Capabilities
                | Step::MarkedBuilders
                | Step::Records
        )
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Records which `(step, input)` pairs actually executed.
#[derive(Debug, Clone, Default)]
pub struct StepJournal {
    entries: Arc<Mutex<Vec<(Step, String)>>>,
}

impl StepJournal {
    pub fn record(&self, step: Step, key: impl Into<String>) {
        let key = key.into();
        tracing::debug!("Executing step {} for {}", step, key);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((step, key));
    }

    /// Take all recorded executions.
    pub fn drain(&self) -> Vec<(Step, String)> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Panic payload used to abandon a cancelled step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

/// Shared flag requesting that the current run stop.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Unwind out of the current step if cancellation was requested.
    ///
    /// Unwinding (rather than returning an empty result) keeps salsa from
    /// memoizing a partial output.
    pub fn check(&self) {
        if self.is_cancelled() {
            std::panic::resume_unwind(Box::new(Cancelled));
        }
    }
}
