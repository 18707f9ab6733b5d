//! Generator options from the command line and config files.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueEnum};
use datodia_codegen::{GeneratorOptions, MarkerPolicy};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PolicyArg {
    /// Drop unusable marked structs silently
    Skip,
    /// Report unusable marked structs as warnings
    Diagnose,
}

impl From<PolicyArg> for MarkerPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Skip => MarkerPolicy::Skip,
            PolicyArg::Diagnose => MarkerPolicy::Diagnose,
        }
    }
}

/// Options shared by every command.
#[derive(Args, Debug, Default)]
pub struct OptionArgs {
    /// JSON file with generator options
    #[arg(long)]
    config: Option<PathBuf>,

    /// How to handle marked structs that cannot be registered
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Module holding generated record builders
    #[arg(long)]
    root: Option<String>,
}

impl OptionArgs {
    /// Resolve options: defaults, then the config file, then flags.
    pub fn resolve(&self) -> anyhow::Result<GeneratorOptions> {
        let mut options = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Invalid config {}", path.display()))?
            }
            None => GeneratorOptions::default(),
        };

        if let Some(policy) = self.policy {
            options = options.with_policy(policy.into());
        }
        if let Some(root) = &self.root {
            options = options.with_generated_root(root.clone());
        }

        tracing::debug!("Using options {:?}", options);
        Ok(options)
    }
}
