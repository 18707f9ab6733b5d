//! Build-script front end.
//!
//! ```rust,ignore
//! // build.rs
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     datodia_codegen::configure().compile("src")?;
//!     Ok(())
//! }
//! ```

use std::env;
use std::path::{Path, PathBuf};

use crate::driver::GeneratorDriver;
use crate::error::{Error, Result};
use crate::options::{GeneratorOptions, MarkerPolicy};

/// Start configuring code generation for a build script.
pub fn configure() -> Builder {
    Builder::default()
}

/// Configures and runs code generation from a build script.
#[derive(Debug, Clone)]
pub struct Builder {
    options: GeneratorOptions,
    out_dir: Option<PathBuf>,
    emit_rerun_if_changed: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            options: GeneratorOptions::default(),
            out_dir: None,
            emit_rerun_if_changed: true,
        }
    }
}

impl Builder {
    /// Replace all generator options.
    pub fn options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn policy(mut self, policy: MarkerPolicy) -> Self {
        self.options.policy = policy;
        self
    }

    /// Module holding generated record builders (default `generated`).
    pub fn generated_root(mut self, root: impl Into<String>) -> Self {
        self.options.generated_root = root.into();
        self
    }

    /// Output directory; defaults to `OUT_DIR`.
    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    /// Whether to print `cargo:rerun-if-changed` for the source directory.
    pub fn emit_rerun_if_changed(mut self, enable: bool) -> Self {
        self.emit_rerun_if_changed = enable;
        self
    }

    /// Generate `datodia.rs` for the crate whose sources live in `src_dir`.
    ///
    /// Relative paths are resolved against `CARGO_MANIFEST_DIR` when set.
    /// Diagnostics are surfaced as `cargo:warning` lines. Returns the path of
    /// the written file.
    pub fn compile(self, src_dir: impl AsRef<Path>) -> Result<PathBuf> {
        let src_dir = match env::var_os("CARGO_MANIFEST_DIR") {
            Some(manifest_dir) if src_dir.as_ref().is_relative() => {
                PathBuf::from(manifest_dir).join(src_dir.as_ref())
            }
            _ => src_dir.as_ref().to_path_buf(),
        };
        let out_dir = match self.out_dir {
            Some(dir) => dir,
            None => env::var_os("OUT_DIR")
                .map(PathBuf::from)
                .ok_or(Error::MissingOutDir)?,
        };

        let mut driver = GeneratorDriver::new(self.options);
        driver.add_directory(&src_dir)?;
        let result = driver.run()?;

        if self.emit_rerun_if_changed {
            println!("cargo:rerun-if-changed={}", src_dir.display());
        }
        for diagnostic in &result.diagnostics {
            println!("cargo:warning={diagnostic}");
        }

        result.write_to(&out_dir)
    }
}
