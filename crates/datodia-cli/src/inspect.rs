//! Inspect command implementation.
//!
//! Prints the registration set without writing anything.

use std::path::Path;

use datodia_codegen::{GeneratorDriver, Severity};

use crate::colors;
use crate::config::OptionArgs;

/// Execute the inspect command.
pub fn execute(src: &Path, steps: bool, args: &OptionArgs) -> anyhow::Result<()> {
    if !src.is_dir() {
        anyhow::bail!("Source directory not found: {}", src.display());
    }

    let mut driver = GeneratorDriver::new(args.resolve()?);
    let files = driver.add_directory(src)?;
    let result = driver.run()?;

    println!(
        "\n{}Datodia{} - {} builders from {} files",
        colors::BOLD,
        colors::RESET,
        result.definitions.len(),
        files
    );
    println!("{}", "─".repeat(50));

    for definition in &result.definitions {
        let kind = if definition.constructor.is_some() {
            "generated"
        } else if definition.namespace.starts_with("::") {
            "built-in"
        } else {
            "marked"
        };
        println!(
            "  {}{:<10}{} {}",
            colors::DIM,
            kind,
            colors::RESET,
            definition
        );
    }

    if !result.diagnostics.is_empty() {
        println!();
        for diagnostic in &result.diagnostics {
            let color = match diagnostic.severity {
                Severity::Warning => colors::YELLOW,
                Severity::Error => colors::BOLD,
            };
            println!("  {}{}{}", color, diagnostic, colors::RESET);
        }
    }

    if steps {
        println!();
        for run in &result.tracked_steps {
            println!(
                "  {}{:<17}{} {:<10} {}",
                colors::CYAN,
                run.step,
                colors::RESET,
                run.reason,
                run.key
            );
        }
    }

    Ok(())
}
