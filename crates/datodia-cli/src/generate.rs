//! Generate command implementation.

use std::path::Path;
use std::time::Instant;

use datodia_codegen::GeneratorDriver;

use crate::colors;
use crate::config::OptionArgs;

/// Execute the generate command.
pub fn execute(src: &Path, out: &Path, print: bool, args: &OptionArgs) -> anyhow::Result<()> {
    if !src.is_dir() {
        anyhow::bail!("Source directory not found: {}", src.display());
    }

    let start = Instant::now();
    let mut driver = GeneratorDriver::new(args.resolve()?);
    let files = driver.add_directory(src)?;
    let result = driver.run()?;

    for diagnostic in &result.diagnostics {
        eprintln!("{}{}{}", colors::YELLOW, diagnostic, colors::RESET);
    }

    if print {
        print!("{}", result.module_tree());
        return Ok(());
    }

    let written = result.write_to(out)?;
    println!(
        "{}✓{} {} builders from {} files → {} ({:.2}ms)",
        colors::GREEN,
        colors::RESET,
        result.definitions.len(),
        files,
        written.display(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(())
}
