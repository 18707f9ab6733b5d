//! Datodia CLI - Generate fixture containers outside of a build script.

mod colors;
mod config;
mod generate;
mod inspect;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "datodia")]
#[command(about = "Generate test fixture containers for Rust crates")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate datodia.rs for a crate
    Generate {
        /// Source directory of the crate
        #[arg(default_value = "src")]
        src: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Print the generated file instead of writing it
        #[arg(long)]
        print: bool,

        #[command(flatten)]
        options: config::OptionArgs,
    },

    /// List the builders the container would register
    Inspect {
        /// Source directory of the crate
        #[arg(default_value = "src")]
        src: PathBuf,

        /// Also list how every pipeline step ran
        #[arg(long)]
        steps: bool,

        #[command(flatten)]
        options: config::OptionArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            src,
            out,
            print,
            options,
        } => generate::execute(&src, &out, print, &options)?,

        Commands::Inspect {
            src,
            steps,
            options,
        } => inspect::execute(&src, steps, &options)?,
    }

    Ok(())
}
