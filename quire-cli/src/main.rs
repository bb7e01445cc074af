//! # quire CLI
//!
//! Command-line interface for the quire static wiki generator.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "quire.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the static site
    Build {
        /// Delete the output directory first if it exists
        #[arg(long)]
        overwrite: bool,

        /// Name shown in the header of every page
        #[arg(long, alias = "wiki_name")]
        wiki_name: Option<String>,

        /// HTML file shown above the listing on the home page
        #[arg(long, alias = "wiki_desc", value_name = "FILE")]
        wiki_desc: Option<PathBuf>,

        /// Output directory (overrides paths.output)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Exclude notes from the build, or include them again with --reverse
    Omit {
        /// Note files to mark
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Undo omission of the given files
        #[arg(long)]
        reverse: bool,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Build {
            overwrite,
            wiki_name,
            wiki_desc,
            output,
        } => {
            let overrides = commands::BuildOverrides {
                overwrite,
                wiki_name,
                wiki_desc,
                output,
            };
            commands::build_site(&cli.config, overrides)
        }
        Commands::Omit { files, reverse } => {
            commands::omit_files(&cli.config, &files, reverse).map(|_| ExitCode::SUCCESS)
        }
    }
}
