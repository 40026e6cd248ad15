use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use metaform::domain::value_objects::TargetFormat;

/// metaform - decompose and recompose metadata documents
#[derive(Parser, Debug)]
#[command(name = "metaform")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv); METAFORM_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert components between the source and metadata formats
    Convert(ConvertArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Format to convert into
    #[arg(long, value_enum)]
    pub to: TargetFormat,

    /// Files or directories to convert
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Write into a fresh directory
    #[arg(short, long, required_unless_present = "merge", conflicts_with = "merge")]
    pub output_dir: Option<PathBuf>,

    /// Nest the output under this package name
    #[arg(long, requires = "output_dir")]
    pub package_name: Option<String>,

    /// Merge into the components found in these project directories
    #[arg(long, value_delimiter = ',')]
    pub merge: Vec<PathBuf>,

    /// Package directory new files go to when merging
    #[arg(long, requires = "merge")]
    pub default_directory: Option<PathBuf>,

    /// Project root (defaults to the nearest directory with metaform.toml or .git)
    #[arg(long)]
    pub project: Option<PathBuf>,

    /// Config file (defaults to <project>/metaform.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Show what would be written without writing
    #[arg(long)]
    pub dry_run: bool,
}
