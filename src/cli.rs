// src/cli.rs

//! CLI definitions for the pybake recipe generator
//!
//! Argument definitions live here; the command implementation is in the
//! `commands` module.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pybake")]
#[command(author = "Pybake Project")]
#[command(about = "Generate BitBake recipes for Python packages from PyPI metadata", long_about = None)]
pub struct Cli {
    /// The package to process
    #[arg(short, long)]
    pub package: Option<String>,

    /// The exact package version to resolve (defaults to the current release)
    #[arg(short = 'v', long)]
    pub version: Option<String>,

    /// A pip requirements file to process instead of a single package
    #[arg(short, long)]
    pub requirements: Option<PathBuf>,

    /// Follow conditional extras and generate grouping recipes for them
    #[arg(short, long)]
    pub extras: bool,

    /// The recipe output directory
    #[arg(short, long, default_value = "./")]
    pub outdir: PathBuf,

    /// The python runtime used in recipe names and dependency tokens
    #[arg(short = 'y', long, default_value = "python", value_parser = ["python", "python3"])]
    pub runtime: String,

    /// Dump the updated license map to the output directory on completion
    #[arg(short, long)]
    pub licenses: bool,

    /// The license to use when a package license cannot be mapped
    #[arg(short, long)]
    pub default_license: Option<String>,
}
