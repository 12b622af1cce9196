//! Command-line argument definitions for the Trestle CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the grammar, the productions to draw,
//! where the SVG files go, the configuration file and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Trestle railroad diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input EBNF grammar
    #[arg(help = "Path to the input grammar")]
    pub input: String,

    /// Directory the SVG files are written to
    #[arg(short, long, default_value = "out")]
    pub output: String,

    /// Production to draw; repeat for several. Defaults to every production
    #[arg(short, long = "symbol")]
    pub symbols: Vec<String>,

    /// Draw all selected productions into one SVG, top to bottom
    #[arg(long)]
    pub stacked: bool,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
