//! CLI logic for the Trestle railroad diagram tool.
//!
//! The grammar is parsed once; every selected production is then drawn
//! into its own SVG file, or all of them into one stacked file. A
//! production that fails to draw is reported and skipped.

pub mod error_adapter;
pub mod output;

mod args;
mod config;

pub use args::Args;

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{error, info, warn};

use trestle::{DiagramBuilder, TrestleError};

use output::FileNamer;

/// Outcome of a CLI run that got as far as drawing.
#[derive(Debug, Default)]
pub struct RunReport {
    written: Vec<PathBuf>,
    failures: Vec<(String, TrestleError)>,
}

impl RunReport {
    /// SVG files written, in the order they were produced.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Productions that could not be drawn, with the reason.
    pub fn failures(&self) -> &[(String, TrestleError)] {
        &self.failures
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run the Trestle CLI application
///
/// # Errors
///
/// Returns `TrestleError` for failures that stop the whole run:
/// - File I/O errors
/// - Configuration loading errors
/// - Parse and build errors
///
/// Failures of single productions are collected in the [`RunReport`].
pub fn run(args: &Args) -> Result<RunReport, TrestleError> {
    info!(
        input_path = args.input,
        output_dir = args.output;
        "Processing grammar"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let source = fs::read_to_string(&args.input)?;

    let builder = DiagramBuilder::new(app_config);
    let grammar = builder.parse(&source)?;

    let symbols: Vec<String> = if args.symbols.is_empty() {
        grammar.nonterminal_names().map(str::to_string).collect()
    } else {
        args.symbols.clone()
    };
    if symbols.is_empty() {
        warn!(input_path = args.input; "Grammar defines no productions");
    }

    let output_dir = Path::new(&args.output);
    fs::create_dir_all(output_dir)?;

    let mut report = RunReport::default();
    if args.stacked {
        if !symbols.is_empty() {
            let names: Vec<&str> = symbols.iter().map(String::as_str).collect();
            let svg = builder.render_stacked_svg(&grammar, &names)?;
            let stem = Path::new(&args.input)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let path = output_dir.join(format!("{}.svg", FileNamer::default().stem(&stem)));
            fs::write(&path, svg)?;
            info!(output_file = path.display().to_string(); "Stacked SVG exported successfully");
            report.written.push(path);
        }
        return Ok(report);
    }

    let mut namer = FileNamer::default();
    for symbol in symbols {
        match builder.render_svg(&grammar, &symbol) {
            Ok(svg) => {
                let path = output_dir.join(format!("{}.svg", namer.stem(&symbol)));
                fs::write(&path, svg)?;
                info!(symbol, output_file = path.display().to_string(); "SVG exported successfully");
                report.written.push(path);
            }
            Err(err) => {
                error!(symbol, err:%; "Skipping production");
                report.failures.push((symbol, err));
            }
        }
    }

    Ok(report)
}
