//! Trestle CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use trestle::TrestleError;
use trestle_cli::{Args, error_adapter::to_reports};

fn report(err: &TrestleError) {
    let reporter = miette::GraphicalReportHandler::new();

    // Render each diagnostic independently
    for report in to_reports(err) {
        let mut writer = String::new();
        reporter
            .render_report(&mut writer, &report)
            .expect("Writing to String buffer is infallible");

        error!("{writer}");
    }
}

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting Trestle");
    debug!(args:?; "Parsed arguments");

    match trestle_cli::run(&args) {
        Ok(run) if run.is_success() => {
            info!(files = run.written().len(); "Completed successfully");
        }
        Ok(run) => {
            for (symbol, err) in run.failures() {
                error!(symbol; "Production could not be drawn");
                report(err);
            }
            process::exit(1);
        }
        Err(err) => {
            report(&err);
            process::exit(1);
        }
    }
}
