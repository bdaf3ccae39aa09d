//! The one thing the binary does: build a facade from options and flags, emit
//! the record, and flush.

use super::Cli;
use crate::config::Options;
use crate::event::Field;
use crate::internal;
use crate::level::Level;
use crate::logger::Hades;
use std::process::ExitCode;

/// Runs a parsed command line.
#[must_use]
pub fn run(cli: Cli) -> ExitCode {
    if cli.verbose {
        internal::init(Level::Debug);
    }

    if matches!(cli.record, Level::All | Level::Off) {
        internal::error(
            "CLI",
            &format!("{} is a threshold, not a record level", cli.record),
        );
        return ExitCode::FAILURE;
    }

    let file_options = match &cli.config {
        Some(path) => Options::load_from(path),
        None => Options::load(),
    };
    let file_options = match file_options {
        Ok(options) => options,
        Err(e) => {
            internal::error("CLI", &format!("Error loading options: {e}"));
            return ExitCode::FAILURE;
        }
    };

    // No init announcement unless the options file asks for one.
    let quiet = Options {
        announce_init: Some(false),
        ..Options::default()
    };
    let flags = Options {
        name: cli.name.clone(),
        level: cli.level,
        dir: cli.dir.clone(),
        locale: cli.locale.clone(),
        highlight: cli.no_highlight.then_some(false),
        init_immediately: Some(true),
        ..Options::default()
    };

    let hades = match Hades::builder()
        .options(quiet.merge(file_options).merge(flags))
        .reopen_on_hangup(false)
        .build()
    {
        Ok(hades) => hades,
        Err(e) => {
            internal::error("CLI", &format!("Error initializing: {e}"));
            return ExitCode::FAILURE;
        }
    };

    let results: Vec<Field> = cli
        .results
        .iter()
        .map(|r| parse_result(r, cli.json))
        .collect();

    if let Some(code) = cli.exit
        && cli.record == Level::Fatal
    {
        hades.fatal_e(code, &cli.place, &cli.what, &results);
    }

    hades.log(cli.record, None, &cli.place, &cli.what, &results);

    if let Err(e) = hades.shutdown() {
        internal::error("CLI", &e.to_string());
        return ExitCode::FAILURE;
    }

    match cli.exit {
        Some(code) => std::process::exit(code),
        None => ExitCode::SUCCESS,
    }
}

/// With `json` on, arguments that parse as a JSON object or array become
/// structured fields; everything else stays text.
#[must_use]
pub fn parse_result(arg: &str, json: bool) -> Field {
    let trimmed = arg.trim_start();
    if json && (trimmed.starts_with('{') || trimmed.starts_with('[')) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(arg) {
            return Field::Json(value);
        }
        internal::debug("CLI", &format!("not JSON, logging as text: {arg}"));
    }
    Field::from(arg)
}
