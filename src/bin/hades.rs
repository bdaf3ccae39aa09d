//! `hades` binary: log one record from a shell script.
//!
//! Usage:
//!   hades [--name N] [--dir D] [--level L] [--config F] [--no-highlight]
//!         [--json] [--exit CODE] <level> <where> [what] [results...]

use clap::Parser;
use hades::cli::{Cli, run};
use std::process::ExitCode;

fn main() -> ExitCode {
    run(Cli::parse())
}
