//! Command-line interface: emit one record from a shell script.

mod log;

pub use log::{parse_result, run};

use crate::level::Level;
use clap::Parser;
use std::path::PathBuf;

/// hades - log one where/what/results record from the command line.
#[derive(Debug, Parser)]
#[command(name = "hades", version, about = "Log one where/what/results record")]
pub struct Cli {
    /// Log name; files are <dir>/<name>.log and <dir>/<name>.stack.log
    #[arg(long)]
    pub name: Option<String>,

    /// Log directory (console only when unset)
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Minimum level to emit
    #[arg(long, value_name = "LEVEL")]
    pub level: Option<Level>,

    /// Options file (defaults to ~/.config/hades/hades.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Locale for level labels (en, zh)
    #[arg(long, value_name = "CODE")]
    pub locale: Option<String>,

    /// Disable ~[term] / ~{value} highlighting and level colors
    #[arg(long)]
    pub no_highlight: bool,

    /// Parse results that look like JSON as structured values
    #[arg(long)]
    pub json: bool,

    /// Exit with CODE after logging
    #[arg(long, value_name = "CODE", allow_negative_numbers = true)]
    pub exit: Option<i32>,

    /// Print hades' own diagnostics
    #[arg(short, long)]
    pub verbose: bool,

    /// Record level: trace, debug, info, warn, error, fatal or mark
    pub record: Level,

    /// Where the record comes from
    pub place: String,

    /// What happened
    #[arg(default_value = "")]
    pub what: String,

    /// Results, one field each
    pub results: Vec<String>,
}
