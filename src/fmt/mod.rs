//! Record rendering: markup highlighting, cause unwinding, colors, and the line
//! composer that ties them together.

pub mod cause;
mod color;
mod highlight;
mod record;

pub use cause::{Link, unwind};
pub use color::{Color, colorize, strip_ansi};
pub use highlight::highlight;
pub use record::{DEFAULT_TIME_FORMAT, FormattedRecord, Formatter, format_event};
