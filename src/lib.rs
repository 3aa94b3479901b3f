//! # valparse Library
//!
//! Parser for Valgrind Memcheck XML output (protocol version 4). Produces a validated,
//! strongly-typed [`Report`] for pass/fail decisions in grading and CI pipelines, and
//! writes [`Suppression`] records back out in Valgrind's suppression-file format.

pub mod accessor;
pub mod checker;
pub mod cli;
pub mod config;
pub mod error;
pub mod error_reporter;
pub mod frame;
pub mod kind;
pub mod output;
pub mod record;
pub mod report;
pub mod signal;
pub mod suppression;

pub use checker::{Checker, MarkerWriter, Verdict};
pub use cli::{Cli, OutputFormat, VerbosityLevel};
pub use config::{Config, ConfigError, ConfigManager};
pub use error::{ParseError, Result};
pub use error_reporter::ErrorReporter;
pub use frame::{Frame, SuppressionFrame};
pub use kind::{Category, ErrorKind};
pub use output::Output;
pub use record::{Arguments, Status, ValgrindError};
pub use report::{Report, SUPPORTED_TOOLS, SUPPORTED_VERSIONS};
pub use signal::{FatalSignal, signal_from_name};
pub use suppression::{
    Suppression, SuppressionCount, dump_suppressions, parse_raw_suppressions,
};
