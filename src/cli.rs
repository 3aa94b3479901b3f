use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only show the fatal-signal verdict and failures
    Quiet,
    /// Show the error/leak verdict lines
    #[default]
    Normal,
    /// Also show the full report
    Verbose,
    /// Show all available debugging information
    Debug,
}

impl VerbosityLevel {
    /// Default `tracing` filter directive for this level
    pub fn log_filter(self) -> &'static str {
        match self {
            VerbosityLevel::Quiet | VerbosityLevel::Normal => "warn",
            VerbosityLevel::Verbose => "info",
            VerbosityLevel::Debug => "debug",
        }
    }
}

/// How the checker prints its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Verdict lines, plus the full report when verbose
    #[default]
    Human,
    /// The parsed report and verdict as JSON
    Json,
}

/// Check a Valgrind XML report for memory errors, leaks and fatal signals
#[derive(Parser, Debug, Clone)]
#[command(name = "valparse")]
#[command(about = "Parse Valgrind XML output files")]
#[command(version)]
pub struct Cli {
    /// The XML file to parse
    #[arg(value_name = "XML_FILE")]
    pub xmlfile: PathBuf,

    /// Create marker files for errors or leaks found
    #[arg(short = 'f', long = "create-files")]
    pub create_files: bool,

    /// File to create if memory errors are found, if -f is set
    #[arg(long = "error-file", value_name = "FILENAME")]
    pub error_file: Option<PathBuf>,

    /// File to create if memory leaks are found, if -f is set
    #[arg(long = "leak-file", value_name = "FILENAME")]
    pub leak_file: Option<PathBuf>,

    /// File to create if a fatal signal is caught, if -f is set
    #[arg(long = "fatal-signal-file", value_name = "FILENAME")]
    pub fatal_signal_file: Option<PathBuf>,

    /// Value to append to error or leak files, if -f is set
    #[arg(long = "write-item", value_name = "ITEM")]
    pub write_item: Option<String>,

    /// Delimiter for the error/leak file value list, if -f is set
    #[arg(long = "write-item-delimiter", value_name = "DELIM")]
    pub write_item_delimiter: Option<String>,

    /// Don't print leak/error messages
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print the full report before the verdict
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Print debugging information
    #[arg(long = "debug")]
    pub debug: bool,

    /// Output format
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write every suppression in the report to this suppression file
    #[arg(long = "dump-suppressions", value_name = "FILE")]
    pub dump_suppressions: Option<PathBuf>,

    /// Append to the suppression file instead of truncating it
    #[arg(long = "append", requires = "dump_suppressions")]
    pub append: bool,

    /// Name dumped suppressions <PREFIX>-1, <PREFIX>-2, ... instead of by their own name
    #[arg(
        long = "suppression-prefix",
        value_name = "PREFIX",
        requires = "dump_suppressions"
    )]
    pub suppression_prefix: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(delimiter) = &self.write_item_delimiter
            && delimiter.is_empty()
        {
            return Err("Write item delimiter must not be empty".to_string());
        }
        if let Some(prefix) = &self.suppression_prefix
            && prefix.trim().is_empty()
        {
            return Err("Suppression prefix must not be empty".to_string());
        }
        Ok(())
    }

    /// Verbosity requested on the command line alone
    pub fn verbosity(&self) -> VerbosityLevel {
        if self.debug {
            VerbosityLevel::Debug
        } else if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}
