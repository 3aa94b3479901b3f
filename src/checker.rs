//! Grading policy over a parsed [`Report`].
//!
//! A fatal signal that is not explicitly allowed fails the run outright. Otherwise the
//! run completes and the presence of errors and leaks is reported separately.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use libc::c_int;
use serde::Serialize;
use tokio::fs::{self, OpenOptions};
use tracing::debug;

use crate::config::{MarkerConfig, SignalConfig};
use crate::error::Result;
use crate::report::Report;
use crate::signal::signal_from_name;

/// Outcome of checking one report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Verdict {
    /// The program died from a signal outside the allowed set
    Signaled {
        signame: String,
        /// One of the usual crash signals, as opposed to something surprising
        expected: bool,
    },
    Completed { error_count: usize, leak_count: usize },
}

impl Verdict {
    pub fn exit_code(&self) -> u8 {
        match self {
            Verdict::Signaled { .. } => 1,
            Verdict::Completed { .. } => 0,
        }
    }
}

/// Signal policy resolved to platform signal numbers
#[derive(Debug, Clone)]
pub struct Checker {
    allowed: HashSet<c_int>,
    expected: HashSet<c_int>,
}

impl Checker {
    pub fn new(signals: &SignalConfig) -> Result<Self> {
        Ok(Self {
            allowed: resolve_signals(&signals.allowed)?,
            expected: resolve_signals(&signals.expected)?,
        })
    }

    pub fn evaluate(&self, report: &Report) -> Verdict {
        if let Some(signal) = report.fatal_signal() {
            // A name the platform doesn't know is never allowed
            let signo = signal.signal().ok();
            let allowed = signo.is_some_and(|s| self.allowed.contains(&s));
            debug!(signame = %signal.signame, ?signo, allowed, "fatal signal in report");

            if !allowed {
                return Verdict::Signaled {
                    signame: signal.signame.clone(),
                    expected: signo.is_some_and(|s| self.expected.contains(&s)),
                };
            }
        }

        Verdict::Completed {
            error_count: report.error_count(),
            leak_count: report.leak_count(),
        }
    }
}

fn resolve_signals(names: &[String]) -> Result<HashSet<c_int>> {
    names.iter().map(|name| signal_from_name(name)).collect()
}

/// Touches marker files and appends the configured item to them
pub struct MarkerWriter<'a> {
    config: &'a MarkerConfig,
}

impl<'a> MarkerWriter<'a> {
    pub fn new(config: &'a MarkerConfig) -> Self {
        Self { config }
    }

    /// Marker files this verdict calls for, in the order they are written
    pub fn targets(&self, verdict: &Verdict) -> Vec<&'a Path> {
        match verdict {
            Verdict::Signaled { .. } => vec![self.config.fatal_signal_file.as_path()],
            Verdict::Completed {
                error_count,
                leak_count,
            } => {
                let mut targets = Vec::new();
                if *error_count > 0 {
                    targets.push(self.config.error_file.as_path());
                }
                if *leak_count > 0 {
                    targets.push(self.config.leak_file.as_path());
                }
                targets
            }
        }
    }

    /// Write the markers for `verdict`, returning the files touched
    pub async fn apply(&self, verdict: &Verdict) -> io::Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for path in self.targets(verdict) {
            touch(path).await?;
            if let Some(item) = &self.config.write_item {
                append_item(path, item, &self.config.delimiter).await?;
            }
            debug!(path = %path.display(), "wrote marker file");
            written.push(path.to_path_buf());
        }
        Ok(written)
    }
}

async fn touch(path: &Path) -> io::Result<()> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map(drop)
}

/// Append `item` to the delimiter-separated list stored in `path`
pub async fn append_item(path: &Path, item: &str, delimiter: &str) -> io::Result<()> {
    let previous = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };

    let previous = previous.trim();
    let mut items: Vec<&str> = if previous.is_empty() {
        Vec::new()
    } else {
        previous.split(delimiter).collect()
    };
    items.push(item);

    fs::write(path, format!("{}\n", items.join(delimiter))).await
}
