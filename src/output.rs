//! Simple Output and Reporting
//!
//! This module renders checker verdicts and parsed reports for the terminal.

use serde_json::json;

use crate::checker::Verdict;
use crate::cli::VerbosityLevel;
use crate::report::Report;

const RED: &str = "31";
const GREEN: &str = "32";

/// Simple output formatter for human-readable results
pub struct Output {
    verbosity: VerbosityLevel,
    show_colors: bool,
}

impl Output {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    pub fn with_colors(verbosity: VerbosityLevel, show_colors: bool) -> Self {
        Self {
            verbosity,
            show_colors,
        }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    /// Verdict lines, preceded by the full report when verbose
    pub fn format_results(&self, report: &Report, verdict: &Verdict) -> String {
        let mut output = String::new();

        if self.verbosity >= VerbosityLevel::Verbose {
            output.push_str(&report.to_string());
            output.push('\n');
        }

        for line in self.verdict_lines(verdict) {
            output.push_str(&line);
            output.push('\n');
        }

        output
    }

    /// One colored line per finding; quiet mode keeps only the fatal-signal lines
    pub fn verdict_lines(&self, verdict: &Verdict) -> Vec<String> {
        let quiet = self.verbosity == VerbosityLevel::Quiet;
        let mut lines = Vec::new();

        match verdict {
            Verdict::Signaled { signame, expected } => {
                lines.push(self.colorize(&format!("Fatal signal observed: {}", signame), RED));
                if !*expected {
                    lines.push(self.colorize("Unexpected signal: ask for advice.", RED));
                } else if !quiet {
                    lines.push(self.colorize("Do not award memory points.", RED));
                }
            }
            Verdict::Completed {
                error_count,
                leak_count,
            } => {
                if quiet {
                    return lines;
                }

                lines.push(if *error_count > 0 {
                    self.colorize("[ Errors present ]", RED)
                } else {
                    self.colorize("[ No errors ]", GREEN)
                });
                lines.push(if *leak_count > 0 {
                    self.colorize("[ Leaks present ]", RED)
                } else {
                    self.colorize("[ No leaks ]", GREEN)
                });

                if self.verbosity == VerbosityLevel::Debug {
                    lines.push(format!(
                        "errors: {}, leaks: {}",
                        error_count, leak_count
                    ));
                }
            }
        }

        lines
    }

    /// The parsed report and the verdict as a pretty-printed JSON document
    pub fn format_json(&self, report: &Report, verdict: &Verdict) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&json!({
            "report": report,
            "verdict": verdict,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "<valgrindoutput><protocolversion>4</protocolversion>\
        <protocoltool>memcheck</protocoltool><preamble/><pid>7</pid><ppid>1</ppid>\
        <tool>memcheck</tool><args><vargv><exe>valgrind</exe></vargv><argv><exe>./a.out</exe></argv></args>\
        <error><kind>InvalidWrite</kind><what>Invalid write of size 1</what></error>\
        <status><state>RUNNING</state><time>0</time></status>\
        <status><state>FINISHED</state><time>1</time></status></valgrindoutput>";

    fn completed(error_count: usize, leak_count: usize) -> Verdict {
        Verdict::Completed {
            error_count,
            leak_count,
        }
    }

    #[test]
    fn test_completed_lines() {
        let output = Output::with_colors(VerbosityLevel::Normal, false);
        assert_eq!(
            output.verdict_lines(&completed(1, 0)),
            vec!["[ Errors present ]", "[ No leaks ]"]
        );
        assert_eq!(
            output.verdict_lines(&completed(0, 3)),
            vec!["[ No errors ]", "[ Leaks present ]"]
        );
    }

    #[test]
    fn test_quiet_keeps_only_signal_lines() {
        let output = Output::with_colors(VerbosityLevel::Quiet, false);
        assert!(output.verdict_lines(&completed(2, 2)).is_empty());

        let expected = Verdict::Signaled {
            signame: "SIGSEGV".to_string(),
            expected: true,
        };
        assert_eq!(
            output.verdict_lines(&expected),
            vec!["Fatal signal observed: SIGSEGV"]
        );

        let unexpected = Verdict::Signaled {
            signame: "SIGUSR2".to_string(),
            expected: false,
        };
        assert_eq!(
            output.verdict_lines(&unexpected),
            vec![
                "Fatal signal observed: SIGUSR2",
                "Unexpected signal: ask for advice."
            ]
        );
    }

    #[test]
    fn test_colors() {
        let output = Output::with_colors(VerbosityLevel::Normal, true);
        let lines = output.verdict_lines(&completed(0, 0));
        assert_eq!(lines[0], "\x1b[32m[ No errors ]\x1b[0m");
    }

    #[test]
    fn test_verbose_includes_report() {
        let report = Report::parse_str(REPORT).unwrap();
        let verdict = completed(report.error_count(), report.leak_count());

        let normal = Output::with_colors(VerbosityLevel::Normal, false);
        assert_eq!(
            normal.format_results(&report, &verdict),
            "[ Errors present ]\n[ No leaks ]\n"
        );

        let verbose = Output::with_colors(VerbosityLevel::Verbose, false);
        let formatted = verbose.format_results(&report, &verdict);
        assert!(formatted.starts_with("Valgrind executable: valgrind\n"));
        assert!(formatted.contains("Error kind: InvalidWrite\n"));
        assert!(formatted.ends_with("[ Errors present ]\n[ No leaks ]\n"));
    }

    #[test]
    fn test_json_output() {
        let report = Report::parse_str(REPORT).unwrap();
        let verdict = completed(1, 0);
        let output = Output::with_colors(VerbosityLevel::Normal, false);

        let json: serde_json::Value =
            serde_json::from_str(&output.format_json(&report, &verdict).unwrap()).unwrap();
        assert_eq!(json["report"]["pid"], 7);
        assert_eq!(json["report"]["errors"][0]["kind"], "InvalidWrite");
        assert_eq!(json["verdict"]["outcome"], "completed");
        assert_eq!(json["verdict"]["error_count"], 1);
    }
}
