//! Unit tests for verdict rendering and error reporting

use std::path::Path;

use valparse::{Checker, ErrorReporter, Output, ParseError, Report, VerbosityLevel};
use valparse::config::SignalConfig;

use crate::common::test_helpers::{TestFixtures, report_with_body};

#[test]
fn test_verbose_output_for_signaled_run() {
    let fixtures = TestFixtures::new();
    let report = fixtures.load(fixtures.bad_report());
    let verdict = Checker::new(&SignalConfig::default())
        .unwrap()
        .evaluate(&report);

    let output = Output::with_colors(VerbosityLevel::Verbose, false);
    let text = output.format_results(&report, &verdict);

    assert!(text.contains("Name: SIGSEGV\n"));
    assert!(text.contains("Error kind: InvalidRead\n"));
    assert!(text.ends_with("Fatal signal observed: SIGSEGV\nDo not award memory points.\n"));
}

#[test]
fn test_custom_signal_policy() {
    let body = "<fatal_signal><tid>1</tid><signo>6</signo><signame>SIGABRT</signame>\
                <sicode>-6</sicode><siaddr>0x0</siaddr></fatal_signal>";
    let report = Report::parse_str(&report_with_body(body)).unwrap();

    let policy = SignalConfig {
        allowed: vec!["SIGABRT".to_string()],
        expected: vec!["SIGSEGV".to_string()],
    };
    let verdict = Checker::new(&policy).unwrap().evaluate(&report);

    let output = Output::with_colors(VerbosityLevel::Normal, false);
    assert_eq!(
        output.verdict_lines(&verdict),
        vec!["[ No errors ]", "[ No leaks ]"]
    );

    let strict = SignalConfig {
        allowed: vec![],
        expected: vec![],
    };
    let verdict = Checker::new(&strict).unwrap().evaluate(&report);
    assert_eq!(
        output.verdict_lines(&verdict),
        vec![
            "Fatal signal observed: SIGABRT",
            "Unexpected signal: ask for advice."
        ]
    );
}

#[test]
fn test_parse_error_messages_match_crash_hint() {
    let reporter = ErrorReporter::new(VerbosityLevel::Quiet);
    let path = Path::new("student/vg.xml");

    let err = Report::parse_str("<valgrindoutput><protocolversion>3</protocolversion></valgrindoutput>")
        .unwrap_err();
    assert!(matches!(err, ParseError::Version(_)));
    assert_eq!(
        reporter.format_parse_error(path, &err),
        "Exception raised: Unsupported version: 3. The tested executable might have failed..."
    );

    let err = Report::from_file("/definitely/not/here.xml").unwrap_err();
    assert_eq!(
        reporter.format_parse_error(path, &err),
        "File 'student/vg.xml' not found. The tested executable might have failed..."
    );
}
