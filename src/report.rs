//! Report parser for Valgrind XML output, protocol version 4.
//!
//! See <https://sourceware.org/git/?p=valgrind.git;a=blob_plain;f=docs/internals/xml-output-protocol4.txt>
//!
//! The first six children of `<valgrindoutput>` are checked in order; everything after
//! that prefix is located by tag name. Any violation aborts the parse, so a [`Report`]
//! only ever exists fully validated.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use roxmltree::{Document, Node};
use serde::Serialize;
use tracing::debug;

use crate::accessor::{children_named, find, require_parsed};
use crate::error::{ParseError, Result};
use crate::kind::ErrorKind;
use crate::record::{Arguments, Status, ValgrindError};
use crate::signal::FatalSignal;
use crate::suppression::{Suppression, SuppressionCount};

/// Protocol versions this parser understands
pub const SUPPORTED_VERSIONS: &[&str] = &["4"];

/// Valgrind tools this parser understands
pub const SUPPORTED_TOOLS: &[&str] = &["memcheck"];

const ROOT_TAG: &str = "valgrindoutput";

/// A fully parsed and validated Valgrind run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pid: u32,
    ppid: u32,
    tool: String,
    args: Arguments,
    status: Status,
    errors: Vec<ValgrindError>,
    leaks: Vec<ValgrindError>,
    unique_error_kinds: BTreeSet<ErrorKind>,
    unique_leak_kinds: BTreeSet<ErrorKind>,
    total_bytes_leaked: u64,
    supp_counts: Vec<SuppressionCount>,
    suppressions: Vec<Suppression>,
    fatal_signal: Option<FatalSignal>,
}

/// Next element child, which must be tagged `tag`
fn expect_tag<'a, 'input>(
    children: &mut impl Iterator<Item = Node<'a, 'input>>,
    tag: &str,
    message: &str,
) -> Result<Node<'a, 'input>> {
    children
        .next()
        .filter(|node| node.tag_name().name() == tag)
        .ok_or_else(|| ParseError::format(message))
}

fn node_text(node: Node<'_, '_>) -> String {
    node.text().unwrap_or_default().trim().to_string()
}

impl Report {
    /// Parse a report from the root element of an already-loaded document tree
    pub fn from_root(root: Node<'_, '_>) -> Result<Self> {
        if !root.is_element() || root.tag_name().name() != ROOT_TAG {
            return Err(ParseError::format("No valgrindoutput tag at top level."));
        }

        let mut children = root.children().filter(|node| node.is_element());

        let version = node_text(expect_tag(
            &mut children,
            "protocolversion",
            "Nonexistent or incorrect protocolversion tag.",
        )?);
        if !SUPPORTED_VERSIONS.contains(&version.as_str()) {
            return Err(ParseError::Version(version));
        }

        let protocol_tool = node_text(expect_tag(
            &mut children,
            "protocoltool",
            "Nonexistent or incorrect protocoltool tag.",
        )?);
        if !SUPPORTED_TOOLS.contains(&protocol_tool.as_str()) {
            return Err(ParseError::Tool(protocol_tool));
        }

        expect_tag(&mut children, "preamble", "No preamble tag.")?;
        let pid_node = expect_tag(&mut children, "pid", "No pid tag.")?;
        let pid: u32 = require_parsed(pid_node, ".", "pid")?;
        let ppid_node = expect_tag(&mut children, "ppid", "No ppid tag.")?;
        let ppid: u32 = require_parsed(ppid_node, ".", "ppid")?;
        let tool = node_text(expect_tag(&mut children, "tool", "No tool tag.")?);
        debug!(%version, %tool, pid, ppid, "validated report prefix");

        let args = find(root, "args")
            .ok_or_else(|| ParseError::format("No args tag."))
            .and_then(Arguments::from_element)?;

        let (leaks, errors): (Vec<_>, Vec<_>) = children_named(root, "error")
            .map(ValgrindError::from_element)
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .partition(ValgrindError::is_leak);

        let supp_counts = match find(root, "suppcounts") {
            Some(container) => children_named(container, "pair")
                .map(SuppressionCount::from_element)
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        let suppressions = children_named(root, "suppression")
            .map(Suppression::from_element)
            .collect::<Result<Vec<_>>>()?;

        let mut signals = children_named(root, "fatal_signal");
        let fatal_signal = signals.next().map(FatalSignal::from_element).transpose()?;
        if signals.next().is_some() {
            return Err(ParseError::format("More than one fatal_signal tag."));
        }

        let statuses: Vec<_> = children_named(root, "status").collect();
        let status = Status::from_elements(&statuses)?;

        let total_bytes_leaked = leaks
            .iter()
            .try_fold(0u64, |total, leak| total.checked_add(leak.bytes_leaked))
            .ok_or_else(|| ParseError::format("Total leaked bytes overflow."))?;

        let report = Self {
            pid,
            ppid,
            tool,
            args,
            status,
            unique_error_kinds: errors.iter().map(|e| e.kind).collect(),
            unique_leak_kinds: leaks.iter().map(|l| l.kind).collect(),
            total_bytes_leaked,
            errors,
            leaks,
            supp_counts,
            suppressions,
            fatal_signal,
        };

        debug!(
            errors = report.error_count(),
            leaks = report.leak_count(),
            suppressions = report.suppressions.len(),
            fatal_signal = report.has_fatal_signal(),
            "parsed report"
        );
        Ok(report)
    }

    pub fn from_document(doc: &Document<'_>) -> Result<Self> {
        Self::from_root(doc.root_element())
    }

    /// Parse XML text into a tree, then into a report
    pub fn parse_str(text: &str) -> Result<Self> {
        let doc = Document::parse(text)?;
        Self::from_document(&doc)
    }

    /// Read and parse a report file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::parse_str(&text)
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn ppid(&self) -> u32 {
        self.ppid
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn args(&self) -> &Arguments {
        &self.args
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Error-classified diagnostics in document order
    pub fn errors(&self) -> &[ValgrindError] {
        &self.errors
    }

    /// Leak-classified diagnostics in document order
    pub fn leaks(&self) -> &[ValgrindError] {
        &self.leaks
    }

    pub fn unique_error_kinds(&self) -> &BTreeSet<ErrorKind> {
        &self.unique_error_kinds
    }

    pub fn unique_leak_kinds(&self) -> &BTreeSet<ErrorKind> {
        &self.unique_leak_kinds
    }

    pub fn supp_counts(&self) -> &[SuppressionCount] {
        &self.supp_counts
    }

    /// Top-level `<suppression>` records
    pub fn suppressions(&self) -> &[Suppression] {
        &self.suppressions
    }

    /// Top-level suppressions followed by those generated for individual diagnostics
    pub fn all_suppressions(&self) -> impl Iterator<Item = &Suppression> {
        self.suppressions.iter().chain(
            self.errors
                .iter()
                .chain(&self.leaks)
                .filter_map(|e| e.suppression.as_ref()),
        )
    }

    pub fn fatal_signal(&self) -> Option<&FatalSignal> {
        self.fatal_signal.as_ref()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_leaks(&self) -> bool {
        !self.leaks.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn leak_count(&self) -> usize {
        self.leaks.len()
    }

    pub fn unique_error_count(&self) -> usize {
        self.unique_error_kinds.len()
    }

    pub fn unique_leak_count(&self) -> usize {
        self.unique_leak_kinds.len()
    }

    pub fn total_bytes_leaked(&self) -> u64 {
        self.total_bytes_leaked
    }

    pub fn has_fatal_signal(&self) -> bool {
        self.fatal_signal.is_some()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n\n", self.args)?;

        if let Some(signal) = &self.fatal_signal {
            write!(f, "Fatal signal:\n{}\n\n", signal)?;
        }

        write!(f, "Status:\n{}\n\n", self.status)?;

        write!(f, "Errors present: {}\n\n", self.error_count())?;
        for error in &self.errors {
            writeln!(f, "{}", error)?;
        }

        write!(f, "\nLeaks present: {}\n\n", self.leak_count())?;
        for leak in &self.leaks {
            writeln!(f, "{}", leak)?;
        }

        write!(f, "\nSuppressions:\n")?;
        if self.suppressions.is_empty() {
            writeln!(f, "none")?;
        }
        for supp in &self.suppressions {
            writeln!(f, "{}", supp)?;
        }

        writeln!(f, "\nTotal bytes leaked: {}", self.total_bytes_leaked)
    }
}
