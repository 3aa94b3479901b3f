//! Suppression records and the suppression-file codec.
//!
//! Valgrind reads suppressions back from a plain text format:
//!
//! ```text
//! {
//!    <name>
//!    Memcheck:Leak
//!    match-leak-kinds: definite
//!    fun:malloc
//!    obj:/usr/lib/libfoo.so
//! }
//! ```
//!
//! Interior lines are indented by exactly three spaces.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use roxmltree::Node;
use serde::Serialize;
use tracing::{info, warn};

use crate::accessor::{children_named, find_text, require_parsed, require_text};
use crate::error::{ParseError, Result};
use crate::frame::SuppressionFrame;

const INDENT: &str = "   ";

/// How many times a named suppression fired during the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuppressionCount {
    pub name: String,
    pub count: u64,
}

impl SuppressionCount {
    /// Build from a `<pair>` element of `<suppcounts>`
    pub fn from_element(el: Node<'_, '_>) -> Result<Self> {
        Ok(Self {
            name: require_text(el, "name", "pair")?,
            count: require_parsed(el, "count", "pair")?,
        })
    }
}

impl fmt::Display for SuppressionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Count: {}", self.count)?;
        writeln!(f, "Name: {}", self.name)
    }
}

/// A suppression rule as reported in the XML output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suppression {
    pub name: String,
    /// Tool-specific category such as `Memcheck:Value8`
    pub kind: String,
    pub stack: Vec<SuppressionFrame>,
    pub auxkind: Option<String>,
}

impl Suppression {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        stack: Vec<SuppressionFrame>,
        auxkind: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            stack,
            auxkind,
        }
    }

    /// Build from a `<suppression>` element; an empty stack is valid
    pub fn from_element(el: Node<'_, '_>) -> Result<Self> {
        Ok(Self {
            name: require_text(el, "sname", "suppression")?,
            kind: require_text(el, "skind", "suppression")?,
            stack: children_named(el, "sframe")
                .map(SuppressionFrame::from_element)
                .collect(),
            auxkind: find_text(el, "skaux"),
        })
    }

    /// Render this suppression as a suppression-file block named `name`.
    ///
    /// Frames carrying neither a function nor an object are left out.
    pub fn raw_text(&self, name: &str) -> String {
        let mut text = String::from("{\n");
        push_line(&mut text, &format!("<{}>", name));
        push_line(&mut text, &self.kind);

        if let Some(auxkind) = &self.auxkind {
            push_line(&mut text, auxkind);
        }

        for (index, frame) in self.stack.iter().enumerate() {
            match frame.raw_line() {
                Some(line) => push_line(&mut text, &line),
                None => warn!(
                    suppression = name,
                    frame = index,
                    "skipping suppression frame with neither fun nor obj"
                ),
            }
        }

        text.push_str("}\n");
        text
    }
}

fn push_line(text: &mut String, line: &str) {
    text.push_str(INDENT);
    text.push_str(line);
    text.push('\n');
}

impl fmt::Display for Suppression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Suppression kind: {}", self.kind)?;
        for frame in &self.stack {
            write!(f, "Stack frame:\n{}", frame)?;
        }
        if let Some(auxkind) = &self.auxkind {
            writeln!(f, "Aux kind: {}", auxkind)?;
        }
        Ok(())
    }
}

/// Write the raw text of every `(name, suppression)` pair to `path`, in order.
///
/// The whole contents are rendered before the file is touched and written with a
/// single call. With `append` the file is extended, otherwise it is truncated.
pub fn dump_suppressions<'s, P, N, I>(path: P, supps: I, append: bool) -> Result<()>
where
    P: AsRef<Path>,
    N: AsRef<str>,
    I: IntoIterator<Item = (N, &'s Suppression)>,
{
    let mut count = 0usize;
    let contents: String = supps
        .into_iter()
        .map(|(name, supp)| {
            count += 1;
            supp.raw_text(name.as_ref())
        })
        .collect();

    let path = path.as_ref();
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;
    file.write_all(contents.as_bytes())?;

    info!(path = %path.display(), count, append, "wrote suppressions");
    Ok(())
}

/// Read suppression blocks in the format produced by [`Suppression::raw_text`].
///
/// Blank lines and `#` comments between blocks are ignored. Wildcard frames (`...`)
/// cannot be represented by [`SuppressionFrame`] and are rejected.
pub fn parse_raw_suppressions(text: &str) -> Result<Vec<(String, Suppression)>> {
    let mut parsed = Vec::new();
    let mut lines = text.lines().map(str::trim);

    while let Some(line) = lines.next() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line != "{" {
            return Err(ParseError::format(format!(
                "Expected '{{' to open a suppression, found '{}'",
                line
            )));
        }

        let name = lines
            .next()
            .filter(|l| !l.is_empty() && *l != "}")
            .ok_or_else(|| ParseError::format("Suppression block without a name"))?;
        let name = name
            .strip_prefix('<')
            .and_then(|n| n.strip_suffix('>'))
            .unwrap_or(name)
            .to_string();

        let kind = lines
            .next()
            .filter(|l| !l.is_empty() && *l != "}")
            .ok_or_else(|| {
                ParseError::format(format!("Suppression '{}' has no kind line", name))
            })?
            .to_string();

        let mut auxkind = None;
        let mut stack = Vec::new();
        let mut closed = false;
        for line in lines.by_ref() {
            if line == "}" {
                closed = true;
                break;
            }
            if let Some(fun) = line.strip_prefix("fun:") {
                stack.push(SuppressionFrame::function(fun));
            } else if let Some(obj) = line.strip_prefix("obj:") {
                stack.push(SuppressionFrame::object(obj));
            } else if line == "..." {
                return Err(ParseError::format(format!(
                    "Suppression '{}' uses an unsupported wildcard frame",
                    name
                )));
            } else if auxkind.is_none() && stack.is_empty() {
                auxkind = Some(line.to_string());
            } else {
                return Err(ParseError::format(format!(
                    "Unexpected line in suppression '{}': '{}'",
                    name, line
                )));
            }
        }

        if !closed {
            return Err(ParseError::format(format!(
                "Suppression '{}' is missing its closing '}}'",
                name
            )));
        }

        let supp = Suppression::new(name.clone(), kind, stack, auxkind);
        parsed.push((name, supp));
    }

    Ok(parsed)
}
