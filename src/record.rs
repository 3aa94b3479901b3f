//! Record types for the `<args>`, `<status>` and `<error>` blocks of a report.

use std::fmt;

use roxmltree::Node;
use serde::Serialize;

use crate::accessor::{find, find_all, find_all_text, find_parsed, find_text, require_text};
use crate::error::{ParseError, Result};
use crate::frame::Frame;
use crate::kind::{Category, ErrorKind};
use crate::suppression::Suppression;

/// Command lines of Valgrind itself and of the program under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Arguments {
    pub valexe: String,
    pub valargs: Vec<String>,
    pub exe: String,
    pub exeargs: Vec<String>,
}

impl Arguments {
    /// Build from the `<args>` element
    pub fn from_element(el: Node<'_, '_>) -> Result<Self> {
        let (Some(vargv), Some(argv)) = (find(el, "vargv"), find(el, "argv")) else {
            return Err(ParseError::format("Invalid <args> format."));
        };

        let valexe = find_text(vargv, "exe")
            .filter(|exe| !exe.is_empty())
            .ok_or_else(|| ParseError::format("Invalid <vargv> format."))?;
        let exe = find_text(argv, "exe")
            .filter(|exe| !exe.is_empty())
            .ok_or_else(|| ParseError::format("Invalid <argv> format."))?;

        Ok(Self {
            valexe,
            valargs: find_all_text(vargv, "arg"),
            exe,
            exeargs: find_all_text(argv, "arg"),
        })
    }
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Valgrind executable: {}", self.valexe)?;
        if !self.valargs.is_empty() {
            write!(f, "Valgrind args:")?;
            for arg in &self.valargs {
                write!(f, " {}", arg)?;
            }
        }

        writeln!(f, "\nExecutable: {}", self.exe)?;
        if !self.exeargs.is_empty() {
            write!(f, "Args:")?;
            for arg in &self.exeargs {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

const STATE_RUNNING: &str = "RUNNING";
const STATE_FINISHED: &str = "FINISHED";

/// Start and end times of the run, as opaque Valgrind timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub start: String,
    pub end: String,
}

impl Status {
    /// Build from every `<status>` element of the report; exactly two are expected
    pub fn from_elements(elements: &[Node<'_, '_>]) -> Result<Self> {
        if elements.len() != 2 {
            return Err(ParseError::format("Incorrect number of status entries."));
        }

        let mut start = None;
        let mut end = None;
        for el in elements {
            match find_text(*el, "state").as_deref() {
                Some(STATE_RUNNING) => start = Some(require_text(*el, "time", "status")?),
                Some(STATE_FINISHED) => end = Some(require_text(*el, "time", "status")?),
                other => {
                    return Err(ParseError::format(format!(
                        "Unexpected <state> in <status>: {}",
                        other.unwrap_or("<missing>")
                    )));
                }
            }
        }

        match (start, end) {
            (Some(start), Some(end)) => Ok(Self { start, end }),
            (None, _) => Err(ParseError::format("Missing RUNNING <status> entry.")),
            (_, None) => Err(ParseError::format("Missing FINISHED <status> entry.")),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Start time: {}", self.start)?;
        writeln!(f, "End time: {}", self.end)
    }
}

/// A single Memcheck diagnostic, either a memory error or a leak
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValgrindError {
    pub kind: ErrorKind,
    pub msg: String,
    pub stack: Vec<Frame>,
    pub msg_secondary: Option<String>,
    pub bytes_leaked: u64,
    pub blocks_leaked: u64,
    pub unique: Option<String>,
    pub tid: Option<u32>,
    /// Suppression generated for this error by `--gen-suppressions`
    pub suppression: Option<Suppression>,
}

impl ValgrindError {
    /// Build from an `<error>` element
    pub fn from_element(el: Node<'_, '_>) -> Result<Self> {
        let kind: ErrorKind = require_text(el, "kind", "error")?.parse()?;

        let msg = non_empty_text(el, "what")
            .or_else(|| non_empty_text(el, "xwhat/text"))
            .ok_or_else(|| ParseError::format("Missing <what> or <xwhat> in <error>."))?;
        let msg_secondary =
            non_empty_text(el, "auxwhat").or_else(|| non_empty_text(el, "xauxwhat/text"));

        let stack = find_all(el, "stack/frame")
            .into_iter()
            .map(Frame::from_element)
            .collect::<Result<Vec<_>>>()?;

        let suppression = find(el, "suppression")
            .map(Suppression::from_element)
            .transpose()?;

        Ok(Self {
            kind,
            msg,
            stack,
            msg_secondary,
            bytes_leaked: find_parsed(el, "xwhat/leakedbytes")?.unwrap_or(0),
            blocks_leaked: find_parsed(el, "xwhat/leakedblocks")?.unwrap_or(0),
            unique: find_text(el, "unique"),
            tid: find_parsed(el, "tid")?,
            suppression,
        })
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn is_leak(&self) -> bool {
        self.kind.is_leak()
    }

    pub fn is_error(&self) -> bool {
        self.kind.is_error()
    }
}

fn non_empty_text(el: Node<'_, '_>, path: &str) -> Option<String> {
    find_text(el, path).filter(|text| !text.is_empty())
}

impl fmt::Display for ValgrindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.category() {
            Category::Leak => "Leak",
            Category::Error => "Error",
        };
        writeln!(f, "{} kind: {}", label, self.kind)?;
        writeln!(f, "{} message: {}", label, self.msg)?;
        if let Some(secondary) = &self.msg_secondary {
            writeln!(f, "Auxiliary message: {}", secondary)?;
        }
        if self.is_leak() {
            writeln!(
                f,
                "Leaked: {} bytes in {} blocks",
                self.bytes_leaked, self.blocks_leaked
            )?;
        }

        for frame in &self.stack {
            write!(f, "Stack:\n{}", frame)?;
        }
        Ok(())
    }
}
