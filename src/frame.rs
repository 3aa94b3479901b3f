use std::fmt;

use roxmltree::Node;
use serde::Serialize;

use crate::accessor::{find_parsed, find_text, require_text};
use crate::error::Result;

/// One entry of a Valgrind stack trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Instruction pointer, kept as the hex text Valgrind printed
    pub ip: String,
    pub obj: Option<String>,
    #[serde(rename = "fn")]
    pub func: Option<String>,
    pub dir: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl Frame {
    /// Build from a `<frame>` element
    pub fn from_element(el: Node<'_, '_>) -> Result<Self> {
        Ok(Self {
            ip: require_text(el, "ip", "frame")?,
            obj: find_text(el, "obj"),
            func: find_text(el, "fn"),
            dir: find_text(el, "dir"),
            file: find_text(el, "file"),
            line: find_parsed(el, "line")?,
        })
    }

    /// `file:line` when both are known
    pub fn location(&self) -> Option<String> {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => Some(format!("{}:{}", file, line)),
            _ => None,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Instruction Pointer: {}", self.ip)?;
        if let Some(obj) = &self.obj {
            writeln!(f, "  Object: {}", obj)?;
        }
        if let Some(func) = &self.func {
            writeln!(f, "  Function: {}", func)?;
        }
        if let Some(dir) = &self.dir {
            writeln!(f, "  Directory: {}", dir)?;
        }
        if let Some(file) = &self.file {
            writeln!(f, "  File: {}", file)?;
        }
        if let Some(line) = self.line {
            writeln!(f, "  Line: {}", line)?;
        }
        Ok(())
    }
}

/// Simplified stack entry used for suppression matching
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SuppressionFrame {
    pub obj: Option<String>,
    pub fun: Option<String>,
}

impl SuppressionFrame {
    /// Build from an `<sframe>` element; both fields may be absent
    pub fn from_element(el: Node<'_, '_>) -> Self {
        Self {
            obj: find_text(el, "obj"),
            fun: find_text(el, "fun"),
        }
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self {
            obj: None,
            fun: Some(name.into()),
        }
    }

    pub fn object(path: impl Into<String>) -> Self {
        Self {
            obj: Some(path.into()),
            fun: None,
        }
    }

    /// The line this frame contributes to a suppression block, without indentation.
    ///
    /// The function name wins over the object path; `None` when the frame has neither.
    pub fn raw_line(&self) -> Option<String> {
        match (&self.fun, &self.obj) {
            (Some(fun), _) => Some(format!("fun:{}", fun)),
            (None, Some(obj)) => Some(format!("obj:{}", obj)),
            (None, None) => None,
        }
    }
}

impl fmt::Display for SuppressionFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(obj) = &self.obj {
            writeln!(f, "  Object: {}", obj)?;
        }
        if let Some(fun) = &self.fun {
            writeln!(f, "  Function: {}", fun)?;
        }
        Ok(())
    }
}
