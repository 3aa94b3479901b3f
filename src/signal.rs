use std::fmt;

use libc::c_int;
use roxmltree::Node;
use serde::Serialize;

use crate::accessor::{find_all, find_text, require_parsed, require_text};
use crate::error::{ParseError, Result};
use crate::frame::Frame;

const SIGNALS: &[(&str, c_int)] = &[
    ("SIGHUP", libc::SIGHUP),
    ("SIGINT", libc::SIGINT),
    ("SIGQUIT", libc::SIGQUIT),
    ("SIGILL", libc::SIGILL),
    ("SIGTRAP", libc::SIGTRAP),
    ("SIGABRT", libc::SIGABRT),
    ("SIGBUS", libc::SIGBUS),
    ("SIGFPE", libc::SIGFPE),
    ("SIGKILL", libc::SIGKILL),
    ("SIGUSR1", libc::SIGUSR1),
    ("SIGSEGV", libc::SIGSEGV),
    ("SIGUSR2", libc::SIGUSR2),
    ("SIGPIPE", libc::SIGPIPE),
    ("SIGALRM", libc::SIGALRM),
    ("SIGTERM", libc::SIGTERM),
    ("SIGCHLD", libc::SIGCHLD),
    ("SIGCONT", libc::SIGCONT),
    ("SIGSTOP", libc::SIGSTOP),
    ("SIGTSTP", libc::SIGTSTP),
    ("SIGTTIN", libc::SIGTTIN),
    ("SIGTTOU", libc::SIGTTOU),
    ("SIGURG", libc::SIGURG),
    ("SIGXCPU", libc::SIGXCPU),
    ("SIGXFSZ", libc::SIGXFSZ),
    ("SIGVTALRM", libc::SIGVTALRM),
    ("SIGPROF", libc::SIGPROF),
    ("SIGWINCH", libc::SIGWINCH),
    ("SIGIO", libc::SIGIO),
    ("SIGSYS", libc::SIGSYS),
];

#[cfg(target_os = "linux")]
const LINUX_SIGNALS: &[(&str, c_int)] = &[
    ("SIGPWR", libc::SIGPWR),
    ("SIGSTKFLT", libc::SIGSTKFLT),
];

#[cfg(not(target_os = "linux"))]
const LINUX_SIGNALS: &[(&str, c_int)] = &[];

/// Kernel real-time signal range; Valgrind names these `SIGRT<n>` relative to the start
#[cfg(target_os = "linux")]
const SIGRT_RANGE: Option<(c_int, c_int)> = Some((32, 64));

#[cfg(not(target_os = "linux"))]
const SIGRT_RANGE: Option<(c_int, c_int)> = None;

fn realtime_signal(name: &str) -> Option<c_int> {
    let (min, max) = SIGRT_RANGE?;
    let offset: c_int = name.strip_prefix("SIGRT")?.parse().ok()?;
    let signo = min.checked_add(offset)?;
    (offset >= 0 && signo <= max).then_some(signo)
}

/// Resolve a signal name such as `SIGSEGV` or `SIGRT3` to the platform's signal number
pub fn signal_from_name(name: &str) -> Result<c_int> {
    SIGNALS
        .iter()
        .chain(LINUX_SIGNALS)
        .find(|(signame, _)| *signame == name)
        .map(|(_, signo)| *signo)
        .or_else(|| realtime_signal(name))
        .ok_or_else(|| ParseError::UnknownSignal(name.to_string()))
}

/// The signal that terminated the program under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FatalSignal {
    pub tid: u32,
    pub signo: i32,
    pub signame: String,
    pub sicode: i32,
    /// Faulting address; only present for signals raised by the kernel
    pub siaddr: Option<String>,
    pub stack: Vec<Frame>,
    pub event: Option<String>,
    pub threadname: Option<String>,
}

impl FatalSignal {
    /// Build from the `<fatal_signal>` element; every non-optional field must be present
    pub fn from_element(el: Node<'_, '_>) -> Result<Self> {
        const CONTEXT: &str = "fatal_signal";

        Ok(Self {
            tid: require_parsed(el, "tid", CONTEXT)?,
            signo: require_parsed(el, "signo", CONTEXT)?,
            signame: require_text(el, "signame", CONTEXT)?,
            sicode: require_parsed(el, "sicode", CONTEXT)?,
            siaddr: find_text(el, "siaddr"),
            stack: find_all(el, "stack/frame")
                .into_iter()
                .map(Frame::from_element)
                .collect::<Result<Vec<_>>>()?,
            event: find_text(el, "event"),
            threadname: find_text(el, "threadname"),
        })
    }

    /// The platform signal number for `signame`
    pub fn signal(&self) -> Result<c_int> {
        signal_from_name(&self.signame)
    }
}

impl fmt::Display for FatalSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Thread ID: {}", self.tid)?;
        writeln!(f, "Signal number: {}", self.signo)?;
        writeln!(f, "Name: {}", self.signame)?;
        writeln!(f, "Code: {}", self.sicode)?;
        if let Some(siaddr) = &self.siaddr {
            writeln!(f, "Address: {}", siaddr)?;
        }
        for frame in &self.stack {
            write!(f, "Stack:\n{}", frame)?;
        }
        if let Some(event) = &self.event {
            writeln!(f, "Event: {}", event)?;
        }
        if let Some(threadname) = &self.threadname {
            writeln!(f, "Thread name: {}", threadname)?;
        }
        Ok(())
    }
}
