use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ParseError;

/// Classification of a diagnostic: a memory error or a memory leak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Error,
    Leak,
}

/// Memcheck diagnostic categories, as written in the `<kind>` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ErrorKind {
    UninitValue,
    UninitCondition,
    CoreMemError,
    InvalidRead,
    InvalidWrite,
    InvalidJump,
    SyscallParam,
    ClientCheck,
    InvalidFree,
    MismatchedFree,
    Overlap,
    #[serde(rename = "Leak_DefinitelyLost")]
    LeakDefinitelyLost,
    #[serde(rename = "Leak_IndirectlyLost")]
    LeakIndirectlyLost,
    #[serde(rename = "Leak_PossiblyLost")]
    LeakPossiblyLost,
    #[serde(rename = "Leak_StillReachable")]
    LeakStillReachable,
    InvalidMemPool,
    FishyValue,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 17] = [
        ErrorKind::UninitValue,
        ErrorKind::UninitCondition,
        ErrorKind::CoreMemError,
        ErrorKind::InvalidRead,
        ErrorKind::InvalidWrite,
        ErrorKind::InvalidJump,
        ErrorKind::SyscallParam,
        ErrorKind::ClientCheck,
        ErrorKind::InvalidFree,
        ErrorKind::MismatchedFree,
        ErrorKind::Overlap,
        ErrorKind::LeakDefinitelyLost,
        ErrorKind::LeakIndirectlyLost,
        ErrorKind::LeakPossiblyLost,
        ErrorKind::LeakStillReachable,
        ErrorKind::InvalidMemPool,
        ErrorKind::FishyValue,
    ];

    /// The tag text Valgrind uses for this kind
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::UninitValue => "UninitValue",
            ErrorKind::UninitCondition => "UninitCondition",
            ErrorKind::CoreMemError => "CoreMemError",
            ErrorKind::InvalidRead => "InvalidRead",
            ErrorKind::InvalidWrite => "InvalidWrite",
            ErrorKind::InvalidJump => "InvalidJump",
            ErrorKind::SyscallParam => "SyscallParam",
            ErrorKind::ClientCheck => "ClientCheck",
            ErrorKind::InvalidFree => "InvalidFree",
            ErrorKind::MismatchedFree => "MismatchedFree",
            ErrorKind::Overlap => "Overlap",
            ErrorKind::LeakDefinitelyLost => "Leak_DefinitelyLost",
            ErrorKind::LeakIndirectlyLost => "Leak_IndirectlyLost",
            ErrorKind::LeakPossiblyLost => "Leak_PossiblyLost",
            ErrorKind::LeakStillReachable => "Leak_StillReachable",
            ErrorKind::InvalidMemPool => "InvalidMemPool",
            ErrorKind::FishyValue => "FishyValue",
        }
    }

    pub fn category(self) -> Category {
        match self {
            ErrorKind::LeakDefinitelyLost
            | ErrorKind::LeakIndirectlyLost
            | ErrorKind::LeakPossiblyLost
            | ErrorKind::LeakStillReachable => Category::Leak,
            _ => Category::Error,
        }
    }

    pub fn is_leak(self) -> bool {
        self.category() == Category::Leak
    }

    pub fn is_error(self) -> bool {
        self.category() == Category::Error
    }
}

impl FromStr for ErrorKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseError::UnknownKind(s.to_string()))
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
