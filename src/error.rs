use thiserror::Error;

/// Every way a Valgrind report can fail to become a [`Report`](crate::Report)
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Structural schema violation: missing, misordered or malformed tag
    #[error("Format error: {0}")]
    Format(String),

    #[error("Unsupported version: {0}")]
    Version(String),

    #[error("Unsupported tool: {0}")]
    Tool(String),

    #[error("Unknown error kind: {0}")]
    UnknownKind(String),

    #[error("Unknown signal name: {0}")]
    UnknownSignal(String),
}

impl ParseError {
    pub(crate) fn format(details: impl Into<String>) -> Self {
        ParseError::Format(details.into())
    }

    /// True for failures caused by the document contents rather than by I/O
    pub fn is_schema_violation(&self) -> bool {
        matches!(
            self,
            ParseError::Format(_)
                | ParseError::Version(_)
                | ParseError::Tool(_)
                | ParseError::UnknownKind(_)
        )
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ParseError>;
