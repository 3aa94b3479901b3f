use crate::cli::VerbosityLevel;
use crate::config::ConfigError;
use crate::error::ParseError;
use std::path::Path;

/// Error reporter with configurable verbosity
pub struct ErrorReporter {
    verbosity: VerbosityLevel,
}

impl ErrorReporter {
    /// Create a new error reporter with specified verbosity
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self { verbosity }
    }

    /// Report a report that could not be read or parsed.
    ///
    /// A missing or broken report usually means the program under test crashed
    /// before Valgrind finished writing it, so this is printed at every verbosity.
    pub fn report_parse_error(&self, path: &Path, error: &ParseError) {
        eprintln!("{}", self.format_parse_error(path, error));
    }

    /// Report a configuration error
    pub fn report_config_error(&self, error: &ConfigError) {
        eprintln!("{}", self.format_config_error(error));
    }

    pub fn format_parse_error(&self, path: &Path, error: &ParseError) -> String {
        let mut output = match error {
            ParseError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => format!(
                "File '{}' not found. The tested executable might have failed...",
                path.display()
            ),
            _ => format!(
                "Exception raised: {}. The tested executable might have failed...",
                error
            ),
        };

        if self.verbosity >= VerbosityLevel::Verbose {
            if let Some(suggestion) = self.suggestion(error) {
                output.push_str(&format!("\nSuggestion: {}", suggestion));
            }
        }

        if self.verbosity == VerbosityLevel::Debug {
            output.push_str(&format!("\nDebug Info: {:?}", error));

            output.push_str("\nError Chain:");
            let mut current_error: &dyn std::error::Error = error;
            let mut level = 0;
            while let Some(source) = current_error.source() {
                output.push_str(&format!("\n  {}: {}", level + 1, source));
                current_error = source;
                level += 1;
            }
        }

        output
    }

    pub fn format_config_error(&self, error: &ConfigError) -> String {
        match self.verbosity {
            VerbosityLevel::Quiet => format!("Config error: {}", error),
            VerbosityLevel::Normal | VerbosityLevel::Verbose => {
                format!("Configuration Error: {}\n{}", error, self.config_help(error))
            }
            VerbosityLevel::Debug => format!(
                "Configuration Error: {}\nDebug: {:?}\n{}",
                error,
                error,
                self.config_help(error)
            ),
        }
    }

    fn suggestion(&self, error: &ParseError) -> Option<&'static str> {
        match error {
            ParseError::Xml(_) => {
                Some("The XML is incomplete; Valgrind may have been killed mid-run")
            }
            ParseError::Version(_) => Some("Only protocol version 4 (Valgrind 3.5+) is supported"),
            ParseError::Tool(_) => Some("Run Valgrind with --tool=memcheck"),
            ParseError::Format(_) | ParseError::UnknownKind(_) => {
                Some("Check that the file was produced with --xml=yes --xml-file=<file>")
            }
            ParseError::Io(_) | ParseError::UnknownSignal(_) => None,
        }
    }

    /// Get helpful suggestions for configuration errors
    fn config_help(&self, error: &ConfigError) -> String {
        match error {
            ConfigError::Io(_) => "Check that the configuration file exists and is readable"
                .to_string(),
            ConfigError::TomlParsing(_) | ConfigError::JsonParsing(_) => {
                "Check the configuration file syntax (TOML/JSON format expected)".to_string()
            }
            ConfigError::Validation(_) => {
                "Resolve conflicting values between file, environment, and CLI".to_string()
            }
            ConfigError::Environment(_) => "Fix or unset the VALPARSE_* variable".to_string(),
            ConfigError::UnsupportedFormat(ext) => {
                format!("Rename the configuration file from .{} to .toml or .json", ext)
            }
        }
    }
}
