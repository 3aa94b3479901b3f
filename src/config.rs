use crate::cli::{Cli, OutputFormat, VerbosityLevel};
use crate::signal::signal_from_name;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub markers: MarkerConfig,
    pub signals: SignalConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Don't print leak/error verdict lines
    pub quiet: bool,
    /// Print the full report
    pub verbose: bool,
    pub debug: bool,
}

impl OutputConfig {
    pub fn verbosity(&self) -> VerbosityLevel {
        if self.debug {
            VerbosityLevel::Debug
        } else if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// Marker files touched for the benefit of grading scripts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarkerConfig {
    pub create_files: bool,
    pub error_file: PathBuf,
    pub leak_file: PathBuf,
    pub fatal_signal_file: PathBuf,
    /// Item appended to the marker's value list
    pub write_item: Option<String>,
    pub delimiter: String,
}

/// Which fatal signals still pass, and which are the usual crash signals
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SignalConfig {
    pub allowed: Vec<String>,
    pub expected: Vec<String>,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            create_files: false,
            error_file: PathBuf::from(".memerr_found"),
            leak_file: PathBuf::from(".memleak_found"),
            fatal_signal_file: PathBuf::from(".memerr_found"),
            write_item: None,
            delimiter: ", ".to_string(),
        }
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            allowed: ["SIGINT", "SIGQUIT", "SIGTERM", "SIGKILL"]
                .map(String::from)
                .to_vec(),
            // Failed assert() or stack smashing, segfault, divide by zero,
            // misaligned access, write to a broken pipe
            expected: ["SIGABRT", "SIGSEGV", "SIGFPE", "SIGBUS", "SIGPIPE"]
                .map(String::from)
                .to_vec(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| ConfigError::Environment(format!("Invalid {} value: {}", key, value)))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: file -> environment -> CLI
    pub async fn load_config(cli: &Cli) -> Result<Config> {
        let mut config = Config::default();

        if let Some(config_path) = &cli.config {
            config = Self::load_from_file(config_path).await?;
        } else if let Some(found_config) = Self::find_config_file().await? {
            config = found_config;
        }

        config = Self::apply_environment_overrides(config)?;
        config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        let content = tokio::fs::read_to_string(path).await?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub async fn find_config_file() -> Result<Option<Config>> {
        let config_names = [
            "valparse.toml",
            "valparse.json",
            ".valparse.toml",
            ".valparse.json",
        ];

        for name in &config_names {
            let path = PathBuf::from(name);
            if path.exists() {
                return Ok(Some(Self::load_from_file(&path).await?));
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let app_config_dir = config_dir.join("valparse");
            for name in &config_names {
                let path = app_config_dir.join(name);
                if path.exists() {
                    return Ok(Some(Self::load_from_file(&path).await?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides using the system environment
    pub fn apply_environment_overrides(config: Config) -> Result<Config> {
        Self::apply_environment_overrides_with(&SystemEnvProvider, config)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        // Output settings
        if let Some(quiet) = env.get("VALPARSE_QUIET") {
            config.output.quiet = parse_env("VALPARSE_QUIET", &quiet)?;
        }
        if let Some(verbose) = env.get("VALPARSE_VERBOSE") {
            config.output.verbose = parse_env("VALPARSE_VERBOSE", &verbose)?;
        }
        if let Some(format) = env.get("VALPARSE_FORMAT") {
            config.output.format = match format.to_lowercase().as_str() {
                "human" => OutputFormat::Human,
                "json" => OutputFormat::Json,
                _ => {
                    return Err(ConfigError::Environment(format!(
                        "Invalid VALPARSE_FORMAT value: {}",
                        format
                    )));
                }
            };
        }

        // Marker settings
        if let Some(create_files) = env.get("VALPARSE_CREATE_FILES") {
            config.markers.create_files = parse_env("VALPARSE_CREATE_FILES", &create_files)?;
        }
        if let Some(path) = env.get("VALPARSE_ERROR_FILE") {
            config.markers.error_file = PathBuf::from(path);
        }
        if let Some(path) = env.get("VALPARSE_LEAK_FILE") {
            config.markers.leak_file = PathBuf::from(path);
        }
        if let Some(path) = env.get("VALPARSE_FATAL_SIGNAL_FILE") {
            config.markers.fatal_signal_file = PathBuf::from(path);
        }
        if let Some(item) = env.get("VALPARSE_WRITE_ITEM") {
            config.markers.write_item = Some(item);
        }
        if let Some(delimiter) = env.get("VALPARSE_DELIMITER") {
            config.markers.delimiter = delimiter;
        }

        // Signal policy
        if let Some(allowed) = env.get("VALPARSE_ALLOWED_SIGNALS") {
            config.signals.allowed = split_list(&allowed);
        }
        if let Some(expected) = env.get("VALPARSE_EXPECTED_SIGNALS") {
            config.signals.expected = split_list(&expected);
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        // Output settings
        if let Some(format) = cli.format {
            config.output.format = format;
        }
        if cli.quiet {
            config.output.quiet = true;
            config.output.verbose = false;
        }
        if cli.verbose {
            config.output.verbose = true;
            config.output.quiet = false;
        }
        if cli.debug {
            config.output.debug = true;
        }

        // Marker settings
        if cli.create_files {
            config.markers.create_files = true;
        }
        if let Some(path) = &cli.error_file {
            config.markers.error_file = path.clone();
        }
        if let Some(path) = &cli.leak_file {
            config.markers.leak_file = path.clone();
        }
        if let Some(path) = &cli.fatal_signal_file {
            config.markers.fatal_signal_file = path.clone();
        }
        if let Some(item) = &cli.write_item {
            config.markers.write_item = Some(item.clone());
        }
        if let Some(delimiter) = &cli.write_item_delimiter {
            config.markers.delimiter = delimiter.clone();
        }

        config
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if config.output.verbose && config.output.quiet {
            return Err(ConfigError::Validation(
                "Cannot enable both verbose and quiet modes".to_string(),
            ));
        }

        if config.markers.delimiter.is_empty() {
            return Err(ConfigError::Validation(
                "Marker delimiter must not be empty".to_string(),
            ));
        }

        for name in config.signals.allowed.iter().chain(&config.signals.expected) {
            signal_from_name(name).map_err(|_| {
                ConfigError::Validation(format!("Unknown signal name: {}", name))
            })?;
        }

        if let Some(name) = config
            .signals
            .allowed
            .iter()
            .find(|name| config.signals.expected.contains(*name))
        {
            return Err(ConfigError::Validation(format!(
                "Signal {} cannot be both allowed and expected",
                name
            )));
        }

        Ok(())
    }
}
