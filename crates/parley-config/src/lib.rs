//! Shared configuration for the parley command engine.
//!
//! [`Config`] gathers the knobs an embedding application sets once at start
//! up: the log filter and format used by telemetry, the case policies for
//! command names and enum members, and an optional command prefix that input
//! lines must carry. Every field has a default, so an empty TOML document is a
//! valid configuration.
//!
//! ```toml
//! log_filter = "parley=debug"
//! log_format = "compact"
//! name_matching = "ignore_case"
//! enum_matching = "exact"
//! command_prefix = "!"
//! ```

mod defaults;
mod logging;
mod matching;

use std::fs;
use std::io;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_LOG_FILTER, default_enum_matching, default_log_filter, default_log_filter_string,
    default_log_format, default_name_matching,
};
pub use logging::LogFormat;
pub use matching::{EnumMatching, NameMatching};

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Tracing filter expression, in `EnvFilter` syntax.
    pub log_filter: String,
    /// Output format for telemetry.
    pub log_format: LogFormat,
    /// Case policy for command names and aliases.
    pub name_matching: NameMatching,
    /// Case policy for enum parameter tokens.
    pub enum_matching: EnumMatching,
    /// Prefix every input line must start with, if any.
    pub command_prefix: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            name_matching: default_name_matching(),
            enum_matching: default_enum_matching(),
            command_prefix: None,
        }
    }
}

impl Config {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid TOML or names
    /// an unknown field or value.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: None,
            source: Box::new(source),
        })
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when its contents are invalid.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source: Arc::new(source),
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source: Box::new(source),
        })
    }

    /// Returns the tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the telemetry output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the command name case policy.
    #[must_use]
    pub const fn name_matching(&self) -> NameMatching {
        self.name_matching
    }

    /// Returns the enum member case policy.
    #[must_use]
    pub const fn enum_matching(&self) -> EnumMatching {
        self.enum_matching
    }

    /// Returns the configured command prefix, treating an empty prefix as
    /// absent.
    #[must_use]
    pub fn command_prefix(&self) -> Option<&str> {
        self.command_prefix
            .as_deref()
            .filter(|prefix| !prefix.is_empty())
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration '{path}': {source}")]
    Read {
        /// File that was read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// The configuration text was not valid.
    #[error("invalid configuration{}: {source}", origin(.path.as_ref()))]
    Parse {
        /// File the text came from, when loaded from disk.
        path: Option<Utf8PathBuf>,
        /// Underlying TOML error.
        #[source]
        source: Box<toml::de::Error>,
    },
}

fn origin(path: Option<&Utf8PathBuf>) -> String {
    path.map(|file| format!(" in '{file}'")).unwrap_or_default()
}
