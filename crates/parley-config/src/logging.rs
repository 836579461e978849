//! How dispatch events are rendered on stderr.
//!
//! Parsing accepts any ASCII case, so `log_format = "JSON"` in a config file
//! and `"json".parse()` in code select the same format.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Rendering of the events the engine emits while registering and
/// dispatching commands.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, with event fields flattened into it.
    #[default]
    Json,
    /// One terse line per event for reading at a terminal.
    Compact,
}

impl LogFormat {
    /// Returns the spelling used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Compact => "compact",
        }
    }

    /// Returns `true` when each event is a machine-readable record.
    #[must_use]
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Json)
    }

    /// Returns `true` when output should carry ANSI colour codes.
    ///
    /// Structured records stay plain even on a terminal.
    #[must_use]
    pub const fn uses_ansi(self, terminal: bool) -> bool {
        terminal && !self.is_structured()
    }
}
