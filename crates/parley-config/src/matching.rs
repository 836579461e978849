//! Case policies applied when matching user text against declared names.
//!
//! Both policies are chosen once, when the engine is assembled from a
//! [`Config`](crate::Config), and stay fixed for the lifetime of the
//! registries built from it.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How command names and aliases are compared with the typed name.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum NameMatching {
    /// Names must match byte for byte.
    #[default]
    Exact,
    /// Names match regardless of ASCII case.
    IgnoreCase,
}

impl NameMatching {
    /// Normalises `name` into the key used for registry lookups.
    #[must_use]
    pub fn normalise(self, name: &str) -> String {
        match self {
            Self::Exact => name.to_owned(),
            Self::IgnoreCase => name.to_ascii_lowercase(),
        }
    }
}

/// How enum tokens are compared with declared member names.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EnumMatching {
    /// Tokens must equal a member name exactly.
    #[default]
    Exact,
    /// Tokens match a member name regardless of ASCII case.
    IgnoreCase,
}

impl EnumMatching {
    /// Returns `true` when `token` selects `member` under this policy.
    #[must_use]
    pub fn matches(self, member: &str, token: &str) -> bool {
        match self {
            Self::Exact => member == token,
            Self::IgnoreCase => member.eq_ignore_ascii_case(token),
        }
    }
}
