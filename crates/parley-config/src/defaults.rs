use crate::logging::LogFormat;
use crate::matching::{EnumMatching, NameMatching};

/// Default log filter expression used by embedding applications.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by embedding applications.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default command name matching policy.
#[must_use]
pub const fn default_name_matching() -> NameMatching {
    NameMatching::Exact
}

/// Default enum member matching policy.
#[must_use]
pub const fn default_enum_matching() -> EnumMatching {
    EnumMatching::Exact
}
