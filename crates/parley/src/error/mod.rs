//! Domain errors raised while declaring, binding, and dispatching commands.
//!
//! All errors use `thiserror`-derived types with structured context so
//! callers can inspect the failure programmatically. Failures raised by
//! command handlers are carried as a boxed [`HandlerError`] and surfaced
//! unchanged.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Error type command handlers return.
///
/// Any `Error + Send + Sync` converts into it with `?`, and the dispatcher
/// hands it back to the caller untouched so it can be downcast to the
/// handler's own type.
pub type HandlerError = Box<dyn StdError + Send + Sync>;

/// A token could not be converted to a parameter's declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "cannot convert '{token}' for parameter '{parameter}': expected {expected}{}",
    valid_members(.valid)
)]
pub struct CoercionError {
    /// Parameter being bound.
    pub parameter: String,
    /// Offending token.
    pub token: String,
    /// Description of the expected type.
    pub expected: String,
    /// Accepted spellings, when the type has a finite set of values.
    pub valid: Vec<String>,
}

impl CoercionError {
    /// Creates a coercion error without a list of valid values.
    pub fn new(
        parameter: impl Into<String>,
        token: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            parameter: parameter.into(),
            token: token.into(),
            expected: expected.into(),
            valid: Vec::new(),
        }
    }

    /// Attaches the accepted spellings to the error.
    #[must_use]
    pub fn with_valid(mut self, valid: Vec<String>) -> Self {
        self.valid = valid;
        self
    }
}

fn valid_members(valid: &[String]) -> String {
    if valid.is_empty() {
        String::new()
    } else {
        format!(" (one of: {})", valid.join(", "))
    }
}

/// Argument binding failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// A required parameter had no token left to consume.
    #[error("missing argument for required parameter '{parameter}'")]
    MissingArgument {
        /// Parameter that went unbound.
        parameter: String,
    },

    /// A token could not be converted.
    #[error(transparent)]
    Coercion(#[from] CoercionError),
}

impl BindError {
    /// Creates a missing argument error.
    pub fn missing(parameter: impl Into<String>) -> Self {
        Self::MissingArgument {
            parameter: parameter.into(),
        }
    }

    /// Returns the name of the parameter that failed to bind.
    #[must_use]
    pub fn parameter(&self) -> &str {
        match self {
            Self::MissingArgument { parameter } => parameter,
            Self::Coercion(error) => &error.parameter,
        }
    }
}

/// A command declaration violates the descriptor invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// The command name is empty or whitespace.
    #[error("command name must not be empty")]
    EmptyName,

    /// An alias is empty or whitespace.
    #[error("command '{command}' declares an empty alias")]
    EmptyAlias {
        /// Command being declared.
        command: String,
    },

    /// A parameter name is empty or whitespace.
    #[error("command '{command}' declares a parameter with an empty name")]
    EmptyParameterName {
        /// Command being declared.
        command: String,
    },

    /// Two parameters share a name.
    #[error("command '{command}' declares parameter '{parameter}' more than once")]
    DuplicateParameter {
        /// Command being declared.
        command: String,
        /// Repeated parameter name.
        parameter: String,
    },

    /// Two sender slots share a name.
    #[error("command '{command}' declares sender slot '{slot}' more than once")]
    DuplicateSenderSlot {
        /// Command being declared.
        command: String,
        /// Repeated slot name.
        slot: String,
    },

    /// A collection parameter is followed by another parameter.
    #[error("command '{command}': collection parameter '{parameter}' must be declared last")]
    CollectionNotLast {
        /// Command being declared.
        command: String,
        /// Offending collection parameter.
        parameter: String,
    },

    /// A required parameter follows an optional one.
    #[error("command '{command}': required parameter '{parameter}' follows an optional parameter")]
    RequiredAfterOptional {
        /// Command being declared.
        command: String,
        /// Offending required parameter.
        parameter: String,
    },

    /// A default value does not match the parameter type.
    #[error("command '{command}': default for parameter '{parameter}' is not a valid {expected}")]
    DefaultTypeMismatch {
        /// Command being declared.
        command: String,
        /// Parameter with the bad default.
        parameter: String,
        /// Declared type description.
        expected: String,
    },

    /// An enum parameter declares no members.
    #[error("command '{command}': enum parameter '{parameter}' declares no members")]
    EmptyEnum {
        /// Command being declared.
        command: String,
        /// Offending parameter.
        parameter: String,
    },

    /// No handler was supplied.
    #[error("command '{command}' has no handler")]
    MissingHandler {
        /// Command being declared.
        command: String,
    },
}

/// Command registration failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A name or alias is already taken by another command.
    #[error("'{name}' is already registered by command '{existing}'")]
    Conflict {
        /// Name or alias that clashed.
        name: String,
        /// Command already owning it.
        existing: String,
    },
}

/// Typed extraction from an argument map failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// The command declares no parameter with this name.
    #[error("no argument named '{parameter}'")]
    Missing {
        /// Requested parameter name.
        parameter: String,
    },

    /// The bound value has another type.
    #[error("argument '{parameter}' is a {found}, not a {expected}")]
    TypeMismatch {
        /// Requested parameter name.
        parameter: String,
        /// Requested type.
        expected: &'static str,
        /// Kind of value actually bound.
        found: &'static str,
    },
}

/// Stable classification of dispatch failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The input held no command name.
    EmptyInput,
    /// The input did not carry the configured command prefix.
    MissingPrefix,
    /// No command is registered under the name.
    UnknownCommand,
    /// The words name a group of subcommands rather than a command.
    IncompleteCommand,
    /// The caller lacks the command's permission.
    PermissionDenied,
    /// A required parameter had no argument.
    MissingArgument,
    /// An argument could not be converted.
    Coercion,
    /// The handler reported a failure.
    Handler,
}

impl FailureKind {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::MissingPrefix => "missing_prefix",
            Self::UnknownCommand => "unknown_command",
            Self::IncompleteCommand => "incomplete_command",
            Self::PermissionDenied => "permission_denied",
            Self::MissingArgument => "missing_argument",
            Self::Coercion => "coercion",
            Self::Handler => "handler",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of one dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The input held no command name.
    #[error("no command given")]
    EmptyInput,

    /// The input did not start with the configured prefix.
    #[error("input does not start with the command prefix '{prefix}'")]
    MissingPrefix {
        /// Configured prefix.
        prefix: String,
    },

    /// No command is registered under the attempted name.
    #[error("unknown command '{name}'")]
    UnknownCommand {
        /// Name that was looked up.
        name: String,
    },

    /// The words match the start of longer commands but no command itself.
    #[error("incomplete command '{path}': expected one of {}", .branches.join(", "))]
    IncompleteCommand {
        /// Words that matched, joined by single spaces.
        path: String,
        /// Words that may follow `path`, sorted.
        branches: Vec<String>,
    },

    /// The caller does not hold the permission the command requires.
    #[error("permission '{permission}' is required to run '{command}'")]
    PermissionDenied {
        /// Resolved command name.
        command: String,
        /// Permission the command declares.
        permission: String,
    },

    /// Arguments could not be bound to the command's parameters.
    #[error("{source}")]
    Binding {
        /// Resolved command name.
        command: String,
        /// Underlying binding failure.
        #[source]
        source: BindError,
    },

    /// The handler reported a failure, carried unchanged.
    #[error("{source}")]
    Handler {
        /// Resolved command name.
        command: String,
        /// Error returned by the handler.
        #[source]
        source: HandlerError,
    },
}

impl DispatchError {
    /// Creates an unknown command error.
    pub fn unknown_command(name: impl Into<String>) -> Self {
        Self::UnknownCommand { name: name.into() }
    }

    /// Creates an incomplete command error listing the words that may follow
    /// `path`.
    pub fn incomplete_command(path: impl Into<String>, branches: Vec<String>) -> Self {
        Self::IncompleteCommand {
            path: path.into(),
            branches,
        }
    }

    /// Creates a permission denied error.
    pub fn permission_denied(command: impl Into<String>, permission: impl Into<String>) -> Self {
        Self::PermissionDenied {
            command: command.into(),
            permission: permission.into(),
        }
    }

    /// Creates a missing prefix error.
    pub fn missing_prefix(prefix: impl Into<String>) -> Self {
        Self::MissingPrefix {
            prefix: prefix.into(),
        }
    }

    /// Creates a binding error for `command`.
    pub fn binding(command: impl Into<String>, source: BindError) -> Self {
        Self::Binding {
            command: command.into(),
            source,
        }
    }

    /// Creates a handler error for `command`.
    pub fn handler(command: impl Into<String>, source: HandlerError) -> Self {
        Self::Handler {
            command: command.into(),
            source,
        }
    }

    /// Returns the failure classification.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::EmptyInput => FailureKind::EmptyInput,
            Self::MissingPrefix { .. } => FailureKind::MissingPrefix,
            Self::UnknownCommand { .. } => FailureKind::UnknownCommand,
            Self::IncompleteCommand { .. } => FailureKind::IncompleteCommand,
            Self::PermissionDenied { .. } => FailureKind::PermissionDenied,
            Self::Binding {
                source: BindError::MissingArgument { .. },
                ..
            } => FailureKind::MissingArgument,
            Self::Binding {
                source: BindError::Coercion(_),
                ..
            } => FailureKind::Coercion,
            Self::Handler { .. } => FailureKind::Handler,
        }
    }

    /// Returns the attempted command name or the offending parameter name.
    #[must_use]
    pub fn offending_name(&self) -> Option<&str> {
        match self {
            Self::EmptyInput | Self::MissingPrefix { .. } | Self::Handler { .. } => None,
            Self::UnknownCommand { name } => Some(name),
            Self::IncompleteCommand { path, .. } => Some(path),
            Self::PermissionDenied { command, .. } => Some(command),
            Self::Binding { source, .. } => Some(source.parameter()),
        }
    }

    /// Returns the words that may follow an incomplete command path.
    #[must_use]
    pub fn branches(&self) -> &[String] {
        match self {
            Self::IncompleteCommand { branches, .. } => branches,
            _ => &[],
        }
    }

    /// Returns the handler's own error when the handler failed.
    #[must_use]
    pub fn handler_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Self::Handler { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests;
