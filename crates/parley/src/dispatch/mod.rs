//! The resolution and execution pipeline.
//!
//! Each call to [`Dispatcher::dispatch`] is one linear pass through
//! [`InvocationState`]: the line is tokenized, the command resolved by name,
//! sender slots resolved, the command's permission checked, arguments bound,
//! and the handler invoked. Any
//! failure is terminal and reported as a [`DispatchError`]; the handler only
//! runs after every earlier stage has succeeded.

use std::fmt;
use std::sync::Arc;

use parley_config::Config;
use tracing::debug;

use crate::bind::bind;
use crate::coerce::Coercer;
use crate::descriptor::Reply;
use crate::error::DispatchError;
use crate::registry::CommandRegistry;
use crate::sender::{Sender, SenderRegistry};
use crate::tokenize::{strip_prefix, tokenize};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Stages of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationState {
    /// The raw line was accepted.
    Received,
    /// A command matched the leading tokens.
    NameResolved,
    /// Every sender slot was resolved, possibly to absent.
    SendersResolved,
    /// Arguments were bound to the parameters.
    ArgumentsBound,
    /// The handler is running.
    Executing,
    /// The handler returned successfully.
    Completed,
    /// The invocation ended with an error.
    Failed,
}

impl InvocationState {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::NameResolved => "name_resolved",
            Self::SendersResolved => "senders_resolved",
            Self::ArgumentsBound => "arguments_bound",
            Self::Executing => "executing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for InvocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs input lines against a command registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    commands: Arc<CommandRegistry>,
    senders: Arc<SenderRegistry>,
    coercer: Coercer,
    prefix: Option<String>,
}

impl Dispatcher {
    /// Creates a dispatcher with exact enum matching and no command prefix.
    #[must_use]
    pub fn new(commands: Arc<CommandRegistry>, senders: Arc<SenderRegistry>) -> Self {
        Self {
            commands,
            senders,
            coercer: Coercer::default(),
            prefix: None,
        }
    }

    /// Creates a dispatcher using the configured enum matching policy and
    /// command prefix.
    #[must_use]
    pub fn from_config(
        config: &Config,
        commands: Arc<CommandRegistry>,
        senders: Arc<SenderRegistry>,
    ) -> Self {
        Self {
            coercer: Coercer::new(config.enum_matching()),
            prefix: config.command_prefix().map(str::to_owned),
            ..Self::new(commands, senders)
        }
    }

    /// Requires input lines to start with `prefix`.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into()).filter(|value| !value.is_empty());
        self
    }

    /// Replaces the coercer.
    #[must_use]
    pub const fn with_coercer(mut self, coercer: Coercer) -> Self {
        self.coercer = coercer;
        self
    }

    /// Returns the command registry.
    #[must_use]
    pub const fn commands(&self) -> &Arc<CommandRegistry> {
        &self.commands
    }

    /// Returns the sender registry.
    #[must_use]
    pub const fn senders(&self) -> &Arc<SenderRegistry> {
        &self.senders
    }

    /// Returns the required command prefix, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Runs `line` on behalf of `caller`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the line is blank or lacks the prefix,
    /// no command matches, the caller lacks the command's permission, the
    /// arguments do not bind, or the handler fails.
    pub fn dispatch(&self, caller: &Arc<dyn Sender>, line: &str) -> Result<Reply, DispatchError> {
        debug!(
            target: DISPATCH_TARGET,
            state = %InvocationState::Received,
            sender = caller.name(),
            "dispatch"
        );
        let outcome = self.run(caller, line);
        match &outcome {
            Ok(_) => debug!(
                target: DISPATCH_TARGET,
                state = %InvocationState::Completed,
                sender = caller.name(),
                "dispatch"
            ),
            Err(error) => debug!(
                target: DISPATCH_TARGET,
                state = %InvocationState::Failed,
                sender = caller.name(),
                kind = %error.kind(),
                %error,
                "dispatch"
            ),
        }
        outcome
    }

    fn run(&self, caller: &Arc<dyn Sender>, line: &str) -> Result<Reply, DispatchError> {
        let body = self.prefix.as_deref().map_or(Ok(line), |prefix| {
            strip_prefix(line, prefix).ok_or_else(|| DispatchError::missing_prefix(prefix))
        })?;

        let input = tokenize(body);
        let path_words = input.path_words().len();
        let (first, arguments) = input.into_parts();
        let name = first.ok_or(DispatchError::EmptyInput)?;
        let words = arguments.get(..path_words).unwrap_or_default();

        let resolution = self
            .commands
            .find(&name, words)
            .ok_or_else(|| self.unresolved(&name, words))?;
        let command = resolution.command();
        debug!(
            target: DISPATCH_TARGET,
            state = %InvocationState::NameResolved,
            command = command.name(),
            matched = resolution.matched(),
            "dispatch"
        );

        let senders = self.senders.resolve_all(caller, command.senders());
        debug!(
            target: DISPATCH_TARGET,
            state = %InvocationState::SendersResolved,
            command = command.name(),
            slots = senders.len(),
            bound = senders.iter().filter(|(_, bound)| bound.is_some()).count(),
            "dispatch"
        );

        if let Some(permission) = command.permission()
            && !caller.has_permission(permission)
        {
            return Err(DispatchError::permission_denied(command.name(), permission));
        }

        let tokens = arguments.get(resolution.consumed()..).unwrap_or_default();
        let bound = bind(command.parameters(), tokens, &self.coercer)
            .map_err(|source| DispatchError::binding(command.name(), source))?;
        debug!(
            target: DISPATCH_TARGET,
            state = %InvocationState::ArgumentsBound,
            command = command.name(),
            arguments = bound.len(),
            "dispatch"
        );

        debug!(
            target: DISPATCH_TARGET,
            state = %InvocationState::Executing,
            command = command.name(),
            "dispatch"
        );
        command
            .invoke(&bound, &senders)
            .map_err(|source| DispatchError::handler(command.name(), source))
    }

    fn unresolved(&self, name: &str, words: &[String]) -> DispatchError {
        self.commands.longest_branch(name, words).map_or_else(
            || DispatchError::unknown_command(name),
            |(path, branches)| DispatchError::incomplete_command(path, branches),
        )
    }
}

#[cfg(test)]
mod tests;
