//! Immutable command descriptors and their builder.
//!
//! A [`CommandDescriptor`] is everything the engine knows about a command: its
//! name and aliases, the ordered value [`Parameter`]s, the [`SenderSlot`]s,
//! and the handler. Descriptors are only obtainable through
//! [`CommandBuilder::build`], which enforces the declaration invariants, so
//! the binder can rely on them without re-checking.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::bind::ArgumentMap;
use crate::error::{DescriptorError, HandlerError};
use crate::sender::{SenderBindings, SenderSlot};
use crate::value::{ScalarType, Value, ValueType};

/// Callable invoked with the bound arguments and sender bindings.
pub type Handler =
    Arc<dyn Fn(&ArgumentMap, &SenderBindings) -> Result<Reply, HandlerError> + Send + Sync>;

/// Value a handler produces on success.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Reply {
    /// No result.
    #[default]
    Empty,
    /// A message for the caller.
    Text(String),
    /// A typed result value.
    Value(Value),
}

impl Reply {
    /// Returns `true` for [`Reply::Empty`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<()> for Reply {
    fn from((): ()) -> Self {
        Self::Empty
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// One positional value input of a command.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    position: usize,
    value_type: ValueType,
    default: Option<Value>,
    suggestions: Vec<String>,
}

impl Parameter {
    /// Declares a parameter that must receive an argument.
    #[must_use]
    pub fn required(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            position: 0,
            value_type,
            default: None,
            suggestions: Vec::new(),
        }
    }

    /// Declares a parameter that binds `default` when no argument is left.
    #[must_use]
    pub fn optional(
        name: impl Into<String>,
        value_type: ValueType,
        default: impl Into<Value>,
    ) -> Self {
        Self {
            default: Some(default.into()),
            ..Self::required(name, value_type)
        }
    }

    /// Adds completion suggestions for this parameter.
    #[must_use]
    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions
            .extend(suggestions.into_iter().map(Into::into));
        self
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the 0-based declaration position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the declared type.
    #[must_use]
    pub const fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Returns the default bound when no argument is supplied.
    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns `true` when the parameter has no default.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// Returns the explicit completion suggestions.
    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }
}

/// A validated command declaration.
#[derive(Clone)]
pub struct CommandDescriptor {
    name: String,
    aliases: Vec<String>,
    parameters: Vec<Parameter>,
    senders: Vec<SenderSlot>,
    permission: Option<String>,
    handler: Handler,
}

impl CommandDescriptor {
    /// Starts declaring a command called `name`.
    ///
    /// Names may hold several words (`"team add"`) to declare a subcommand
    /// path; runs of whitespace are collapsed to a single space.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder {
            name: name.into(),
            aliases: Vec::new(),
            parameters: Vec::new(),
            senders: Vec::new(),
            permission: None,
            handler: None,
        }
    }

    /// Returns the primary name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the aliases in declaration order.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Iterates over the primary name followed by the aliases.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Returns the ordered value parameters.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|parameter| parameter.name == name)
    }

    /// Returns the sender slots in declaration order.
    #[must_use]
    pub fn senders(&self) -> &[SenderSlot] {
        &self.senders
    }

    /// Returns the permission a caller must hold, if any.
    #[must_use]
    pub fn permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    /// Runs the handler.
    ///
    /// # Errors
    ///
    /// Returns whatever the handler returns.
    pub fn invoke(
        &self,
        arguments: &ArgumentMap,
        senders: &SenderBindings,
    ) -> Result<Reply, HandlerError> {
        (self.handler)(arguments, senders)
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("parameters", &self.parameters)
            .field("senders", &self.senders)
            .field("permission", &self.permission)
            .finish_non_exhaustive()
    }
}

/// Builder for [`CommandDescriptor`].
pub struct CommandBuilder {
    name: String,
    aliases: Vec<String>,
    parameters: Vec<Parameter>,
    senders: Vec<SenderSlot>,
    permission: Option<String>,
    handler: Option<Handler>,
}

impl CommandBuilder {
    /// Adds an alternative name.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Appends a positional parameter.
    #[must_use]
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Adds a sender slot.
    #[must_use]
    pub fn sender(mut self, slot: SenderSlot) -> Self {
        self.senders.push(slot);
        self
    }

    /// Requires callers to hold `permission`.
    ///
    /// A blank permission is the same as none.
    #[must_use]
    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        let declared = permission.into();
        self.permission = Some(declared.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        self
    }

    /// Sets the handler.
    #[must_use]
    pub fn handler<F, R>(mut self, handler: F) -> Self
    where
        F: Fn(&ArgumentMap, &SenderBindings) -> Result<R, HandlerError> + Send + Sync + 'static,
        R: Into<Reply>,
    {
        self.handler = Some(Arc::new(
            move |arguments: &ArgumentMap, senders: &SenderBindings| {
                handler(arguments, senders).map(Into::into)
            },
        ));
        self
    }

    /// Validates the declaration and produces the descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError`] when a name is empty or repeated, a
    /// collection is not the last parameter, a required parameter follows an
    /// optional one, a default does not match its type, an enum has no
    /// members, or the handler is missing.
    pub fn build(self) -> Result<CommandDescriptor, DescriptorError> {
        let name = collapse_whitespace(&self.name);
        if name.is_empty() {
            return Err(DescriptorError::EmptyName);
        }

        let mut aliases = Vec::with_capacity(self.aliases.len());
        for declared in &self.aliases {
            let alias = collapse_whitespace(declared);
            if alias.is_empty() {
                return Err(DescriptorError::EmptyAlias {
                    command: name.clone(),
                });
            }
            aliases.push(alias);
        }

        let parameters = validate_parameters(&name, self.parameters)?;

        let mut slot_names = HashSet::new();
        for slot in &self.senders {
            if !slot_names.insert(slot.name()) {
                return Err(DescriptorError::DuplicateSenderSlot {
                    command: name,
                    slot: slot.name().to_owned(),
                });
            }
        }

        let Some(handler) = self.handler else {
            return Err(DescriptorError::MissingHandler { command: name });
        };

        Ok(CommandDescriptor {
            name,
            aliases,
            parameters,
            senders: self.senders,
            permission: self.permission,
            handler,
        })
    }
}

impl fmt::Debug for CommandBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuilder")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("parameters", &self.parameters)
            .field("senders", &self.senders)
            .field("permission", &self.permission)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

fn validate_parameters(
    command: &str,
    declared: Vec<Parameter>,
) -> Result<Vec<Parameter>, DescriptorError> {
    let mut seen = HashSet::new();
    let mut optional_seen = false;
    let last = declared.len().saturating_sub(1);
    let mut parameters = Vec::with_capacity(declared.len());

    for (position, mut parameter) in declared.into_iter().enumerate() {
        if parameter.name.trim().is_empty() {
            return Err(DescriptorError::EmptyParameterName {
                command: command.to_owned(),
            });
        }
        if !seen.insert(parameter.name.clone()) {
            return Err(DescriptorError::DuplicateParameter {
                command: command.to_owned(),
                parameter: parameter.name,
            });
        }
        if let ScalarType::Enum(enum_type) = parameter.value_type.element()
            && enum_type.members().is_empty()
        {
            return Err(DescriptorError::EmptyEnum {
                command: command.to_owned(),
                parameter: parameter.name,
            });
        }
        if parameter.value_type.is_collection() && position != last {
            return Err(DescriptorError::CollectionNotLast {
                command: command.to_owned(),
                parameter: parameter.name,
            });
        }
        match &parameter.default {
            None if optional_seen => {
                return Err(DescriptorError::RequiredAfterOptional {
                    command: command.to_owned(),
                    parameter: parameter.name,
                });
            }
            None => {}
            Some(default) if !default.conforms_to(&parameter.value_type) => {
                return Err(DescriptorError::DefaultTypeMismatch {
                    command: command.to_owned(),
                    expected: parameter.value_type.to_string(),
                    parameter: parameter.name,
                });
            }
            Some(_) => optional_seen = true,
        }

        parameter.position = position;
        parameters.push(parameter);
    }

    Ok(parameters)
}

fn collapse_whitespace(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}
