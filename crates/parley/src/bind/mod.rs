//! Positional binding of argument tokens to a command's parameters.
//!
//! Parameters are walked in declaration order. Scalars take one token each;
//! a trailing collection takes every remaining token. A parameter with no
//! token left binds its default, or fails when it has none. Tokens left over
//! after the last parameter are ignored.

use tracing::trace;

use crate::coerce::Coercer;
use crate::descriptor::Parameter;
use crate::error::{ArgumentError, BindError};
use crate::value::{FromValue, Value};

const BIND_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::bind");

/// Bound argument values for one invocation, in parameter order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentMap {
    entries: Vec<(String, Value)>,
}

impl ArgumentMap {
    /// Returns the value bound to `parameter`.
    #[must_use]
    pub fn get(&self, parameter: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == parameter)
            .map(|(_, value)| value)
    }

    /// Extracts the value bound to `parameter` as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::Missing`] for an undeclared parameter and
    /// [`ArgumentError::TypeMismatch`] when the value has another kind.
    pub fn value<T: FromValue>(&self, parameter: &str) -> Result<T, ArgumentError> {
        let value = self.get(parameter).ok_or_else(|| ArgumentError::Missing {
            parameter: parameter.to_owned(),
        })?;
        T::from_value(value).ok_or_else(|| ArgumentError::TypeMismatch {
            parameter: parameter.to_owned(),
            expected: T::EXPECTED,
            found: value.kind_name(),
        })
    }

    /// Returns `true` when `parameter` is bound.
    #[must_use]
    pub fn contains(&self, parameter: &str) -> bool {
        self.get(parameter).is_some()
    }

    /// Returns the number of bound parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over parameter names and values in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

/// Binds `tokens` to `parameters`.
///
/// Binding is all-or-nothing: the first missing argument or coercion failure
/// aborts and no partial map is returned.
///
/// # Errors
///
/// Returns [`BindError::MissingArgument`] when a required parameter has no
/// token left, or [`BindError::Coercion`] when a token does not convert.
pub fn bind(
    parameters: &[Parameter],
    tokens: &[String],
    coercer: &Coercer,
) -> Result<ArgumentMap, BindError> {
    let mut remaining = tokens;
    let mut entries = Vec::with_capacity(parameters.len());

    for parameter in parameters {
        let value = if parameter.value_type().is_collection() {
            if remaining.is_empty() {
                fallback(parameter)?
            } else {
                let collected =
                    coercer.coerce(parameter.name(), parameter.value_type(), remaining)?;
                remaining = &[];
                collected
            }
        } else {
            match remaining.split_first() {
                Some((token, rest)) => {
                    let scalar = coercer.coerce_scalar(
                        parameter.name(),
                        parameter.value_type().element(),
                        token,
                    )?;
                    remaining = rest;
                    scalar
                }
                None => fallback(parameter)?,
            }
        };
        entries.push((parameter.name().to_owned(), value));
    }

    if !remaining.is_empty() {
        trace!(
            target: BIND_TARGET,
            surplus = remaining.len(),
            "ignoring surplus argument tokens"
        );
    }

    Ok(ArgumentMap { entries })
}

fn fallback(parameter: &Parameter) -> Result<Value, BindError> {
    parameter
        .default_value()
        .cloned()
        .ok_or_else(|| BindError::missing(parameter.name()))
}
