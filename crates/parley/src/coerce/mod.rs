//! Conversion of raw tokens into typed [`Value`]s.
//!
//! The [`Coercer`] is a pure function object: it holds only the enum matching
//! policy and never touches shared state. Scalars consume one token;
//! collections consume every token they are given and fail as a whole on the
//! first element that does not convert.

use parley_config::EnumMatching;

use crate::error::CoercionError;
use crate::value::{EnumType, ScalarType, Value, ValueSet, ValueType};

/// Converts tokens into typed values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Coercer {
    enum_matching: EnumMatching,
}

impl Coercer {
    /// Creates a coercer using the given enum matching policy.
    #[must_use]
    pub const fn new(enum_matching: EnumMatching) -> Self {
        Self { enum_matching }
    }

    /// Returns the enum matching policy.
    #[must_use]
    pub const fn enum_matching(&self) -> EnumMatching {
        self.enum_matching
    }

    /// Converts `tokens` into a value of `value_type` for `parameter`.
    ///
    /// Scalars require exactly one token. Lists keep order and duplicates;
    /// sets drop duplicates. An empty token slice yields an empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError`] naming the parameter, the first offending
    /// token, and the expected type.
    pub fn coerce(
        &self,
        parameter: &str,
        value_type: &ValueType,
        tokens: &[String],
    ) -> Result<Value, CoercionError> {
        match value_type {
            ValueType::Scalar(element) => match tokens {
                [token] => self.coerce_scalar(parameter, element, token),
                _ => Err(CoercionError::new(
                    parameter,
                    tokens.join(" "),
                    format!("a single {element}"),
                )),
            },
            ValueType::List(element) => tokens
                .iter()
                .map(|token| self.coerce_scalar(parameter, element, token))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            ValueType::Set(element) => tokens
                .iter()
                .map(|token| self.coerce_scalar(parameter, element, token))
                .collect::<Result<ValueSet, _>>()
                .map(Value::Set),
        }
    }

    /// Converts a single token into a scalar value.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError`] when the token is not a valid `scalar`.
    pub fn coerce_scalar(
        &self,
        parameter: &str,
        scalar: &ScalarType,
        token: &str,
    ) -> Result<Value, CoercionError> {
        let converted = match scalar {
            ScalarType::String => Some(Value::String(token.to_owned())),
            ScalarType::Integer => token.parse::<i64>().ok().map(Value::Integer),
            ScalarType::Double => token.parse::<f64>().ok().map(Value::Double),
            ScalarType::Boolean => parse_boolean(token).map(Value::Boolean),
            ScalarType::Enum(enum_type) => self.match_member(enum_type, token).map(Value::Enum),
        };
        converted.ok_or_else(|| {
            CoercionError::new(parameter, token, scalar.to_string()).with_valid(scalar.candidates())
        })
    }

    fn match_member(&self, enum_type: &EnumType, token: &str) -> Option<String> {
        enum_type
            .members()
            .iter()
            .find(|member| self.enum_matching.matches(member, token))
            .cloned()
    }
}

fn parse_boolean(token: &str) -> Option<bool> {
    if token.eq_ignore_ascii_case("true") || token == "1" {
        Some(true)
    } else if token.eq_ignore_ascii_case("false") || token == "0" {
        Some(false)
    } else {
        None
    }
}
