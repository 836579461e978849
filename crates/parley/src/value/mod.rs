//! Typed argument values and the type tags parameters declare.
//!
//! A [`ValueType`] is either a scalar ([`ScalarType`]) or an ordered/unordered
//! collection of one scalar type. Collections are never nested. [`Value`] is
//! the bound, typed result the coercion engine produces for a parameter and
//! the form in which default values are declared.

use std::fmt;

use serde::Serialize;

/// A closed set of named members accepted by an enum parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumType {
    name: String,
    members: Vec<String>,
}

impl EnumType {
    /// Creates an enum type from its display name and member names.
    ///
    /// Member order is kept; it is the order used in error messages and
    /// completion candidates.
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the display name of the enum.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared member names.
    #[must_use]
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Returns `true` when `member` is one of the declared member names.
    #[must_use]
    pub fn has_member(&self, member: &str) -> bool {
        self.members.iter().any(|declared| declared == member)
    }
}

/// Literal spellings accepted for boolean parameters.
pub const BOOLEAN_LITERALS: [&str; 2] = ["true", "false"];

/// A primitive parameter type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// Arbitrary text, passed through unchanged.
    String,
    /// A signed 64-bit integer.
    Integer,
    /// A 64-bit floating point number.
    Double,
    /// `true` or `false`.
    Boolean,
    /// One member of a declared enum.
    Enum(EnumType),
}

impl ScalarType {
    /// Returns the values this type can take, in display form, when the set
    /// is finite.
    #[must_use]
    pub fn candidates(&self) -> Vec<String> {
        match self {
            Self::Boolean => BOOLEAN_LITERALS.iter().map(|&s| s.to_owned()).collect(),
            Self::Enum(enum_type) => enum_type.members().to_vec(),
            Self::String | Self::Integer | Self::Double => Vec::new(),
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Integer => f.write_str("integer"),
            Self::Double => f.write_str("double"),
            Self::Boolean => f.write_str("boolean"),
            Self::Enum(enum_type) => write!(f, "{}", enum_type.name()),
        }
    }
}

/// The declared type of a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Exactly one value.
    Scalar(ScalarType),
    /// An ordered collection; duplicates are kept.
    List(ScalarType),
    /// An unordered collection; duplicates are removed.
    Set(ScalarType),
}

impl ValueType {
    /// A single string.
    pub const STRING: Self = Self::Scalar(ScalarType::String);
    /// A single integer.
    pub const INTEGER: Self = Self::Scalar(ScalarType::Integer);
    /// A single double.
    pub const DOUBLE: Self = Self::Scalar(ScalarType::Double);
    /// A single boolean.
    pub const BOOLEAN: Self = Self::Scalar(ScalarType::Boolean);

    /// A single member of `enum_type`.
    #[must_use]
    pub const fn enumeration(enum_type: EnumType) -> Self {
        Self::Scalar(ScalarType::Enum(enum_type))
    }

    /// Returns `true` for list and set types.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::List(_) | Self::Set(_))
    }

    /// Returns the scalar type of the value or of each collection element.
    #[must_use]
    pub const fn element(&self) -> &ScalarType {
        match self {
            Self::Scalar(element) | Self::List(element) | Self::Set(element) => element,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(element) => write!(f, "{element}"),
            Self::List(element) => write!(f, "list of {element}"),
            Self::Set(element) => write!(f, "set of {element}"),
        }
    }
}

/// A bound, typed argument value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Text.
    String(String),
    /// Integer.
    Integer(i64),
    /// Floating point number.
    Double(f64),
    /// Boolean.
    Boolean(bool),
    /// The canonical name of an enum member.
    Enum(String),
    /// Ordered elements.
    List(Vec<Value>),
    /// Unordered, de-duplicated elements.
    Set(ValueSet),
}

impl Value {
    /// Returns `true` when this value is a legal instance of `value_type`.
    #[must_use]
    pub fn conforms_to(&self, value_type: &ValueType) -> bool {
        match (self, value_type) {
            (Self::List(items), ValueType::List(element)) => {
                items.iter().all(|item| item.conforms_to_scalar(element))
            }
            (Self::Set(items), ValueType::Set(element)) => {
                items.iter().all(|item| item.conforms_to_scalar(element))
            }
            (_, ValueType::Scalar(element)) => self.conforms_to_scalar(element),
            _ => false,
        }
    }

    fn conforms_to_scalar(&self, scalar: &ScalarType) -> bool {
        match (self, scalar) {
            (Self::String(_), ScalarType::String)
            | (Self::Integer(_), ScalarType::Integer)
            | (Self::Double(_), ScalarType::Double)
            | (Self::Boolean(_), ScalarType::Boolean) => true,
            (Self::Enum(member), ScalarType::Enum(enum_type)) => enum_type.has_member(member),
            _ => false,
        }
    }

    /// Returns the text of a string or enum value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) | Self::Enum(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the integer payload.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(number) => Some(*number),
            _ => None,
        }
    }

    /// Returns the double payload.
    #[must_use]
    pub const fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(number) => Some(*number),
            _ => None,
        }
    }

    /// Returns the boolean payload.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Returns the elements of a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the elements of a set value.
    #[must_use]
    pub const fn as_set(&self) -> Option<&ValueSet> {
        match self {
            Self::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Returns a short name for the kind of value held.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Double(_) => "double",
            Self::Boolean(_) => "boolean",
            Self::Enum(_) => "enum",
            Self::List(_) => "list",
            Self::Set(_) => "set",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(text) | Self::Enum(text) => f.write_str(text),
            Self::Integer(number) => write!(f, "{number}"),
            Self::Double(number) => write!(f, "{number}"),
            Self::Boolean(flag) => write!(f, "{flag}"),
            Self::List(items) => write_joined(f, items.iter()),
            Self::Set(items) => write_joined(f, items.iter()),
        }
    }
}

fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a Value>,
) -> fmt::Result {
    for (index, item) in items.enumerate() {
        if index > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::String(text.to_owned())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::String(text)
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Self::Integer(number)
    }
}

impl From<i32> for Value {
    fn from(number: i32) -> Self {
        Self::Integer(i64::from(number))
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Self::Double(number)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Self::Boolean(flag)
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}

impl From<ValueSet> for Value {
    fn from(items: ValueSet) -> Self {
        Self::Set(items)
    }
}

/// Unordered collection of values, de-duplicated by value equality.
///
/// Element order follows first insertion but is not part of equality: two
/// sets are equal when each contains every element of the other.
///
/// Doubles are members by bit pattern, so `NaN` equals itself and `0.0`
/// differs from `-0.0`. This keeps membership reflexive.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ValueSet {
    items: Vec<Value>,
}

impl ValueSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Adds `value` unless an equal value is already present. Returns whether
    /// the value was added.
    pub fn insert(&mut self, value: Value) -> bool {
        if self.contains(&value) {
            return false;
        }
        self.items.push(value);
        true
    }

    /// Returns `true` when an equal value is present.
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.items.iter().any(|item| same_member(item, value))
    }

    /// Returns the number of distinct values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when the set holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the values.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }
}

impl PartialEq for ValueSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|item| other.contains(item))
    }
}

fn same_member(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_member(x, y))
        }
        _ => left == right,
    }
}

impl FromIterator<Value> for ValueSet {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ValueSet {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for ValueSet {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Conversion from a bound [`Value`] into a Rust type.
pub trait FromValue: Sized {
    /// Human-readable name of the target type, used in mismatch errors.
    const EXPECTED: &'static str;

    /// Converts `value`, returning `None` when it holds another kind.
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    const EXPECTED: &'static str = "value";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_integer()
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "double";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_double()
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const EXPECTED: &'static str = "collection";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            Value::Set(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}
