//! Converted values and the name-keyed maps that hold them.

use crate::error::{Result, UsageError};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// A typed value produced by a [`Converter`](crate::Converter).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Number(f64),
    Bool(bool),
    List(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{n}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Number(n) => fmt_number(*n, f),
            Self::Bool(b) => write!(f, "{b}"),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// Extraction of a concrete Rust type from a [`Value`].
pub trait FromValue: Sized {
    /// Short type name used in mismatch errors.
    const EXPECTED: &'static str;

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
        value.as_str().map(str::to_string)
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "number";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_number()
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const EXPECTED: &'static str = "list";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_list()?.iter().map(T::from_value).collect()
    }
}

/// Option values keyed by option name, in declaration order.
///
/// A key maps to `None` when the option resolved to "absent": no value was
/// supplied (or the supplied one converted to nothing) and no default exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Values {
    entries: IndexMap<String, Option<Value>>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` has an entry, even an absent one.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// The resolved value for `name`, if present and not absent.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.entries.get(name).and_then(Option::as_ref)
    }

    /// Typed access. `Ok(None)` when the name is unknown or absent.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<Option<T>> {
        let Some(value) = self.value(name) else {
            return Ok(None);
        };
        T::from_value(value).map(Some).ok_or_else(|| {
            UsageError::TypeMismatch {
                name: name.to_string(),
                expected: T::EXPECTED,
            }
            .into()
        })
    }

    /// Build a user-defined struct from these values.
    pub fn extract<T: FromConfig>(&self) -> Result<T> {
        T::from_config(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: Option<Value>) {
        self.entries.insert(name.into(), value);
    }
}

/// A concrete settings struct built from a parser's config.
///
/// ```
/// use cmdflow::{FromConfig, Values};
///
/// struct Greet {
///     name: String,
///     loud: bool,
/// }
///
/// impl FromConfig for Greet {
///     fn from_config(config: &Values) -> cmdflow::Result<Self> {
///         Ok(Self {
///             name: config.get("name")?.unwrap_or_default(),
///             loud: config.get("loud")?.unwrap_or(false),
///         })
///     }
/// }
/// ```
pub trait FromConfig: Sized {
    fn from_config(config: &Values) -> Result<Self>;
}

/// Positional values in the order they were found.
///
/// Slots are `None` when a declared argument converted to absent and has no
/// default.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Arguments {
    values: Vec<Option<Value>>,
}

impl Arguments {
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(Option::as_ref)
    }

    pub fn get<T: FromValue>(&self, index: usize) -> Result<Option<T>> {
        let Some(value) = self.value(index) else {
            return Ok(None);
        };
        T::from_value(value).map(Some).ok_or_else(|| {
            UsageError::TypeMismatch {
                name: format!("argument #{index}"),
                expected: T::EXPECTED,
            }
            .into()
        })
    }

    pub fn as_slice(&self) -> &[Option<Value>] {
        self.values.as_slice()
    }

    /// All present values rendered as strings.
    pub fn to_strings(&self) -> Vec<String> {
        self.values.iter().flatten().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn push(&mut self, value: Option<Value>) {
        self.values.push(value);
    }
}
