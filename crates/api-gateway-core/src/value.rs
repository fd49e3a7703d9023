// crates/api-gateway-core/src/value.rs
// ============================================================================
// Module: Dynamic Values and Arguments
// Description: Tagged values and argument maps used at the dispatch boundary.
// Purpose: Carry untyped JSON-like inputs and results with typed coercion.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`DynamicValue`] is the argument and result representation between the
//! HTTP surface and capability operations. Strongly typed backend models are
//! only used once an operation has decoded its [`Arguments`] through the
//! coercion helpers here, so every capability reports malformed input the
//! same way.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Number;
use serde_json::Value;
use thiserror::Error;

use crate::schema::ParameterType;

// ============================================================================
// SECTION: Dynamic Value
// ============================================================================

/// JSON-like tagged value.
///
/// # Invariants
/// - Object keys are kept sorted so serialization is deterministic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum DynamicValue {
    /// Explicit null.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Number.
    Number(Number),
    /// UTF-8 string.
    String(String),
    /// Ordered sequence.
    Array(Vec<DynamicValue>),
    /// String-keyed mapping.
    Object(BTreeMap<String, DynamicValue>),
}

impl DynamicValue {
    /// Returns the schema type tag matching this value, if any.
    ///
    /// `Null` has no type tag and never satisfies a declared parameter type.
    #[must_use]
    pub const fn type_tag(&self) -> Option<ParameterType> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(ParameterType::Boolean),
            Self::Number(_) => Some(ParameterType::Number),
            Self::String(_) => Some(ParameterType::String),
            Self::Array(_) => Some(ParameterType::Array),
            Self::Object(_) => Some(ParameterType::Object),
        }
    }

    /// Returns a short label describing the runtime kind.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Returns the string payload when this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the object payload when this is an object.
    #[must_use]
    pub const fn as_object(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Returns true for [`DynamicValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<Value> for DynamicValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(flag),
            Value::Number(number) => Self::Number(number),
            Value::String(text) => Self::String(text),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Object(map.into_iter().map(|(key, value)| (key, Self::from(value))).collect())
            }
        }
    }
}

impl From<DynamicValue> for Value {
    fn from(value: DynamicValue) -> Self {
        match value {
            DynamicValue::Null => Self::Null,
            DynamicValue::Bool(flag) => Self::Bool(flag),
            DynamicValue::Number(number) => Self::Number(number),
            DynamicValue::String(text) => Self::String(text),
            DynamicValue::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            DynamicValue::Object(map) => {
                Self::Object(map.into_iter().map(|(key, value)| (key, Self::from(value))).collect())
            }
        }
    }
}

impl From<&str> for DynamicValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for DynamicValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for DynamicValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

// ============================================================================
// SECTION: Validation Errors
// ============================================================================

/// Reason a parameter failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    /// Parameter was absent or null.
    Missing,
    /// Parameter was present with the wrong runtime type.
    TypeMismatch {
        /// Runtime kind that was supplied.
        found: &'static str,
    },
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => formatter.write_str("missing"),
            Self::TypeMismatch {
                found,
            } => write!(formatter, "found {found}"),
        }
    }
}

/// Argument validation failure for a single parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid parameter {parameter}: expected {expected}, {reason}")]
pub struct ValidationError {
    /// Offending parameter name.
    pub parameter: String,
    /// Declared parameter type.
    pub expected: ParameterType,
    /// Failure reason.
    pub reason: ValidationReason,
}

impl ValidationError {
    /// Builds a validation error.
    #[must_use]
    pub fn new(parameter: &str, expected: ParameterType, reason: ValidationReason) -> Self {
        Self {
            parameter: parameter.to_string(),
            expected,
            reason,
        }
    }
}

// ============================================================================
// SECTION: Arguments
// ============================================================================

/// Caller-supplied argument map for one dispatch.
///
/// # Invariants
/// - Owned by a single invocation; never shared across tasks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments {
    /// Named argument values.
    values: BTreeMap<String, DynamicValue>,
}

impl Arguments {
    /// Creates an empty argument map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an argument, returning the updated map.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<DynamicValue>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    /// Inserts an argument, replacing any previous value.
    pub fn insert(&mut self, name: &str, value: impl Into<DynamicValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    /// Returns the raw value for a key, including explicit nulls.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DynamicValue> {
        self.values.get(name)
    }

    /// Returns the value for a key when it is present and not null.
    #[must_use]
    pub fn supplied(&self, name: &str) -> Option<&DynamicValue> {
        self.values.get(name).filter(|value| !value.is_null())
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when no arguments were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns a required string argument.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the argument is missing or not a string.
    pub fn require_str(&self, name: &str) -> Result<&str, ValidationError> {
        match self.supplied(name) {
            None => {
                Err(ValidationError::new(name, ParameterType::String, ValidationReason::Missing))
            }
            Some(DynamicValue::String(text)) => Ok(text),
            Some(other) => Err(ValidationError::new(
                name,
                ParameterType::String,
                ValidationReason::TypeMismatch {
                    found: other.kind_label(),
                },
            )),
        }
    }

    /// Returns an optional string argument; absent and null yield `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the argument is present but not a string.
    pub fn optional_str(&self, name: &str) -> Result<Option<&str>, ValidationError> {
        match self.supplied(name) {
            None => Ok(None),
            Some(DynamicValue::String(text)) => Ok(Some(text)),
            Some(other) => Err(ValidationError::new(
                name,
                ParameterType::String,
                ValidationReason::TypeMismatch {
                    found: other.kind_label(),
                },
            )),
        }
    }

    /// Returns a required array argument.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the argument is missing or not an array.
    pub fn require_array(&self, name: &str) -> Result<&[DynamicValue], ValidationError> {
        match self.supplied(name) {
            None => {
                Err(ValidationError::new(name, ParameterType::Array, ValidationReason::Missing))
            }
            Some(DynamicValue::Array(items)) => Ok(items),
            Some(other) => Err(ValidationError::new(
                name,
                ParameterType::Array,
                ValidationReason::TypeMismatch {
                    found: other.kind_label(),
                },
            )),
        }
    }
}

impl FromIterator<(String, DynamicValue)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (String, DynamicValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
