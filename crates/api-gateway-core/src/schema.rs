// crates/api-gateway-core/src/schema.rs
// ============================================================================
// Module: Parameter Schema Model
// Description: Declarative parameter descriptions for gateway capabilities.
// Purpose: Describe capability inputs for validation and catalogue export.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`ParameterSchema`] is always an object schema: a set of named
//! [`Parameter`] entries, each with a primitive [`ParameterType`], a
//! description, and a required flag. The list of required names is derived
//! from the per-parameter flags and is never stored separately, so the two
//! views cannot disagree.
//!
//! ## Wire Shape
//! ```json
//! {"type": "object",
//!  "properties": {"id": {"name": "id", "type": "string", "description": "...", "required": true}},
//!  "required": ["id"]}
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::value::Arguments;
use crate::value::ValidationError;
use crate::value::ValidationReason;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fixed schema kind for parameter sets.
const OBJECT_KIND: &str = "object";

// ============================================================================
// SECTION: Parameter Types
// ============================================================================

/// Primitive type tag for a single parameter.
///
/// # Invariants
/// - Variants are a closed set and serialize as lowercase JSON Schema names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    /// UTF-8 string.
    String,
    /// JSON number (integer or floating point).
    Number,
    /// Boolean.
    Boolean,
    /// Ordered sequence of values.
    Array,
    /// Mapping of string keys to values.
    Object,
}

impl ParameterType {
    /// Returns the stable wire label for the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Declarative description of a single capability parameter.
///
/// # Invariants
/// - `name` is non-empty once accepted by [`ParameterSchema::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name (argument map key).
    pub name: String,
    /// Primitive type tag.
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    /// Human-readable description for callers.
    pub description: String,
    /// Whether callers must supply the parameter.
    pub required: bool,
}

impl Parameter {
    /// Builds a required parameter.
    #[must_use]
    pub fn required(
        name: impl Into<String>,
        param_type: ParameterType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: description.into(),
            required: true,
        }
    }

    /// Builds an optional parameter.
    #[must_use]
    pub fn optional(
        name: impl Into<String>,
        param_type: ParameterType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: description.into(),
            required: false,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Schema construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A parameter was declared with an empty name.
    #[error("parameter name must be non-empty")]
    EmptyName,
    /// Two parameters share the same name.
    #[error("duplicate parameter: {0}")]
    DuplicateParameter(String),
    /// Schema kind is not `object`.
    #[error("unsupported schema type: {0}")]
    UnsupportedKind(String),
    /// A property key disagrees with the parameter's own name.
    #[error("property key {key} does not match parameter name {name}")]
    KeyMismatch {
        /// Property map key.
        key: String,
        /// Parameter name inside the property.
        name: String,
    },
    /// The required list disagrees with the per-parameter flags.
    #[error("required list disagrees with parameter flags for {0}")]
    RequiredMismatch(String),
}

// ============================================================================
// SECTION: Parameter Schema
// ============================================================================

/// Object schema describing a capability's parameter set.
///
/// # Invariants
/// - Parameter names are unique and non-empty.
/// - Declaration order is preserved for export of the required list.
/// - Required names are derived from [`Parameter::required`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "ParameterSchemaWire", try_from = "ParameterSchemaWire")]
pub struct ParameterSchema {
    /// Parameters in declaration order.
    parameters: Vec<Parameter>,
}

impl ParameterSchema {
    /// Builds a schema from parameters in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when a name is empty or duplicated.
    pub fn new(parameters: Vec<Parameter>) -> Result<Self, SchemaError> {
        let mut seen = BTreeSet::new();
        for parameter in &parameters {
            if parameter.name.trim().is_empty() {
                return Err(SchemaError::EmptyName);
            }
            if !seen.insert(parameter.name.as_str()) {
                return Err(SchemaError::DuplicateParameter(parameter.name.clone()));
            }
        }
        Ok(Self {
            parameters,
        })
    }

    /// Returns a builder for incremental schema declaration.
    #[must_use]
    pub fn builder() -> ParameterSchemaBuilder {
        ParameterSchemaBuilder::default()
    }

    /// Returns the parameters in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|parameter| parameter.name == name)
    }

    /// Returns the required parameter names in declaration order.
    #[must_use]
    pub fn required_names(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|parameter| parameter.required)
            .map(|parameter| parameter.name.as_str())
            .collect()
    }

    /// Validates an argument map against the schema.
    ///
    /// Required parameters must be present and non-null. Any declared
    /// parameter that is supplied must match its declared type. Undeclared
    /// arguments are ignored.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, in declaration order.
    pub fn validate(&self, args: &Arguments) -> Result<(), ValidationError> {
        for parameter in &self.parameters {
            match args.supplied(&parameter.name) {
                None if parameter.required => {
                    return Err(ValidationError::new(
                        &parameter.name,
                        parameter.param_type,
                        ValidationReason::Missing,
                    ));
                }
                None => {}
                Some(value) => {
                    if value.type_tag() != Some(parameter.param_type) {
                        return Err(ValidationError::new(
                            &parameter.name,
                            parameter.param_type,
                            ValidationReason::TypeMismatch {
                                found: value.kind_label(),
                            },
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Incremental builder for [`ParameterSchema`].
#[derive(Debug, Default)]
pub struct ParameterSchemaBuilder {
    /// Parameters collected so far.
    parameters: Vec<Parameter>,
}

impl ParameterSchemaBuilder {
    /// Adds a required parameter.
    #[must_use]
    pub fn required(
        mut self,
        name: &str,
        param_type: ParameterType,
        description: &str,
    ) -> Self {
        self.parameters.push(Parameter::required(name, param_type, description));
        self
    }

    /// Adds an optional parameter.
    #[must_use]
    pub fn optional(
        mut self,
        name: &str,
        param_type: ParameterType,
        description: &str,
    ) -> Self {
        self.parameters.push(Parameter::optional(name, param_type, description));
        self
    }

    /// Finalizes the schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when a name is empty or duplicated.
    pub fn build(self) -> Result<ParameterSchema, SchemaError> {
        ParameterSchema::new(self.parameters)
    }
}

// ============================================================================
// SECTION: Wire Format
// ============================================================================

/// Serialized form of a parameter schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ParameterSchemaWire {
    /// Schema kind, always `object`.
    #[serde(rename = "type")]
    kind: String,
    /// Parameters keyed by name.
    #[serde(default)]
    properties: BTreeMap<String, Parameter>,
    /// Required parameter names.
    #[serde(default)]
    required: Vec<String>,
}

impl From<ParameterSchema> for ParameterSchemaWire {
    fn from(schema: ParameterSchema) -> Self {
        let required =
            schema.required_names().into_iter().map(str::to_string).collect::<Vec<_>>();
        let properties = schema
            .parameters
            .into_iter()
            .map(|parameter| (parameter.name.clone(), parameter))
            .collect();
        Self {
            kind: OBJECT_KIND.to_string(),
            properties,
            required,
        }
    }
}

impl TryFrom<ParameterSchemaWire> for ParameterSchema {
    type Error = SchemaError;

    fn try_from(wire: ParameterSchemaWire) -> Result<Self, Self::Error> {
        if wire.kind != OBJECT_KIND {
            return Err(SchemaError::UnsupportedKind(wire.kind));
        }
        let listed: BTreeSet<&str> = wire.required.iter().map(String::as_str).collect();
        for name in &listed {
            match wire.properties.get(*name) {
                Some(parameter) if parameter.required => {}
                _ => return Err(SchemaError::RequiredMismatch((*name).to_string())),
            }
        }
        let mut parameters = Vec::with_capacity(wire.properties.len());
        for (key, parameter) in wire.properties {
            if key != parameter.name {
                return Err(SchemaError::KeyMismatch {
                    key,
                    name: parameter.name,
                });
            }
            if parameter.required && !listed.contains(key.as_str()) {
                return Err(SchemaError::RequiredMismatch(key));
            }
            parameters.push(parameter);
        }
        Self::new(parameters)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
