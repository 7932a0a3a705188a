//! # hyperxml model layer
//!
//! The representer core never inspects domain types directly. Everything it
//! needs from a model goes through the [`Model`] trait:
//!
//! - [`Model::type_name`] - the canonical type name, if any, used as a fallback XML root name
//! - [`Model::read`] - read an attribute by accessor name
//! - [`Model::write`] - write an attribute by accessor name
//!
//! Two ready-made implementations are provided: [`Record`], a dynamic model
//! with a declared accessor list, and `serde_json::Map<String, Value>`, which
//! treats every key as an accessor.
//!
//! ## Example
//!
//! ```
//! use hyperxml_model::{Accessed, Model, Record};
//!
//! let item = Record::new("item", ["value"]).with("value", "Beer");
//! match item.read("value").unwrap() {
//!     Accessed::Value(value) => assert_eq!(value, "Beer"),
//!     _ => unreachable!(),
//! }
//! assert!(item.read("price").is_err());
//! ```

pub mod record;

pub use record::{Field, Record};

use serde_json::{Map, Value};
use thiserror::Error;

/// Result of reading an accessor on a [`Model`].
///
/// Scalars (and plain JSON structures) come back as [`Accessed::Value`]; an
/// associated model comes back borrowed so nested representers can populate
/// themselves from it.
pub enum Accessed<'a> {
    /// A plain value. `Value::Null` means the attribute is unset.
    Value(Value),
    /// A single associated model.
    Model(&'a dyn Model),
    /// A sequence of associated models.
    Models(Vec<&'a dyn Model>),
}

impl Accessed<'_> {
    /// Returns true when nothing is stored behind the accessor.
    pub fn is_nil(&self) -> bool {
        matches!(self, Accessed::Value(Value::Null))
    }

    /// Short description of the variant, used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Accessed::Value(Value::Null) => "null",
            Accessed::Value(Value::Bool(_)) => "boolean",
            Accessed::Value(Value::Number(_)) => "number",
            Accessed::Value(Value::String(_)) => "string",
            Accessed::Value(Value::Array(_)) => "array",
            Accessed::Value(Value::Object(_)) => "object",
            Accessed::Model(_) => "model",
            Accessed::Models(_) => "model list",
        }
    }
}

impl std::fmt::Debug for Accessed<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Accessed::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Accessed::Model(model) => f.debug_tuple("Model").field(&model.type_name()).finish(),
            Accessed::Models(models) => f
                .debug_tuple("Models")
                .field(&models.iter().map(|m| m.type_name()).collect::<Vec<_>>())
                .finish(),
        }
    }
}

impl From<Value> for Accessed<'_> {
    fn from(value: Value) -> Self {
        Accessed::Value(value)
    }
}

/// Errors raised by model accessors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessorError {
    /// The model has no accessor with this name.
    #[error("{type_name} has no accessor `{accessor}`")]
    Missing { type_name: String, accessor: String },

    /// The model refused the value written to an accessor.
    #[error("{type_name} rejected value for `{accessor}`: {reason}")]
    Rejected {
        type_name: String,
        accessor: String,
        reason: String,
    },
}

impl AccessorError {
    /// Builds a [`AccessorError::Missing`] for the given model and accessor.
    pub fn missing(type_name: impl Into<String>, accessor: impl Into<String>) -> Self {
        AccessorError::Missing {
            type_name: type_name.into(),
            accessor: accessor.into(),
        }
    }

    /// The accessor name the error refers to.
    pub fn accessor(&self) -> &str {
        match self {
            AccessorError::Missing { accessor, .. } | AccessorError::Rejected { accessor, .. } => {
                accessor
            }
        }
    }
}

/// Capability interface the representer core uses to talk to domain objects.
pub trait Model {
    /// Canonical type name of the model, e.g. `"order"`.
    ///
    /// Schemaless models have none and return `None`.
    fn type_name(&self) -> Option<&str>;

    /// Reads the value behind `accessor`.
    ///
    /// Returns [`AccessorError::Missing`] when the model has no such accessor.
    /// An accessor that exists but holds nothing returns `Accessed::Value(Value::Null)`.
    fn read(&self, accessor: &str) -> Result<Accessed<'_>, AccessorError>;

    /// Writes `value` to `accessor`.
    fn write(&mut self, accessor: &str, value: Value) -> Result<(), AccessorError>;
}

/// JSON objects are schemaless models: every key is an accessor and absent
/// keys read as null.
impl Model for Map<String, Value> {
    fn type_name(&self) -> Option<&str> {
        None
    }

    fn read(&self, accessor: &str) -> Result<Accessed<'_>, AccessorError> {
        Ok(Accessed::Value(
            self.get(accessor).cloned().unwrap_or(Value::Null),
        ))
    }

    fn write(&mut self, accessor: &str, value: Value) -> Result<(), AccessorError> {
        self.insert(accessor.to_string(), value);
        Ok(())
    }
}
