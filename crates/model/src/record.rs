//! Dynamic records.
//!
//! A [`Record`] is a model whose accessors are declared at construction time,
//! the way a hand-written model type declares its getters and setters. Reading
//! or writing an undeclared accessor fails with [`AccessorError::Missing`].

use std::collections::HashMap;

use serde_json::Value;

use crate::{Accessed, AccessorError, Model};

/// Value stored behind a record accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// Plain JSON value.
    Value(Value),
    /// Associated record.
    Record(Record),
    /// Sequence of associated records.
    Records(Vec<Record>),
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        Field::Value(value)
    }
}

impl From<Record> for Field {
    fn from(record: Record) -> Self {
        Field::Record(record)
    }
}

impl From<Vec<Record>> for Field {
    fn from(records: Vec<Record>) -> Self {
        Field::Records(records)
    }
}

/// Model with a declared accessor list and dynamically stored fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    type_name: String,
    accessors: Vec<String>,
    fields: HashMap<String, Field>,
}

impl Record {
    /// Creates an empty record of `type_name` exposing `accessors`.
    pub fn new<I, S>(type_name: impl Into<String>, accessors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            type_name: type_name.into(),
            accessors: accessors.into_iter().map(Into::into).collect(),
            fields: HashMap::new(),
        }
    }

    /// Builder form of [`Record::set`] for plain values.
    ///
    /// Declares the accessor if the record does not expose it yet.
    pub fn with(self, accessor: &str, value: impl Into<Value>) -> Self {
        self.with_field(accessor, Field::Value(value.into()))
    }

    /// Builder form of [`Record::set`] for an associated record.
    pub fn with_record(self, accessor: &str, record: Record) -> Self {
        self.with_field(accessor, Field::Record(record))
    }

    /// Builder form of [`Record::set`] for a list of associated records.
    pub fn with_records(self, accessor: &str, records: Vec<Record>) -> Self {
        self.with_field(accessor, Field::Records(records))
    }

    fn with_field(mut self, accessor: &str, field: Field) -> Self {
        if !self.has_accessor(accessor) {
            self.accessors.push(accessor.to_string());
        }
        self.fields.insert(accessor.to_string(), field);
        self
    }

    /// Stores `field` behind a declared accessor.
    pub fn set(&mut self, accessor: &str, field: impl Into<Field>) -> Result<(), AccessorError> {
        if !self.has_accessor(accessor) {
            return Err(AccessorError::missing(&self.type_name, accessor));
        }
        self.fields.insert(accessor.to_string(), field.into());
        Ok(())
    }

    /// Returns the field stored behind `accessor`, if any.
    pub fn get(&self, accessor: &str) -> Option<&Field> {
        self.fields.get(accessor)
    }

    /// Returns the plain value stored behind `accessor`, if any.
    pub fn value(&self, accessor: &str) -> Option<&Value> {
        match self.fields.get(accessor) {
            Some(Field::Value(value)) => Some(value),
            _ => None,
        }
    }

    /// Declared accessor names, in declaration order.
    pub fn accessors(&self) -> &[String] {
        &self.accessors
    }

    pub fn has_accessor(&self, accessor: &str) -> bool {
        self.accessors.iter().any(|a| a == accessor)
    }
}

impl Model for Record {
    fn type_name(&self) -> Option<&str> {
        Some(&self.type_name)
    }

    fn read(&self, accessor: &str) -> Result<Accessed<'_>, AccessorError> {
        if !self.has_accessor(accessor) {
            return Err(AccessorError::missing(&self.type_name, accessor));
        }

        Ok(match self.fields.get(accessor) {
            None => Accessed::Value(Value::Null),
            Some(Field::Value(value)) => Accessed::Value(value.clone()),
            Some(Field::Record(record)) => Accessed::Model(record),
            Some(Field::Records(records)) => {
                Accessed::Models(records.iter().map(|r| r as &dyn Model).collect())
            }
        })
    }

    fn write(&mut self, accessor: &str, value: Value) -> Result<(), AccessorError> {
        self.set(accessor, Field::Value(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_declared_but_unset_accessor_reads_null() {
        let order = Record::new("order", ["id", "item"]);
        assert!(order.read("item").unwrap().is_nil());
    }

    #[test]
    fn test_undeclared_accessor_is_missing() {
        let order = Record::new("order", ["id"]);
        let err = order.read("total").unwrap_err();
        assert_eq!(err, AccessorError::missing("order", "total"));
    }

    #[test]
    fn test_nested_records_are_borrowed_as_models() {
        let item = Record::new("item", ["value"]).with("value", "Beer");
        let order = Record::new("order", ["id", "items"])
            .with("id", 1)
            .with_records("items", vec![item.clone(), item]);

        match order.read("items").unwrap() {
            Accessed::Models(models) => {
                assert_eq!(models.len(), 2);
                assert_eq!(models[0].type_name(), Some("item"));
            }
            other => panic!("expected models, got {:?}", other),
        }
    }

    #[test]
    fn test_write_respects_declared_accessors() {
        let mut item = Record::new("item", ["value"]);
        item.write("value", json!("Bier")).unwrap();
        assert_eq!(item.value("value"), Some(&json!("Bier")));
        assert!(item.write("price", json!(3)).is_err());
    }
}
