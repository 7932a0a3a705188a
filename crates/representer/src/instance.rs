//! Representer instances and the attribute-map codec.
//!
//! An [`Instance`] holds the current value of each declared attribute of one
//! [`Representer`] plus an optional [`LinkCollection`]. Instances are created
//! empty, from an attribute map, from a source [`Model`], or from XML (see
//! [`crate::xml::codec`]).
//!
//! Attribute maps are `serde_json` objects keyed by attribute name. Nested
//! values are objects and list values are arrays of objects.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use hyperxml_model::{Accessed, Model};
use serde_json::{Map, Value};
use tracing::trace;

use crate::definition::{AttributeDefinition, Kind, TypeRef};
use crate::error::{ConfigurationError, RepresenterError, Result};
use crate::links::LinkCollection;
use crate::registry::Representer;
use crate::serde_helpers::{json_type, object_list};
use crate::xml::utils::scalar_text;

/// Value of one attribute of an [`Instance`].
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Scalar(Value),
    Nested(Box<Instance>),
    List(Vec<Instance>),
}

impl AttributeValue {
    fn describe(&self) -> String {
        match self {
            AttributeValue::Scalar(value) => json_type(value).to_string(),
            AttributeValue::Nested(instance) => format!("{} instance", instance.representer.name()),
            AttributeValue::List(_) => "list of instances".to_string(),
        }
    }

    /// Attribute-map form of the value.
    pub fn to_value(&self) -> Value {
        match self {
            AttributeValue::Scalar(value) => value.clone(),
            AttributeValue::Nested(instance) => Value::Object(instance.to_attribute_map()),
            AttributeValue::List(items) => Value::Array(
                items
                    .iter()
                    .map(|item| Value::Object(item.to_attribute_map()))
                    .collect(),
            ),
        }
    }
}

/// A value converted through a [`Representer`].
#[derive(Clone)]
pub struct Instance {
    representer: Arc<Representer>,
    pub(crate) values: HashMap<String, AttributeValue>,
    pub(crate) links: Option<LinkCollection>,
    pub(crate) model_name: Option<String>,
}

impl Instance {
    pub(crate) fn new(representer: Arc<Representer>) -> Self {
        Self {
            representer,
            values: HashMap::new(),
            links: None,
            model_name: None,
        }
    }

    pub fn representer(&self) -> &Arc<Representer> {
        &self.representer
    }

    /// Type name of the model this instance was populated from.
    pub fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    pub fn scalar(&self, name: &str) -> Option<&Value> {
        match self.values.get(name) {
            Some(AttributeValue::Scalar(value)) => Some(value),
            _ => None,
        }
    }

    /// Scalar value as text, numbers and booleans included.
    pub fn text(&self, name: &str) -> Option<String> {
        self.scalar(name).and_then(scalar_text)
    }

    pub fn nested(&self, name: &str) -> Option<&Instance> {
        match self.values.get(name) {
            Some(AttributeValue::Nested(instance)) => Some(instance),
            _ => None,
        }
    }

    /// Items of a list attribute; empty when unset.
    pub fn list(&self, name: &str) -> &[Instance] {
        match self.values.get(name) {
            Some(AttributeValue::List(items)) => items,
            _ => &[],
        }
    }

    /// Set attributes in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (&AttributeDefinition, &AttributeValue)> {
        self.representer
            .attributes()
            .iter()
            .filter_map(|attribute| Some((attribute, self.values.get(attribute.name())?)))
    }

    /// Sets an attribute, checking the value against its declared kind.
    ///
    /// A null scalar unsets the attribute.
    pub fn set(&mut self, name: &str, value: AttributeValue) -> Result<()> {
        let attribute = self.representer.attribute(name).ok_or_else(|| {
            RepresenterError::UnknownAttribute {
                representer: self.representer.name().to_string(),
                attribute: name.to_string(),
            }
        })?;

        let accepted = match (attribute.kind(), &value) {
            (Kind::Scalar(_), AttributeValue::Scalar(v)) => !v.is_array() && !v.is_object(),
            (Kind::Nested(type_ref), AttributeValue::Nested(instance)) => {
                instance.representer.is_a(type_ref.name())
            }
            (Kind::List(type_ref), AttributeValue::List(items)) => items
                .iter()
                .all(|item| item.representer.is_a(type_ref.name())),
            _ => false,
        };
        if !accepted {
            return Err(RepresenterError::TypeMismatch {
                attribute: name.to_string(),
                expected: attribute.kind().describe(),
                found: value.describe(),
            });
        }

        if matches!(value, AttributeValue::Scalar(Value::Null)) {
            self.values.remove(name);
        } else {
            self.values.insert(name.to_string(), value);
        }
        Ok(())
    }

    pub fn set_scalar(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.set(name, AttributeValue::Scalar(value.into()))
    }

    pub fn set_nested(&mut self, name: &str, instance: Instance) -> Result<()> {
        self.set(name, AttributeValue::Nested(Box::new(instance)))
    }

    pub fn set_list(&mut self, name: &str, items: Vec<Instance>) -> Result<()> {
        self.set(name, AttributeValue::List(items))
    }

    pub fn unset(&mut self, name: &str) -> Option<AttributeValue> {
        self.values.remove(name)
    }

    pub fn links(&self) -> Option<&LinkCollection> {
        self.links.as_ref()
    }

    pub fn set_links(&mut self, links: impl Into<LinkCollection>) {
        self.links = Some(links.into());
    }

    /// Evaluates the links definition against the current attribute state.
    ///
    /// Does nothing for types without link relations.
    pub fn compute_links(&mut self) {
        let representer = Arc::clone(&self.representer);
        if let Some(definition) = representer.links_definition() {
            self.links = Some(definition.evaluate(self));
        }
    }

    /// True when no attribute is set and there are no links.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.links.as_ref().is_none_or(LinkCollection::is_empty)
    }

    /// Attribute map of every set attribute; links are not included.
    pub fn to_attribute_map(&self) -> Map<String, Value> {
        self.iter()
            .map(|(attribute, value)| (attribute.name().to_string(), value.to_value()))
            .collect()
    }

    /// Attribute map with nested and list keys suffixed `_attributes`, links
    /// included when present.
    pub fn to_nested_attributes(&self) -> Map<String, Value> {
        let mut attributes = Map::new();
        for (attribute, value) in self.iter() {
            let (key, value) = match value {
                AttributeValue::Scalar(value) => (attribute.name().to_string(), value.clone()),
                AttributeValue::Nested(instance) => (
                    format!("{}_attributes", attribute.name()),
                    Value::Object(instance.to_nested_attributes()),
                ),
                AttributeValue::List(items) => (
                    format!("{}_attributes", attribute.name()),
                    Value::Array(
                        items
                            .iter()
                            .map(|item| Value::Object(item.to_nested_attributes()))
                            .collect(),
                    ),
                ),
            };
            attributes.insert(key, value);
        }

        if let Some(links) = self.links.as_ref().filter(|links| !links.is_empty()) {
            let key = self
                .representer
                .links_definition()
                .map_or("links", |definition| definition.name());
            attributes.insert(key.to_string(), links.to_attributes());
        }
        attributes
    }

    /// Writes every set attribute to `target` through its source accessor.
    pub fn apply_to(&self, target: &mut dyn Model) -> Result<()> {
        for (attribute, value) in self.iter() {
            target
                .write(attribute.source(), value.to_value())
                .map_err(|source| RepresenterError::Accessor {
                    representer: self.representer.name().to_string(),
                    source,
                })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("representer", &self.representer.name())
            .field("values", &self.values)
            .field("links", &self.links)
            .finish()
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        let links = |instance: &Instance| instance.links.clone().filter(|l| !l.is_empty());
        self.representer.name() == other.representer.name()
            && self.values == other.values
            && links(self) == links(other)
    }
}

pub(crate) fn bound(type_ref: &TypeRef) -> Result<&Arc<Representer>> {
    type_ref.representer().ok_or_else(|| {
        ConfigurationError::UnknownType {
            name: type_ref.name().to_string(),
        }
        .into()
    })
}

fn mismatch(attribute: &AttributeDefinition, found: impl Into<String>) -> RepresenterError {
    RepresenterError::TypeMismatch {
        attribute: attribute.name().to_string(),
        expected: attribute.kind().describe(),
        found: found.into(),
    }
}

impl Representer {
    /// Builds an instance from an attribute map.
    ///
    /// Keys that name no attribute are ignored, null values leave the
    /// attribute unset. The links key, when present, is read as the link
    /// collection; otherwise links are computed from the populated instance.
    pub fn from_attribute_map(self: &Arc<Self>, attributes: &Map<String, Value>) -> Result<Instance> {
        let mut instance = self.new_instance();

        for attribute in self.attributes() {
            let Some(value) = attributes.get(attribute.name()) else {
                continue;
            };
            if value.is_null() {
                trace!(attribute = attribute.name(), "null value left unset");
                continue;
            }

            let value = match attribute.kind() {
                Kind::Scalar(_) => {
                    if value.is_array() || value.is_object() {
                        return Err(mismatch(attribute, json_type(value)));
                    }
                    AttributeValue::Scalar(value.clone())
                }
                Kind::Nested(type_ref) => match value {
                    Value::Object(map) => {
                        AttributeValue::Nested(Box::new(bound(type_ref)?.from_attribute_map(map)?))
                    }
                    other => return Err(mismatch(attribute, json_type(other))),
                },
                Kind::List(type_ref) => {
                    let maps = object_list(value).ok_or_else(|| mismatch(attribute, json_type(value)))?;
                    let nested = bound(type_ref)?;
                    AttributeValue::List(
                        maps.iter()
                            .map(|map| nested.from_attribute_map(map))
                            .collect::<Result<_>>()?,
                    )
                }
            };
            instance.values.insert(attribute.name().to_string(), value);
        }

        if let Some(definition) = self.links_definition()
            && let Some(links) = attributes.get(definition.name()).filter(|v| !v.is_null())
        {
            instance.links = Some(LinkCollection::from_attributes(links)?);
        } else {
            instance.compute_links();
        }

        Ok(instance)
    }

    /// Builds an instance from already converted values, nested instances
    /// included, then computes links.
    ///
    /// Names that match no attribute are ignored; values are checked against
    /// the declared kind.
    pub fn from_attribute_values<I, K>(self: &Arc<Self>, values: I) -> Result<Instance>
    where
        I: IntoIterator<Item = (K, AttributeValue)>,
        K: AsRef<str>,
    {
        let mut instance = self.new_instance();
        for (name, value) in values {
            let name = name.as_ref();
            if self.attribute(name).is_none() {
                trace!(representer = self.name(), attribute = name, "ignoring unknown attribute");
                continue;
            }
            instance.set(name, value)?;
        }
        instance.compute_links();
        Ok(instance)
    }

    /// Builds an instance by reading every attribute's source accessor on
    /// `source`, then computes links against the populated instance.
    pub fn populate_from_source(self: &Arc<Self>, source: &dyn Model) -> Result<Instance> {
        let mut instance = self.new_instance();
        instance.model_name = source.type_name().map(str::to_string);

        for attribute in self.attributes() {
            let accessed =
                source
                    .read(attribute.source())
                    .map_err(|source| RepresenterError::Accessor {
                        representer: self.name().to_string(),
                        source,
                    })?;
            if accessed.is_nil() {
                continue;
            }

            trace!(
                representer = self.name(),
                attribute = attribute.name(),
                accessor = attribute.source(),
                "populating attribute"
            );
            let value = populate_value(attribute, accessed)?;
            instance.values.insert(attribute.name().to_string(), value);
        }

        instance.compute_links();
        Ok(instance)
    }
}

fn populate_value(attribute: &AttributeDefinition, accessed: Accessed<'_>) -> Result<AttributeValue> {
    match (attribute.kind(), accessed) {
        (Kind::Scalar(_), Accessed::Value(value)) if !value.is_array() && !value.is_object() => {
            Ok(AttributeValue::Scalar(value))
        }
        (Kind::Nested(type_ref), Accessed::Model(model)) => Ok(AttributeValue::Nested(Box::new(
            bound(type_ref)?.populate_from_source(model)?,
        ))),
        (Kind::Nested(type_ref), Accessed::Value(Value::Object(map))) => Ok(
            AttributeValue::Nested(Box::new(bound(type_ref)?.populate_from_source(&map)?)),
        ),
        (Kind::List(type_ref), Accessed::Models(models)) => {
            let nested = bound(type_ref)?;
            Ok(AttributeValue::List(
                models
                    .into_iter()
                    .map(|model| nested.populate_from_source(model))
                    .collect::<Result<_>>()?,
            ))
        }
        (Kind::List(type_ref), Accessed::Model(model)) => Ok(AttributeValue::List(vec![
            bound(type_ref)?.populate_from_source(model)?,
        ])),
        (Kind::List(type_ref), Accessed::Value(value)) => {
            let maps = object_list(&value).ok_or_else(|| mismatch(attribute, json_type(&value)))?;
            let nested = bound(type_ref)?;
            Ok(AttributeValue::List(
                maps.iter()
                    .map(|map| nested.populate_from_source(map))
                    .collect::<Result<_>>()?,
            ))
        }
        (_, accessed) => Err(mismatch(attribute, accessed.describe())),
    }
}
