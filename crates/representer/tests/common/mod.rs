#![allow(dead_code)]

use std::sync::Arc;

use hyperxml_model::{Accessed, AccessorError, Model, Record};
use hyperxml_representer::{
    AttributeDefinition, Kind, Representer, RepresenterDef, RepresenterRegistry,
};
use serde_json::{Map, Value};

/// Registry with the item and order representers used across the tests.
///
/// - `item_application_xml`: `<item><value/></item>`
/// - `order_xml`: `id` plus a nested `item`
/// - `greedy_order_xml`: `id` plus a list of items tagged `item`, rendered as `<order>`
pub fn registry() -> RepresenterRegistry {
    let mut registry = RepresenterRegistry::new();
    registry
        .register(
            RepresenterDef::new("item_application_xml")
                .xml_name("item")
                .accessor("value"),
        )
        .unwrap();
    registry
        .register(
            RepresenterDef::new("order_xml").accessor("id").attribute(
                AttributeDefinition::new("item").with_kind(Kind::nested("item_application_xml")),
            ),
        )
        .unwrap();
    registry
        .register(
            RepresenterDef::new("greedy_order_xml")
                .xml_name("order")
                .accessor("id")
                .attribute(
                    AttributeDefinition::new("items")
                        .with_kind("[item_application_xml]".parse().unwrap())
                        .with_tag("item"),
                ),
        )
        .unwrap();
    registry
}

pub fn representer(name: &str) -> Arc<Representer> {
    registry().get(name).unwrap()
}

/// Representer with computed `self` and `next` links, rendered as `<wuff>`.
pub fn hypermedia_representer() -> Arc<Representer> {
    RepresenterDef::new("wuff_xml")
        .xml_name("wuff")
        .accessor("id")
        .link_with("self", |_| Some("http://self".to_string()))
        .link_with("next", |wuff| wuff.text("id").map(|id| format!("http://next/{id}")))
        .build()
        .unwrap()
}

pub fn item(value: &str) -> Record {
    Record::new("item", ["value"]).with("value", value)
}

pub fn order(id: impl Into<Value>) -> Record {
    Record::new("order", ["id", "item"]).with("id", id)
}

pub fn greedy_order(id: impl Into<Value>) -> Record {
    Record::new("order", ["id", "items"]).with("id", id)
}

pub fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

/// Hand-written model with a fixed set of accessors.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Song {
    pub title: Option<String>,
    pub track: Option<i64>,
}

impl Model for Song {
    fn type_name(&self) -> Option<&str> {
        Some("song")
    }

    fn read(&self, accessor: &str) -> Result<Accessed<'_>, AccessorError> {
        match accessor {
            "title" => Ok(Value::from(self.title.clone()).into()),
            "track" => Ok(Value::from(self.track).into()),
            _ => Err(AccessorError::missing("song", accessor)),
        }
    }

    fn write(&mut self, accessor: &str, value: Value) -> Result<(), AccessorError> {
        let rejected = |reason: &str| AccessorError::Rejected {
            type_name: "song".to_string(),
            accessor: accessor.to_string(),
            reason: reason.to_string(),
        };
        match accessor {
            "title" => {
                self.title = match value {
                    Value::Null => None,
                    Value::String(title) => Some(title),
                    _ => return Err(rejected("expected a string")),
                };
            }
            "track" => {
                self.track = match value {
                    Value::Null => None,
                    other => Some(other.as_i64().ok_or_else(|| rejected("expected an integer"))?),
                };
            }
            _ => return Err(AccessorError::missing("song", accessor)),
        }
        Ok(())
    }
}
