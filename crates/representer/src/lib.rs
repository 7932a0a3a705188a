//! # hyperxml representer core
//!
//! Declares representer types once and uses them to convert values between
//! in-memory models, attribute maps and XML documents carrying hypermedia
//! links (`<link rel="..." href="..."/>`).
//!
//! ## Features
//!
//! - **Definitions**: scalar, nested and list attributes with tag and source
//!   accessor overrides, plus link relations computed from the instance.
//! - **Inheritance**: a type extends a parent; the full definition registry is
//!   composed once when the type is built.
//! - **Attribute maps**: `serde_json` objects in and out, with the nested
//!   `_attributes` form for nested and list values.
//! - **XML**: a small document tree over `quick-xml` with typed scalar
//!   coercion and link collection.
//!
//! ## Mapping
//!
//! | Attribute | XML |
//! |-----------|-----|
//! | scalar `id = 1` | `<id>1</id>` |
//! | nested `item` | `<item><value>Beer</value></item>` |
//! | list `items` tagged `item` | `<item>...</item><item>...</item>` |
//! | link `self` | `<link rel="self" href="http://orders/1"/>` |
//!
//! ## Example
//!
//! ```
//! use hyperxml_model::Record;
//! use hyperxml_representer::{RepresenterDef, XmlOptions};
//!
//! let order = RepresenterDef::new("order")
//!     .accessor("id")
//!     .link_with("self", |order| order.text("id").map(|id| format!("http://orders/{id}")))
//!     .build()?;
//!
//! let source = Record::new("order", ["id"]).with("id", 1);
//! let xml = order.serialize_model(&source, &XmlOptions::default())?;
//! assert_eq!(
//!     xml,
//!     r#"<order><id>1</id><link rel="self" href="http://orders/1"/></order>"#
//! );
//!
//! let parsed = order.from_xml(Some(&xml))?;
//! assert_eq!(parsed.links().and_then(|links| links.get("self")), Some("http://orders/1"));
//! # Ok::<(), hyperxml_representer::RepresenterError>(())
//! ```

pub mod definition;
pub mod error;
pub mod instance;
pub mod links;
pub mod options;
pub mod registry;
pub mod serde_helpers;
pub mod xml;

pub use definition::{
    AttributeDefinition, Definition, Kind, LinkComputation, LinkRelation, LinksDefinition,
    ScalarType, TypeRef,
};
pub use error::{ConfigurationError, RepresenterError, Result};
pub use instance::{AttributeValue, Instance};
pub use links::{Link, LinkCollection, normalize_rel};
pub use options::XmlOptions;
pub use registry::{Representer, RepresenterDef, RepresenterRegistry};
pub use xml::document::{Element, Node};
