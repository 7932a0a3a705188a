//! XML support for representer instances.
//!
//! - [`document`]: the [`Element`](document::Element) tree, parsed and
//!   rendered with quick-xml.
//! - [`codec`]: `Instance::to_xml`, `Representer::from_xml` and friends.
//! - [`utils`]: shared constants and text helpers.

pub mod codec;
pub mod document;
pub mod utils;
