//! Utility functions and constants for the XML codec.
//!
//! This module provides the reserved element and attribute names of the link
//! sub-protocol, name validation and scalar text conversion helpers.

use quick_xml::events::BytesText;
use serde_json::Value;

/// Element name used for hypermedia links.
///
/// No attribute may use this tag; link elements are collected separately.
pub const LINK_ELEMENT: &str = "link";

/// Attribute carrying the link relation.
pub const REL_ATTRIBUTE: &str = "rel";

/// Attribute carrying the link target.
pub const HREF_ATTRIBUTE: &str = "href";

/// Checks if a text event contains only XML whitespace.
pub fn is_whitespace_text(text: &BytesText) -> bool {
    is_whitespace(text.as_ref())
}

/// Checks if raw bytes contain only XML whitespace.
pub fn is_whitespace(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .all(|b| matches!(b, b' ' | b'\n' | b'\r' | b'\t'))
}

/// Checks if a name is usable as an XML element name.
///
/// Names must start with a letter or underscore and continue with letters,
/// digits, `_`, `-` or `.`.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Converts a scalar value to the text placed inside its element.
///
/// Returns `None` for null, which is never rendered.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(bool_to_string(*b).to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Converts a Rust boolean to its string representation for XML.
pub fn bool_to_string(b: bool) -> &'static str {
    if b { "true" } else { "false" }
}
