//! Untyped document trees.
//!
//! Both API generations are parsed into the same [`RawDocument`] shape before any schema is
//! applied: Plaza XML through [`RawDocument::parse_xml`] and Retailer JSON through
//! [`RawDocument::parse_json`]. The mapper only ever sees this tree, so it has no knowledge of
//! the wire format.
//!
//! # Shape
//!
//! | Source | `RawDocument` |
//! |--------|---------------|
//! | element with child elements | `Map` keyed by local name |
//! | repeated child element | `List` in document order |
//! | text-only element | `Text` (trimmed) |
//! | empty element | `Null` |
//! | attribute | entry in the element's `Map` |
//! | text of an element that also has attributes | entry under [`TEXT_KEY`] in that `Map` |
//! | JSON number | `Number` with the literal text |

use std::collections::BTreeMap;

mod json;
mod xml;

/// Key holding the text content of an XML element that also carries attributes.
///
/// `<Price currency="EUR">12.99</Price>` becomes a `Map` with `currency` and `$text`.
pub const TEXT_KEY: &str = "$text";

/// An untyped tree produced by the XML or JSON parser.
///
/// Numbers keep their literal text so that decimal values never pass through binary floating
/// point on their way to the mapper.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RawDocument {
    /// Empty element or JSON `null`.
    #[default]
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number, as written.
    Number(String),
    /// Text content.
    Text(String),
    /// Ordered sequence.
    List(Vec<RawDocument>),
    /// Keyed children.
    Map(BTreeMap<String, RawDocument>),
}

impl RawDocument {
    /// Looks up a key when this node is a map.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Returns the scalar text of a `Text` or `Number` node.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::Number(text) => Some(text),
            _ => None,
        }
    }

    /// Returns `true` for `Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Renders the node for diagnostics.
    ///
    /// Scalars render as their text; containers render as compact JSON.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Text(text) | Self::Number(text) => text.clone(),
            Self::Bool(value) => value.to_string(),
            Self::Null => "null".to_owned(),
            Self::List(_) | Self::Map(_) => self.to_json().to_string(),
        }
    }

    /// Converts the tree to a JSON value.
    ///
    /// `Number` nodes whose text is not a valid JSON number are emitted as strings.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            Self::Null => Value::Null,
            Self::Bool(value) => Value::Bool(*value),
            Self::Number(text) => match serde_json::from_str::<serde_json::Number>(text) {
                Ok(number) => Value::Number(number),
                Err(_) => Value::String(text.clone()),
            },
            Self::Text(text) => Value::String(text.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => {
                Value::Object(map.iter().map(|(key, value)| (key.clone(), value.to_json())).collect())
            }
        }
    }
}
