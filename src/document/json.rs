//! Retailer JSON to [`RawDocument`].

use serde_json::Value;

use super::RawDocument;
use crate::error::{ApiError, DocumentFormat, Result};

impl From<Value> for RawDocument {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n.to_string()),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Map(map.into_iter().map(|(key, value)| (key, Self::from(value))).collect())
            }
        }
    }
}

impl RawDocument {
    /// Parses a JSON document.
    ///
    /// An empty or whitespace-only body parses as [`RawDocument::Null`], which the mapper
    /// treats as an object with every field absent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Document`] when the body is not valid JSON.
    pub fn parse_json(input: &[u8]) -> Result<Self> {
        if input.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::Null);
        }
        let value: Value = serde_json::from_slice(input).map_err(|e| ApiError::Document {
            format: DocumentFormat::Json,
            message: e.to_string(),
        })?;
        Ok(Self::from(value))
    }
}
