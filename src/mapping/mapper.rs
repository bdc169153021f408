//! Schema-driven mapping from [`RawDocument`] to [`MappedObject`].
//!
//! The mapper is a pure function of its inputs: it holds no state between calls and can be
//! used from any number of threads at once.
//!
//! # Rules
//!
//! 1. Every descriptor's key is looked up in the current node. Keys the schema does not
//!    declare are ignored.
//! 2. An absent (or empty) optional field is skipped; the attribute is not set. An absent
//!    required field is recorded as a [`MissingField`](super::MissingField) diagnostic and
//!    mapping continues.
//! 3. Scalars go through their [`Coercion`](super::Coercion). Failures abort the mapping
//!    unless the field is best-effort, in which case the raw text is kept.
//! 4. Objects recurse into their nested schema.
//! 5. Lists accept a list, a single node (XML single-element collapse) or nothing, and always
//!    produce a list attribute, empty when the source had no elements.

use tracing::{debug, trace};

use super::{
    coerce::{Coercion, ValueKind, coerce},
    schema::{CoercionPolicy, FieldDescriptor, FieldKind, ListItem, Schema},
    value::{FieldValue, MappedObject},
};
use crate::{document::RawDocument, error::CoercionError};

/// Maps a document with `schema`.
///
/// `doc` is the content of the document's root: for XML the children of the root element,
/// for JSON the top-level object.
///
/// # Errors
///
/// Returns [`CoercionError`] for the first strict field whose value cannot be coerced, or when
/// a node declared as an object is a scalar.
///
/// # Examples
///
/// ```
/// use bol_api::{document::RawDocument, mapping::map_document, schemas::plaza};
///
/// let doc = RawDocument::parse_xml(
///     b"<Payments><Payment><PaymentAmount>425.77</PaymentAmount></Payment></Payments>",
/// )
/// .unwrap();
/// let payments = map_document(&plaza::PAYMENTS, &doc).unwrap();
///
/// let payment = payments.objects("Payment").next().unwrap();
/// assert_eq!(payment.decimal("PaymentAmount").map(|d| d.to_string()).as_deref(), Some("425.77"));
/// ```
pub fn map_document(schema: &'static Schema, doc: &RawDocument) -> Result<MappedObject, CoercionError> {
    let object = map_object(schema, doc, schema.entity)?;
    debug!(
        entity = schema.entity,
        fields = object.len(),
        missing = object.missing_fields().len(),
        "mapped document"
    );
    Ok(object)
}

fn map_object(
    schema: &'static Schema,
    node: &RawDocument,
    path: &str,
) -> Result<MappedObject, CoercionError> {
    let map = match node {
        RawDocument::Map(map) => Some(map),
        RawDocument::Null => None,
        other => return Err(CoercionError::new(path, other.describe(), ValueKind::Object)),
    };

    let mut object = MappedObject::new(schema.entity);

    for field in schema.fields {
        let field_path = format!("{path}.{}", field.name);
        let raw = map.and_then(|m| m.get(field.key())).filter(|value| !value.is_null());

        if let FieldKind::List { item, wrapper } = field.kind {
            if raw.is_none() && field.required {
                object.record_missing(field_path.clone());
            }
            let items = map_list(field, item, wrapper, raw, &field_path)?;
            object.insert(field.name, FieldValue::List(items));
            continue;
        }

        let Some(raw) = raw else {
            if field.required {
                trace!(path = %field_path, "required field absent");
                object.record_missing(field_path);
            }
            continue;
        };

        let value = match field.kind {
            FieldKind::Scalar(coercion) => map_scalar(field, coercion, raw, &field_path)?,
            FieldKind::Object(nested) => match map_object(nested, raw, &field_path) {
                Ok(nested) => FieldValue::Object(nested),
                Err(_) if field.policy == CoercionPolicy::BestEffort => {
                    FieldValue::Raw(raw.clone())
                }
                Err(err) => return Err(err),
            },
            FieldKind::List { .. } => continue,
        };
        object.insert(field.name, value);
    }

    Ok(object)
}

fn map_scalar(
    field: &FieldDescriptor,
    coercion: Coercion,
    raw: &RawDocument,
    path: &str,
) -> Result<FieldValue, CoercionError> {
    match coerce(raw, coercion, path) {
        Ok(value) => Ok(value),
        Err(err) if field.policy == CoercionPolicy::BestEffort => {
            trace!(path, expected = %err.expected, "keeping raw value");
            Ok(match raw.as_str() {
                Some(text) => FieldValue::Text(text.to_owned()),
                None => FieldValue::Raw(raw.clone()),
            })
        }
        Err(err) => Err(err),
    }
}

/// Normalizes a list source into its elements.
///
/// Handles the wrapper element (`<OrderItems><OrderItem/>...</OrderItems>`) and XML
/// single-element collapse, where one repetition arrives as a bare node.
fn list_elements<'a>(raw: Option<&'a RawDocument>, wrapper: Option<&str>) -> Vec<&'a RawDocument> {
    let inner = match (raw, wrapper) {
        (Some(RawDocument::Map(map)), Some(element)) => map.get(element),
        (other, _) => other,
    };

    match inner {
        None | Some(RawDocument::Null) => Vec::new(),
        Some(RawDocument::List(items)) => items.iter().collect(),
        Some(single) => vec![single],
    }
}

fn map_list(
    field: &FieldDescriptor,
    item: ListItem,
    wrapper: Option<&'static str>,
    raw: Option<&RawDocument>,
    path: &str,
) -> Result<Vec<FieldValue>, CoercionError> {
    let elements = list_elements(raw, wrapper);
    let mut items = Vec::with_capacity(elements.len());

    for (index, element) in elements.into_iter().enumerate() {
        let item_path = format!("{path}[{index}]");
        match item {
            ListItem::Object(schema) => match map_object(schema, element, &item_path) {
                Ok(object) => items.push(FieldValue::Object(object)),
                Err(_) if field.policy == CoercionPolicy::BestEffort => {
                    items.push(FieldValue::Raw(element.clone()));
                }
                Err(err) => return Err(err),
            },
            ListItem::Scalar(coercion) => {
                if element.is_null() {
                    continue;
                }
                items.push(map_scalar(field, coercion, element, &item_path)?);
            }
        }
    }

    Ok(items)
}

/// Reverses a mapping, producing a JSON-shaped document.
///
/// Scalars are written back in their wire form: integers and decimals as numbers, timestamps
/// as text in the form they were parsed from, enum values as their code. Empty lists are
/// omitted, matching the mapper's treatment of absent lists. Attributes the schema does not
/// declare are dropped.
///
/// For a document that uses only the schema's keys and its canonical scalar forms,
/// `unmap(schema, &map_document(schema, doc)?)` equals `doc`.
#[must_use]
pub fn unmap(schema: &'static Schema, object: &MappedObject) -> RawDocument {
    let mut map = std::collections::BTreeMap::new();

    for field in schema.fields {
        let Some(value) = object.get(field.name) else {
            continue;
        };

        let raw = match (field.kind, value) {
            (FieldKind::Object(nested), FieldValue::Object(inner)) => unmap(nested, inner),
            (FieldKind::List { item, wrapper }, FieldValue::List(items)) => {
                if items.is_empty() {
                    continue;
                }
                let list = RawDocument::List(items.iter().map(|v| unmap_item(item, v)).collect());
                match wrapper {
                    Some(element) => RawDocument::Map([(element.to_owned(), list)].into()),
                    None => list,
                }
            }
            (_, value) => unmap_scalar(value),
        };
        map.insert(field.key().to_owned(), raw);
    }

    RawDocument::Map(map)
}

fn unmap_item(item: ListItem, value: &FieldValue) -> RawDocument {
    match (item, value) {
        (ListItem::Object(schema), FieldValue::Object(object)) => unmap(schema, object),
        (_, value) => unmap_scalar(value),
    }
}

fn unmap_scalar(value: &FieldValue) -> RawDocument {
    match value {
        FieldValue::Integer(v) => RawDocument::Number(v.to_string()),
        FieldValue::Decimal(v) => RawDocument::Number(v.to_string()),
        FieldValue::Boolean(v) => RawDocument::Bool(*v),
        FieldValue::Raw(raw) => raw.clone(),
        FieldValue::List(items) => RawDocument::List(items.iter().map(unmap_scalar).collect()),
        FieldValue::Object(object) => RawDocument::Map(
            object.fields().map(|(name, value)| (name.to_owned(), unmap_scalar(value))).collect(),
        ),
        other => other.to_wire_text().map_or(RawDocument::Null, RawDocument::Text),
    }
}
