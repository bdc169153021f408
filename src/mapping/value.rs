//! Typed values produced by the mapper.

use std::{collections::BTreeMap, fmt, ops::Index};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use super::coerce::ValueKind;
use crate::{
    document::RawDocument,
    error::{ApiError, Result},
};

/// A point in time as the marketplace wrote it.
///
/// Zoned timestamps compare equal only when both the instant and the offset match, so
/// `18:21:59+02:00` and `16:21:59Z` are different values. Use [`Timestamp::to_utc`] to
/// compare instants.
#[derive(Debug, Clone, Copy)]
pub enum Timestamp {
    /// Timestamp with an explicit UTC offset.
    Zoned(DateTime<FixedOffset>),
    /// Legacy timestamp without timezone information.
    Naive(NaiveDateTime),
    /// Date without a time component.
    Date(NaiveDate),
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Zoned(a), Self::Zoned(b)) => a == b && a.offset() == b.offset(),
            (Self::Naive(a), Self::Naive(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Timestamp {}

impl Timestamp {
    /// UTC offset, if the source carried one.
    #[must_use]
    pub fn offset(&self) -> Option<FixedOffset> {
        match self {
            Self::Zoned(zoned) => Some(*zoned.offset()),
            Self::Naive(_) | Self::Date(_) => None,
        }
    }

    /// The instant in UTC. `None` for naive values, whose instant is unknown.
    #[must_use]
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Zoned(zoned) => Some(zoned.to_utc()),
            Self::Naive(_) | Self::Date(_) => None,
        }
    }

    /// Wall-clock date and time; midnight for date-only values.
    #[must_use]
    pub fn naive_local(&self) -> NaiveDateTime {
        match self {
            Self::Zoned(zoned) => zoned.naive_local(),
            Self::Naive(naive) => *naive,
            Self::Date(date) => date.and_time(chrono::NaiveTime::MIN),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zoned(zoned) => f.write_str(&zoned.to_rfc3339()),
            Self::Naive(naive) => write!(f, "{}", naive.format("%Y-%m-%dT%H:%M:%S%.f")),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Zoned(value)
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self::Naive(value)
    }
}

/// One mapped attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Text, including identifiers that look numeric.
    Text(String),
    /// Integer.
    Integer(i64),
    /// Exact decimal.
    Decimal(Decimal),
    /// Boolean.
    Boolean(bool),
    /// Calendar date.
    Date(NaiveDate),
    /// Timestamp.
    DateTime(Timestamp),
    /// Code from an enumeration table with its label.
    Enum {
        /// Code as it appeared in the document.
        code: String,
        /// Label from the code table.
        label: &'static str,
    },
    /// Nested object.
    Object(MappedObject),
    /// Sequence of values.
    List(Vec<FieldValue>),
    /// Subtree passed through untouched.
    Raw(RawDocument),
}

impl FieldValue {
    /// Kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::Text,
            Self::Integer(_) => ValueKind::Integer,
            Self::Decimal(_) => ValueKind::Decimal,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Date(_) => ValueKind::Date,
            Self::DateTime(_) => ValueKind::DateTime,
            Self::Enum { .. } => ValueKind::Enum,
            Self::Object(_) => ValueKind::Object,
            Self::List(_) => ValueKind::List,
            Self::Raw(_) => ValueKind::Raw,
        }
    }

    /// Text content of a `Text` value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Integer content.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Decimal content.
    #[must_use]
    pub const fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(value) => Some(*value),
            _ => None,
        }
    }

    /// Boolean content.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Date content.
    #[must_use]
    pub const fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(value) => Some(*value),
            _ => None,
        }
    }

    /// Timestamp content.
    #[must_use]
    pub const fn as_datetime(&self) -> Option<&Timestamp> {
        match self {
            Self::DateTime(value) => Some(value),
            _ => None,
        }
    }

    /// Nested object.
    #[must_use]
    pub const fn as_object(&self) -> Option<&MappedObject> {
        match self {
            Self::Object(value) => Some(value),
            _ => None,
        }
    }

    /// Sequence content.
    #[must_use]
    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Renders a scalar the way it is written on the wire.
    ///
    /// Returns `None` for objects, lists and raw containers.
    #[must_use]
    pub fn to_wire_text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Integer(value) => Some(value.to_string()),
            Self::Decimal(value) => Some(value.to_string()),
            Self::Boolean(value) => Some(value.to_string()),
            Self::Date(date) => Some(date.format("%Y-%m-%d").to_string()),
            Self::DateTime(timestamp) => Some(timestamp.to_string()),
            Self::Enum { code, .. } => Some(code.clone()),
            Self::Raw(raw) => match raw {
                RawDocument::Text(text) | RawDocument::Number(text) => Some(text.clone()),
                RawDocument::Bool(value) => Some(value.to_string()),
                RawDocument::Null | RawDocument::List(_) | RawDocument::Map(_) => None,
            },
            Self::Object(_) | Self::List(_) => None,
        }
    }
}

impl PartialEq<str> for FieldValue {
    fn eq(&self, other: &str) -> bool {
        self.as_text() == Some(other)
    }
}

impl PartialEq<&str> for FieldValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_text() == Some(*other)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(Timestamp::Naive(value))
    }
}

impl From<DateTime<FixedOffset>> for FieldValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::DateTime(Timestamp::Zoned(value))
    }
}

impl From<Timestamp> for FieldValue {
    fn from(value: Timestamp) -> Self {
        Self::DateTime(value)
    }
}

/// A required field that was absent from the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingField {
    /// Full path of the field, e.g. `Orders.Order[0].OrderId`.
    pub path: String,
}

/// An object built by the mapper from one schema.
///
/// Attributes are addressed by their target name. Names that are not Rust identifiers, such as
/// `NCK-Stock`, work the same way:
///
/// ```
/// use bol_api::{document::RawDocument, mapping::map_document, schemas::plaza};
///
/// let doc = RawDocument::parse_xml(
///     b"<InventoryResponse><TotalCount>1</TotalCount><Offers><Offer>\
///       <EAN>9789076174143</EAN><NCK-Stock>1</NCK-Stock></Offer></Offers></InventoryResponse>",
/// )
/// .unwrap();
/// let inventory = map_document(&plaza::INVENTORY, &doc).unwrap();
///
/// let offer = inventory.objects("Offers").next().unwrap();
/// assert_eq!(offer["NCK-Stock"], "1");
/// assert_eq!(inventory.path("Offers[0].EAN").and_then(|v| v.as_text()), Some("9789076174143"));
/// ```
///
/// Absent optional fields are not stored at all; they read as `None`, never as a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedObject {
    entity: &'static str,
    fields: BTreeMap<&'static str, FieldValue>,
    missing: Vec<MissingField>,
}

impl MappedObject {
    /// Creates an empty object for `entity`.
    #[must_use]
    pub const fn new(entity: &'static str) -> Self {
        Self { entity, fields: BTreeMap::new(), missing: Vec::new() }
    }

    pub(crate) fn insert(&mut self, name: &'static str, value: FieldValue) {
        self.fields.insert(name, value);
    }

    pub(crate) fn record_missing(&mut self, path: String) {
        self.missing.push(MissingField { path });
    }

    /// Entity name of the schema this object was mapped with.
    #[must_use]
    pub const fn entity(&self) -> &'static str {
        self.entity
    }

    /// Number of present attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when no attribute is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Present attributes in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    /// Returns `true` when `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Looks up an attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Text attribute.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    /// Integer attribute.
    #[must_use]
    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_integer)
    }

    /// Decimal attribute.
    #[must_use]
    pub fn decimal(&self, name: &str) -> Option<Decimal> {
        self.get(name).and_then(FieldValue::as_decimal)
    }

    /// Boolean attribute.
    #[must_use]
    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FieldValue::as_bool)
    }

    /// Date attribute.
    #[must_use]
    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        self.get(name).and_then(FieldValue::as_date)
    }

    /// Timestamp attribute.
    #[must_use]
    pub fn datetime(&self, name: &str) -> Option<&Timestamp> {
        self.get(name).and_then(FieldValue::as_datetime)
    }

    /// Nested object attribute.
    #[must_use]
    pub fn object(&self, name: &str) -> Option<&MappedObject> {
        self.get(name).and_then(FieldValue::as_object)
    }

    /// List attribute; empty when absent.
    #[must_use]
    pub fn list(&self, name: &str) -> &[FieldValue] {
        self.get(name).and_then(FieldValue::as_list).unwrap_or_default()
    }

    /// Objects of a list attribute.
    pub fn objects(&self, name: &str) -> impl Iterator<Item = &MappedObject> {
        self.list(name).iter().filter_map(FieldValue::as_object)
    }

    /// Removes a list attribute and returns its objects.
    pub fn take_objects(&mut self, name: &str) -> Vec<MappedObject> {
        match self.fields.remove(name) {
            Some(FieldValue::List(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    FieldValue::Object(object) => Some(object),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Resolves a dotted path such as `CustomerDetails.BillingDetails.Surname` or
    /// `OrderItems[0].Quantity`.
    #[must_use]
    pub fn path(&self, path: &str) -> Option<&FieldValue> {
        let mut object = self;
        let mut segments = path.split('.').peekable();

        while let Some(segment) = segments.next() {
            let (name, indices) = split_indices(segment)?;
            let mut value = object.get(name)?;
            for index in indices {
                value = value.as_list()?.get(index)?;
            }
            if segments.peek().is_none() {
                return Some(value);
            }
            object = value.as_object()?;
        }

        None
    }

    /// Required fields that were absent anywhere in this object's subtree.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&MissingField> {
        let mut found: Vec<&MissingField> = self.missing.iter().collect();
        for value in self.fields.values() {
            collect_missing(value, &mut found);
        }
        found
    }

    /// Fails when any required field was absent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingRequiredField`] listing every absent path.
    pub fn require_complete(&self) -> Result<&Self> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            return Ok(self);
        }
        Err(ApiError::MissingRequiredField {
            entity: self.entity.to_owned(),
            paths: missing.into_iter().map(|m| m.path.clone()).collect(),
        })
    }
}

fn collect_missing<'a>(value: &'a FieldValue, found: &mut Vec<&'a MissingField>) {
    match value {
        FieldValue::Object(object) => found.extend(object.missing_fields()),
        FieldValue::List(items) => {
            for item in items {
                collect_missing(item, found);
            }
        }
        _ => {}
    }
}

/// Splits `Name[0][1]` into `("Name", [0, 1])`.
fn split_indices(segment: &str) -> Option<(&str, Vec<usize>)> {
    let Some(open) = segment.find('[') else {
        return Some((segment, Vec::new()));
    };
    let (name, mut rest) = segment.split_at(open);
    let mut indices = Vec::new();
    while !rest.is_empty() {
        let close = rest.find(']')?;
        indices.push(rest.get(1..close)?.parse().ok()?);
        rest = &rest[close + 1..];
        if !rest.is_empty() && !rest.starts_with('[') {
            return None;
        }
    }
    Some((name, indices))
}

impl Index<&str> for MappedObject {
    type Output = FieldValue;

    /// # Panics
    ///
    /// Panics when the attribute is absent. Use [`MappedObject::get`] for optional fields.
    fn index(&self, name: &str) -> &FieldValue {
        match self.fields.get(name) {
            Some(value) => value,
            None => panic!("{} has no attribute `{name}`", self.entity),
        }
    }
}

/// Conversion from a mapped object into a hand-written record type.
pub trait FromMapped: Sized {
    /// Builds the record.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingRequiredField`] when an attribute the record cannot do
    /// without is absent.
    fn from_mapped(object: &MappedObject) -> Result<Self>;
}

impl MappedObject {
    /// Converts into a typed record.
    ///
    /// # Errors
    ///
    /// Propagates the error from [`FromMapped::from_mapped`].
    pub fn to_record<T: FromMapped>(&self) -> Result<T> {
        T::from_mapped(self)
    }

    /// Scalar attribute rendered as text, for records that accept either textual or numeric
    /// identifiers.
    #[must_use]
    pub fn text_lossy(&self, name: &str) -> Option<String> {
        self.get(name).and_then(FieldValue::to_wire_text)
    }

    /// Like [`MappedObject::text_lossy`], failing when absent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingRequiredField`] naming `name`.
    pub fn require_text(&self, name: &str) -> Result<String> {
        self.text_lossy(name).ok_or_else(|| self.missing_error(name))
    }

    /// Integer attribute, failing when absent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingRequiredField`] naming `name`.
    pub fn require_integer(&self, name: &str) -> Result<i64> {
        self.integer(name).ok_or_else(|| self.missing_error(name))
    }

    fn missing_error(&self, name: &str) -> ApiError {
        ApiError::MissingRequiredField {
            entity: self.entity.to_owned(),
            paths: vec![format!("{}.{name}", self.entity)],
        }
    }
}
