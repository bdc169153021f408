//! Scalar coercions.
//!
//! Each [`Coercion`] turns one raw scalar into a typed [`FieldValue`] or fails with a
//! [`CoercionError`] that names the field path. Parsing is tolerant of the formats both API
//! generations emit, but never lossy: decimals are parsed from their literal digits and
//! timestamps keep the offset they were written with.

use std::{fmt, str::FromStr};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use super::value::{FieldValue, Timestamp};
use crate::{document::RawDocument, error::CoercionError};

/// Code table for [`Coercion::Enum`]: `(code, label)` pairs.
pub type CodeTable = &'static [(&'static str, &'static str)];

/// How a raw scalar becomes a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Text kept verbatim. Identifiers use this even when they look numeric.
    Text,
    /// Signed 64-bit integer. Leading zeros are accepted (`"02"` is 2).
    Integer,
    /// Exact decimal.
    Decimal,
    /// `true`/`false` in any case, `1`/`0`, or a native JSON boolean.
    Boolean,
    /// Calendar date. A trailing offset is accepted and dropped.
    Date,
    /// Timestamp, zoned or naive. See [`parse_datetime`].
    DateTime,
    /// Code looked up in a fixed table, e.g. salutation `"02"` to `FEMALE`.
    Enum(CodeTable),
    /// The raw subtree, untouched.
    Verbatim,
}

impl Coercion {
    /// Kind of value this coercion produces.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Text => ValueKind::Text,
            Self::Integer => ValueKind::Integer,
            Self::Decimal => ValueKind::Decimal,
            Self::Boolean => ValueKind::Boolean,
            Self::Date => ValueKind::Date,
            Self::DateTime => ValueKind::DateTime,
            Self::Enum(_) => ValueKind::Enum,
            Self::Verbatim => ValueKind::Raw,
        }
    }
}

/// Kind of a mapped value, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Text.
    Text,
    /// Integer.
    Integer,
    /// Decimal.
    Decimal,
    /// Boolean.
    Boolean,
    /// Date.
    Date,
    /// Date and time.
    DateTime,
    /// Enumerated code.
    Enum,
    /// Nested object.
    Object,
    /// Sequence.
    List,
    /// Untyped subtree.
    Raw,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Enum => "enumerated code",
            Self::Object => "object",
            Self::List => "list",
            Self::Raw => "raw value",
        })
    }
}

/// Applies `coercion` to a raw node.
///
/// `path` is only used for error reporting.
///
/// # Errors
///
/// Returns [`CoercionError`] when the node is not a scalar (for any coercion other than
/// [`Coercion::Verbatim`]) or when its text does not parse as the requested kind.
///
/// # Examples
///
/// ```
/// use bol_api::{
///     document::RawDocument,
///     mapping::{Coercion, FieldValue, coerce::coerce},
/// };
/// use rust_decimal::Decimal;
///
/// let raw = RawDocument::Text("425.77".to_owned());
/// let value = coerce(&raw, Coercion::Decimal, "Payment.PaymentAmount").unwrap();
/// assert_eq!(value, FieldValue::Decimal(Decimal::new(42577, 2)));
/// ```
pub fn coerce(raw: &RawDocument, coercion: Coercion, path: &str) -> Result<FieldValue, CoercionError> {
    if coercion == Coercion::Verbatim {
        return Ok(FieldValue::Raw(raw.clone()));
    }

    let fail = || CoercionError::new(path, raw.describe(), coercion.kind());

    if let RawDocument::Bool(value) = raw {
        return match coercion {
            Coercion::Boolean => Ok(FieldValue::Boolean(*value)),
            Coercion::Text => Ok(FieldValue::Text(value.to_string())),
            _ => Err(fail()),
        };
    }

    let text = raw.as_str().ok_or_else(fail)?;

    match coercion {
        Coercion::Text => Ok(FieldValue::Text(text.to_owned())),
        Coercion::Integer => parse_integer(text).map(FieldValue::Integer).ok_or_else(fail),
        Coercion::Decimal => parse_decimal(text).map(FieldValue::Decimal).ok_or_else(fail),
        Coercion::Boolean => parse_boolean(text).map(FieldValue::Boolean).ok_or_else(fail),
        Coercion::Date => parse_date(text).map(FieldValue::Date).ok_or_else(fail),
        Coercion::DateTime => parse_datetime(text).map(FieldValue::DateTime).ok_or_else(fail),
        Coercion::Enum(table) => lookup_code(table, text)
            .map(|(code, label)| FieldValue::Enum { code: code.to_owned(), label })
            .ok_or_else(fail),
        Coercion::Verbatim => Ok(FieldValue::Raw(raw.clone())),
    }
}

/// Parses a decimal from its literal text. Scientific notation is accepted.
#[must_use]
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text)).ok()
}

/// Parses a signed integer, accepting surrounding whitespace and leading zeros.
#[must_use]
pub fn parse_integer(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

/// Parses `true`/`false` (any case) and `1`/`0`.
#[must_use]
pub fn parse_boolean(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") || text == "1" {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") || text == "0" {
        Some(false)
    } else {
        None
    }
}

/// Splits `YYYY-MM-DD` off the front of `text`, returning the date and the remainder.
fn split_date(text: &str) -> Option<(NaiveDate, &str)> {
    if text.len() < 10 || !text.is_char_boundary(10) {
        return None;
    }
    let (date, rest) = text.split_at(10);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok().map(|date| (date, rest))
}

/// Parses `Z`, `+HH:MM`, `-HH:MM` or `+HHMM`.
fn parse_offset(text: &str) -> Option<FixedOffset> {
    if text == "Z" || text == "z" {
        return FixedOffset::east_opt(0);
    }
    let (sign, digits) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => return None,
    };
    let digits: String = digits.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Parses a calendar date: `2017-02-10`, optionally followed by `Z` or an offset, which is
/// dropped.
#[must_use]
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let (date, rest) = split_date(text.trim())?;
    (rest.is_empty() || parse_offset(rest).is_some()).then_some(date)
}

/// Parses a timestamp.
///
/// Accepted forms, tried in order:
///
/// | Input | Result |
/// |-------|--------|
/// | `2016-09-19T18:21:59.324+02:00` | [`Timestamp::Zoned`], offset kept |
/// | `2016-09-19T18:21:59+0200` | [`Timestamp::Zoned`] |
/// | `2016-09-19+02:00` | [`Timestamp::Zoned`] at midnight |
/// | `2015-09-23T12:30:36` | [`Timestamp::Naive`] |
/// | `2017-02-10` | [`Timestamp::Date`] |
#[must_use]
pub fn parse_datetime(text: &str) -> Option<Timestamp> {
    let text = text.trim();

    if let Ok(zoned) = DateTime::parse_from_rfc3339(text) {
        return Some(Timestamp::Zoned(zoned));
    }
    if let Ok(zoned) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(Timestamp::Zoned(zoned));
    }
    if let Some((date, rest)) = split_date(text) {
        if rest.is_empty() {
            return Some(Timestamp::Date(date));
        }
        if let Some(offset) = parse_offset(rest) {
            return date
                .and_hms_opt(0, 0, 0)
                .and_then(|midnight| midnight.and_local_timezone(offset).single())
                .map(Timestamp::Zoned);
        }
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(Timestamp::Naive)
}

/// Finds `code` in `table`.
#[must_use]
pub fn lookup_code(table: CodeTable, code: &str) -> Option<(&'static str, &'static str)> {
    let code = code.trim();
    table.iter().copied().find(|(candidate, _)| *candidate == code)
}
