//! Request bodies built from recognized options.
//!
//! A [`RequestSchema`] lists the options one endpoint accepts and where each one lands in the
//! body. Callers fill a [`Payload`]; the schema validates it and renders JSON for the
//! Retailer API or XML for the Plaza API. Absent optional options are left out of the body
//! entirely, and groups with no present children are dropped with them.

use std::collections::BTreeMap;

use quick_xml::escape::escape;
use serde_json::{Map, Value};

use super::{
    coerce::{self, Coercion},
    value::{FieldValue, Timestamp},
};
use crate::{
    document::RawDocument,
    error::{ApiError, Result},
};

const XML_INDENT: &str = "    ";

/// One entry of a request body.
#[derive(Debug, Clone, Copy)]
pub enum RequestField {
    /// Value taken from the payload option `option`.
    Value {
        /// Payload key.
        option: &'static str,
        /// Element or property name on the wire.
        wire: &'static str,
        /// Type the option is normalized to.
        coercion: Coercion,
        /// Whether the option must be present.
        required: bool,
    },
    /// Nested element or object.
    Group {
        /// Element or property name on the wire.
        wire: &'static str,
        /// Children.
        fields: &'static [RequestField],
        /// Emitted as a one-element JSON array.
        repeated: bool,
    },
    /// Constant value.
    Fixed {
        /// Element or property name on the wire.
        wire: &'static str,
        /// Value as text.
        value: &'static str,
        /// Type the value is rendered as.
        coercion: Coercion,
    },
}

impl RequestField {
    /// Optional value.
    #[must_use]
    pub const fn value(option: &'static str, wire: &'static str, coercion: Coercion) -> Self {
        Self::Value { option, wire, coercion, required: false }
    }

    /// Nested group.
    #[must_use]
    pub const fn group(wire: &'static str, fields: &'static [Self]) -> Self {
        Self::Group { wire, fields, repeated: false }
    }

    /// Constant, rendered as `coercion` dictates (`1` stays a JSON number under
    /// [`Coercion::Integer`]).
    #[must_use]
    pub const fn fixed(wire: &'static str, value: &'static str, coercion: Coercion) -> Self {
        Self::Fixed { wire, value, coercion }
    }

    /// Marks a value as required. No effect on other entries.
    #[must_use]
    pub const fn required(self) -> Self {
        match self {
            Self::Value { option, wire, coercion, .. } => {
                Self::Value { option, wire, coercion, required: true }
            }
            other => other,
        }
    }

    /// Marks a group as repeated. No effect on other entries.
    #[must_use]
    pub const fn repeated(self) -> Self {
        match self {
            Self::Group { wire, fields, .. } => Self::Group { wire, fields, repeated: true },
            other => other,
        }
    }
}

/// The options one endpoint accepts.
#[derive(Debug)]
pub struct RequestSchema {
    /// Root element name for XML bodies.
    pub root: &'static str,
    /// Default namespace declared on the XML root.
    pub namespace: Option<&'static str>,
    /// Entries in body order.
    pub fields: &'static [RequestField],
}

/// Option values for one request.
///
/// ```
/// use bol_api::mapping::Payload;
///
/// let payload = Payload::new()
///     .set("order_item_id", "123")
///     .set_opt("expected_delivery_date", None::<String>);
///
/// assert!(payload.contains("order_item_id"));
/// assert!(!payload.contains("expected_delivery_date"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    values: BTreeMap<String, FieldValue>,
}

impl Payload {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an option.
    #[must_use]
    pub fn set(mut self, option: &str, value: impl Into<FieldValue>) -> Self {
        self.values.insert(option.to_owned(), value.into());
        self
    }

    /// Sets an option when `value` is `Some`; leaves it absent otherwise.
    #[must_use]
    pub fn set_opt<V: Into<FieldValue>>(self, option: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(option, value),
            None => self,
        }
    }

    /// Returns `true` when `option` is set.
    #[must_use]
    pub fn contains(&self, option: &str) -> bool {
        self.values.contains_key(option)
    }

    fn get(&self, option: &str) -> Option<&FieldValue> {
        self.values.get(option)
    }
}

/// A body entry after validation.
enum Node {
    Scalar(&'static str, FieldValue),
    Fixed(&'static str, FieldValue),
    Group(&'static str, Vec<Node>, bool),
}

impl RequestSchema {
    /// Creates a request schema.
    #[must_use]
    pub const fn new(
        root: &'static str,
        namespace: Option<&'static str>,
        fields: &'static [RequestField],
    ) -> Self {
        Self { root, namespace, fields }
    }

    fn check_options(&self, payload: &Payload) -> Result<()> {
        fn known(fields: &[RequestField], option: &str) -> bool {
            fields.iter().any(|field| match field {
                RequestField::Value { option: name, .. } => *name == option,
                RequestField::Group { fields, .. } => known(fields, option),
                RequestField::Fixed { .. } => false,
            })
        }

        match payload.values.keys().find(|option| !known(self.fields, option)) {
            Some(option) => Err(ApiError::InvalidInput(format!(
                "unknown option `{option}` for {}",
                self.root
            ))),
            None => Ok(()),
        }
    }

    fn build(&self, fields: &'static [RequestField], payload: &Payload) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        for field in fields {
            match *field {
                RequestField::Value { option, wire, coercion, required } => {
                    match payload.get(option) {
                        Some(value) => {
                            nodes.push(Node::Scalar(wire, normalize(value, coercion, option)?));
                        }
                        None if required => {
                            return Err(ApiError::InvalidInput(format!(
                                "missing required option `{option}` for {}",
                                self.root
                            )));
                        }
                        None => {}
                    }
                }
                RequestField::Group { wire, fields, repeated } => {
                    let children = self.build(fields, payload)?;
                    if has_payload_values(&children) {
                        nodes.push(Node::Group(wire, children, repeated));
                    }
                }
                RequestField::Fixed { wire, value, coercion } => {
                    let value = normalize(&FieldValue::Text(value.to_owned()), coercion, wire)?;
                    nodes.push(Node::Fixed(wire, value));
                }
            }
        }
        Ok(nodes)
    }

    /// Renders a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] for unknown options, missing required options, and
    /// values that do not fit their declared type.
    pub fn to_json(&self, payload: &Payload) -> Result<Value> {
        self.check_options(payload)?;
        let nodes = self.build(self.fields, payload)?;
        Ok(Value::Object(json_object(&nodes)))
    }

    /// Renders an XML body with a declaration, the default namespace on the root element and
    /// four-space indentation.
    ///
    /// # Errors
    ///
    /// Same as [`RequestSchema::to_json`].
    ///
    /// # Examples
    ///
    /// ```
    /// use bol_api::mapping::{Coercion, Payload, RequestField as R, RequestSchema};
    ///
    /// static CHANGE_TRANSPORT: RequestSchema = RequestSchema::new(
    ///     "ChangeTransportRequest",
    ///     Some("https://plazaapi.bol.com/services/xsd/v2/plazaapi.xsd"),
    ///     &[
    ///         R::value("track_and_trace", "TrackAndTrace", Coercion::Text),
    ///         R::value("transporter_code", "TransporterCode", Coercion::Text).required(),
    ///     ],
    /// );
    ///
    /// let body = CHANGE_TRANSPORT
    ///     .to_xml(&Payload::new().set("track_and_trace", "3S123").set("transporter_code", "GLS"))
    ///     .unwrap();
    ///
    /// assert_eq!(
    ///     body,
    ///     "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
    ///      <ChangeTransportRequest xmlns=\"https://plazaapi.bol.com/services/xsd/v2/plazaapi.xsd\">\n\
    ///      \x20   <TrackAndTrace>3S123</TrackAndTrace>\n\
    ///      \x20   <TransporterCode>GLS</TransporterCode>\n\
    ///      </ChangeTransportRequest>\n"
    /// );
    /// ```
    pub fn to_xml(&self, payload: &Payload) -> Result<String> {
        self.check_options(payload)?;
        let nodes = self.build(self.fields, payload)?;

        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push('<');
        out.push_str(self.root);
        if let Some(namespace) = self.namespace {
            out.push_str(" xmlns=\"");
            out.push_str(&escape(namespace));
            out.push('"');
        }
        out.push_str(">\n");
        write_xml_nodes(&mut out, &nodes, 1)?;
        out.push_str("</");
        out.push_str(self.root);
        out.push_str(">\n");
        Ok(out)
    }
}

/// Constants alone do not make a group worth sending.
fn has_payload_values(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| match node {
        Node::Scalar(..) => true,
        Node::Fixed(..) => false,
        Node::Group(_, children, _) => has_payload_values(children),
    })
}

/// Checks `value` against `coercion` and converts textual input into the declared type.
fn normalize(value: &FieldValue, coercion: Coercion, option: &str) -> Result<FieldValue> {
    let invalid = || {
        ApiError::InvalidInput(format!("option `{option}` is not a valid {}", coercion.kind()))
    };
    let text = value.as_text();

    let normalized = match (coercion, value) {
        (Coercion::Verbatim, value) => value.clone(),
        (Coercion::Text, FieldValue::Object(_) | FieldValue::List(_)) => return Err(invalid()),
        (Coercion::Text, value) => FieldValue::Text(value.to_wire_text().ok_or_else(invalid)?),
        (Coercion::Integer, FieldValue::Integer(_))
        | (Coercion::Decimal, FieldValue::Decimal(_))
        | (Coercion::Boolean, FieldValue::Boolean(_))
        | (Coercion::Date, FieldValue::Date(_))
        | (Coercion::DateTime, FieldValue::DateTime(_)) => value.clone(),
        (Coercion::Decimal, FieldValue::Integer(v)) => FieldValue::Decimal((*v).into()),
        (Coercion::DateTime, FieldValue::Date(date)) => FieldValue::DateTime(Timestamp::Date(*date)),
        (Coercion::Integer, _) => {
            FieldValue::Integer(text.and_then(coerce::parse_integer).ok_or_else(invalid)?)
        }
        (Coercion::Decimal, _) => {
            FieldValue::Decimal(text.and_then(coerce::parse_decimal).ok_or_else(invalid)?)
        }
        (Coercion::Boolean, _) => {
            FieldValue::Boolean(text.and_then(coerce::parse_boolean).ok_or_else(invalid)?)
        }
        (Coercion::Date, _) => {
            FieldValue::Date(text.and_then(coerce::parse_date).ok_or_else(invalid)?)
        }
        (Coercion::DateTime, _) => {
            FieldValue::DateTime(text.and_then(coerce::parse_datetime).ok_or_else(invalid)?)
        }
        (Coercion::Enum(table), value) => {
            let code = match value {
                FieldValue::Enum { code, .. } => code.as_str(),
                other => other.as_text().ok_or_else(invalid)?,
            };
            let (code, label) = coerce::lookup_code(table, code).ok_or_else(invalid)?;
            FieldValue::Enum { code: code.to_owned(), label }
        }
    };
    Ok(normalized)
}

fn json_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Integer(v) => Value::from(*v),
        FieldValue::Boolean(v) => Value::Bool(*v),
        FieldValue::Decimal(v) => RawDocument::Number(v.to_string()).to_json(),
        FieldValue::Raw(raw) => raw.to_json(),
        FieldValue::List(items) => Value::Array(items.iter().map(json_value).collect()),
        other => other.to_wire_text().map_or(Value::Null, Value::String),
    }
}

fn json_object(nodes: &[Node]) -> Map<String, Value> {
    let mut object = Map::new();
    for node in nodes {
        match node {
            Node::Scalar(wire, value) | Node::Fixed(wire, value) => {
                object.insert((*wire).to_owned(), json_value(value));
            }
            Node::Group(wire, children, repeated) => {
                let inner = Value::Object(json_object(children));
                let value = if *repeated { Value::Array(vec![inner]) } else { inner };
                object.insert((*wire).to_owned(), value);
            }
        }
    }
    object
}

fn write_xml_nodes(out: &mut String, nodes: &[Node], depth: usize) -> Result<()> {
    for node in nodes {
        let indent = XML_INDENT.repeat(depth);
        match node {
            Node::Scalar(wire, value) | Node::Fixed(wire, value) => {
                let text = value.to_wire_text().ok_or_else(|| {
                    ApiError::InvalidInput(format!("`{wire}` cannot be written as XML text"))
                })?;
                out.push_str(&format!("{indent}<{wire}>{}</{wire}>\n", escape(text.as_str())));
            }
            Node::Group(wire, children, _) => {
                out.push_str(&format!("{indent}<{wire}>\n"));
                write_xml_nodes(out, children, depth + 1)?;
                out.push_str(&format!("{indent}</{wire}>\n"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::mapping::RequestField as R;

    static BUNDLE: [RequestField; 2] = [
        R::fixed("quantity", "1", Coercion::Integer),
        R::value("price", "price", Coercion::Decimal).required(),
    ];

    static OFFER: RequestSchema = RequestSchema::new(
        "Offer",
        None,
        &[
            R::value("ean", "ean", Coercion::Text).required(),
            R::value("on_hold", "onHoldByRetailer", Coercion::Boolean),
            R::group("pricing", &[R::group("bundlePrices", &BUNDLE).repeated()]),
            R::group(
                "stock",
                &[
                    R::value("stock_amount", "amount", Coercion::Integer),
                    R::value("stock_managed", "managedByRetailer", Coercion::Boolean),
                ],
            ),
        ],
    );

    static SHIPMENT: RequestSchema = RequestSchema::new(
        "ShipmentRequest",
        Some("https://plazaapi.bol.com/services/xsd/v2/plazaapi.xsd"),
        &[
            R::value("date_time", "DateTime", Coercion::DateTime).required(),
            R::value("expected_delivery_date", "ExpectedDeliveryDate", Coercion::DateTime),
            R::value("order_item_id", "OrderItemId", Coercion::Text).required(),
            R::value("shipment_reference", "ShipmentReference", Coercion::Text),
            R::group(
                "Transport",
                &[
                    R::value("track_and_trace", "TrackAndTrace", Coercion::Text),
                    R::value("transporter_code", "TransporterCode", Coercion::Text),
                ],
            ),
        ],
    );

    fn shipment_payload() -> Payload {
        let date_time =
            NaiveDate::from_ymd_opt(2016, 10, 1).unwrap().and_hms_opt(1, 8, 17).unwrap();
        Payload::new()
            .set("order_item_id", "123")
            .set("date_time", date_time)
            .set_opt("expected_delivery_date", None::<NaiveDate>)
            .set("shipment_reference", "abc")
            .set("transporter_code", "GLS")
            .set("track_and_trace", "3S123")
    }

    #[test]
    fn test_xml_body_omits_absent_options() {
        let body = SHIPMENT.to_xml(&shipment_payload()).unwrap();
        assert_eq!(
            body,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ShipmentRequest xmlns="https://plazaapi.bol.com/services/xsd/v2/plazaapi.xsd">
    <DateTime>2016-10-01T01:08:17</DateTime>
    <OrderItemId>123</OrderItemId>
    <ShipmentReference>abc</ShipmentReference>
    <Transport>
        <TrackAndTrace>3S123</TrackAndTrace>
        <TransporterCode>GLS</TransporterCode>
    </Transport>
</ShipmentRequest>
"#
        );
        assert!(!body.contains("ExpectedDeliveryDate"));
    }

    #[test]
    fn test_xml_text_is_escaped() {
        let payload = shipment_payload().set("shipment_reference", "a<b & c");
        let body = SHIPMENT.to_xml(&payload).unwrap();
        assert!(body.contains("<ShipmentReference>a&lt;b &amp; c</ShipmentReference>"));
    }

    #[test]
    fn test_empty_group_is_dropped() {
        let payload = Payload::new()
            .set("date_time", "2016-10-01T01:08:17")
            .set("order_item_id", "123");
        let body = SHIPMENT.to_xml(&payload).unwrap();
        assert!(!body.contains("Transport"));
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let err = SHIPMENT.to_xml(&shipment_payload().set("colour", "red")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(ref m) if m.contains("colour")));
    }

    #[test]
    fn test_missing_required_option_is_rejected() {
        let err = SHIPMENT.to_json(&Payload::new().set("order_item_id", "1")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(ref m) if m.contains("date_time")));
    }

    #[test]
    fn test_json_body_with_repeated_group() {
        let payload = Payload::new()
            .set("ean", "0000007740404")
            .set("price", "12.99")
            .set("stock_amount", 5i64)
            .set("stock_managed", false);

        let body = OFFER.to_json(&payload).unwrap();
        assert_eq!(
            body,
            json!({
                "ean": "0000007740404",
                "pricing": {"bundlePrices": [{"quantity": 1, "price": 12.99}]},
                "stock": {"amount": 5, "managedByRetailer": false}
            })
        );
    }

    #[test]
    fn test_required_option_inside_group() {
        let err = OFFER.to_json(&Payload::new().set("ean", "1")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(ref m) if m.contains("price")));
    }

    #[test]
    fn test_fixed_only_group_is_dropped() {
        static LABEL: RequestSchema = RequestSchema::new(
            "Label",
            None,
            &[
                R::value("code", "code", Coercion::Text),
                R::group(
                    "options",
                    &[R::fixed("format", "PDF", Coercion::Text), R::value("size", "size", Coercion::Text)],
                ),
            ],
        );

        let body = LABEL.to_json(&Payload::new().set("code", "X")).unwrap();
        assert_eq!(body, json!({"code": "X"}));

        let body = LABEL.to_json(&Payload::new().set("size", "A6")).unwrap();
        assert_eq!(body, json!({"options": {"format": "PDF", "size": "A6"}}));
    }

    #[test]
    fn test_values_are_normalized() {
        let payload = Payload::new()
            .set("ean", "1")
            .set("price", Decimal::new(1099, 2))
            .set("on_hold", "TRUE");
        let body = OFFER.to_json(&payload).unwrap();
        assert_eq!(body["onHoldByRetailer"], json!(true));

        let err = OFFER.to_json(&payload.set("on_hold", "maybe")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(ref m) if m.contains("on_hold")));
    }
}
