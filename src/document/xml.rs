//! Plaza XML to [`RawDocument`].

use std::collections::BTreeMap;

use quick_xml::{
    Reader,
    escape::resolve_xml_entity,
    events::{BytesStart, Event},
};
use tracing::trace;

use super::{RawDocument, TEXT_KEY};
use crate::error::{ApiError, DocumentFormat, Result};

/// An element whose end tag has not been seen yet.
#[derive(Debug, Default)]
struct OpenElement {
    name: String,
    children: BTreeMap<String, RawDocument>,
    text: String,
}

impl OpenElement {
    fn into_value(self) -> (String, RawDocument) {
        let text = self.text.trim();
        let value = match (self.children.is_empty(), text.is_empty()) {
            (true, true) => RawDocument::Null,
            (true, false) => RawDocument::Text(text.to_owned()),
            // Whitespace between child elements is formatting.
            (false, true) => RawDocument::Map(self.children),
            (false, false) => {
                let mut children = self.children;
                children.insert(TEXT_KEY.to_owned(), RawDocument::Text(text.to_owned()));
                RawDocument::Map(children)
            }
        };
        (self.name, value)
    }
}

fn malformed(message: impl Into<String>) -> ApiError {
    ApiError::Document { format: DocumentFormat::Xml, message: message.into() }
}

/// Inserts a child, turning repeated names into a list.
///
/// Element values are never lists themselves, so an existing `List` always means the name
/// has already repeated.
fn insert_child(children: &mut BTreeMap<String, RawDocument>, name: String, value: RawDocument) {
    match children.get_mut(&name) {
        None => {
            children.insert(name, value);
        }
        Some(RawDocument::List(items)) => items.push(value),
        Some(existing) => {
            let first = std::mem::take(existing);
            *existing = RawDocument::List(vec![first, value]);
        }
    }
}

fn local_name(start: &BytesStart<'_>) -> Result<String> {
    let name = start.local_name();
    std::str::from_utf8(name.as_ref())
        .map(str::to_owned)
        .map_err(|e| malformed(format!("element name is not UTF-8: {e}")))
}

fn open_element(start: &BytesStart<'_>) -> Result<OpenElement> {
    let mut element = OpenElement { name: local_name(start)?, ..OpenElement::default() };

    for attr in start.attributes() {
        let attr = attr.map_err(|e| malformed(e.to_string()))?;
        let key = attr.key;
        if key.as_ref() == b"xmlns" || key.prefix().is_some_and(|p| p.as_ref() == b"xmlns") {
            continue;
        }
        let local = key.local_name();
        let name = std::str::from_utf8(local.as_ref())
            .map_err(|e| malformed(format!("attribute name is not UTF-8: {e}")))?
            .to_owned();
        let value = attr.unescape_value().map_err(|e| malformed(e.to_string()))?;
        insert_child(&mut element.children, name, RawDocument::Text(value.into_owned()));
    }

    Ok(element)
}

fn resolve_entity(raw: &str) -> Result<String> {
    if let Some(resolved) = resolve_xml_entity(raw) {
        return Ok(resolved.to_owned());
    }

    if let Some(rest) = raw.strip_prefix('#') {
        let code = if let Some(hex) = rest.strip_prefix('x').or_else(|| rest.strip_prefix('X')) {
            u32::from_str_radix(hex, 16)
        } else {
            rest.parse::<u32>()
        }
        .map_err(|_| malformed(format!("invalid character reference &{raw};")))?;

        return char::from_u32(code)
            .map(String::from)
            .ok_or_else(|| malformed(format!("invalid character reference &{raw};")));
    }

    Err(malformed(format!("unknown entity &{raw};")))
}

impl RawDocument {
    /// Parses an XML document and returns the content of its root element.
    ///
    /// Namespace prefixes are dropped, so `<bns:OrderId>` and `<OrderId>` produce the same key.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Document`] when the input is not well-formed XML or contains no root
    /// element.
    ///
    /// # Examples
    ///
    /// ```
    /// use bol_api::document::RawDocument;
    ///
    /// let doc = RawDocument::parse_xml(
    ///     br#"<bns:Orders xmlns:bns="urn:x"><bns:Order><bns:OrderId>123</bns:OrderId></bns:Order></bns:Orders>"#,
    /// )
    /// .unwrap();
    ///
    /// let order_id = doc.get("Order").and_then(|o| o.get("OrderId"));
    /// assert_eq!(order_id.and_then(RawDocument::as_str), Some("123"));
    /// ```
    pub fn parse_xml(input: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(input);
        let mut buf = Vec::new();
        let mut stack: Vec<OpenElement> = Vec::new();

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| malformed(format!("at byte {}: {e}", reader.buffer_position())))?;

            match &event {
                Event::Start(start) => stack.push(open_element(start)?),
                Event::Empty(start) => {
                    let element = open_element(start)?;
                    let (name, value) = if element.children.is_empty() {
                        (element.name, Self::Null)
                    } else {
                        (element.name, Self::Map(element.children))
                    };
                    match stack.last_mut() {
                        Some(parent) => insert_child(&mut parent.children, name, value),
                        None => return Ok(value),
                    }
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| malformed("unbalanced end tag"))?;
                    let (name, value) = element.into_value();
                    match stack.last_mut() {
                        Some(parent) => insert_child(&mut parent.children, name, value),
                        None => {
                            trace!(root = %name, "parsed XML document");
                            return Ok(value);
                        }
                    }
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        let decoded = text.decode().map_err(|e| malformed(e.to_string()))?;
                        current.text.push_str(&decoded);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        let decoded = std::str::from_utf8(data.as_ref())
                            .map_err(|e| malformed(format!("CDATA is not UTF-8: {e}")))?;
                        current.text.push_str(decoded);
                    }
                }
                Event::GeneralRef(reference) => {
                    if let Some(current) = stack.last_mut() {
                        let raw = reference.decode().map_err(|e| malformed(e.to_string()))?;
                        current.text.push_str(&resolve_entity(&raw)?);
                    }
                }
                Event::Eof => {
                    return Err(malformed(if stack.is_empty() {
                        "document has no root element"
                    } else {
                        "unexpected end of document"
                    }));
                }
                Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => {}
            }

            drop(event);
            buf.clear();
        }
    }
}
