//! Field descriptors and schemas.
//!
//! A [`Schema`] is static data: a list of [`FieldDescriptor`]s built with `const fn` builders
//! and stored in a `static`. Nested schemas are referenced by `&'static Schema`, so the whole
//! registry lives for the process lifetime and is never mutated.
//!
//! ```
//! use bol_api::mapping::{FieldDescriptor as F, Schema};
//!
//! static TRANSPORT: Schema = Schema::new(
//!     "Transport",
//!     &[F::text("TransporterCode"), F::text("TrackAndTrace"), F::integer("ShippingLabelId")],
//! );
//!
//! static SHIPMENT: Schema = Schema::new(
//!     "Shipment",
//!     &[
//!         F::text("ShipmentId").required(),
//!         F::datetime("ShipmentDate"),
//!         F::object("Transport", &TRANSPORT),
//!     ],
//! );
//!
//! assert_eq!(SHIPMENT.fields.len(), 3);
//! ```

use super::coerce::Coercion;

/// What to do when a scalar does not coerce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoercionPolicy {
    /// Fail the mapping with a [`CoercionError`](crate::error::CoercionError).
    #[default]
    Strict,
    /// Keep the raw text instead.
    BestEffort,
}

/// Element type of a list field.
#[derive(Debug, Clone, Copy)]
pub enum ListItem {
    /// Each element is a scalar.
    Scalar(Coercion),
    /// Each element is an object.
    Object(&'static Schema),
}

/// Shape of a field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Single scalar value.
    Scalar(Coercion),
    /// Nested object.
    Object(&'static Schema),
    /// Repeated values.
    List {
        /// Element type.
        item: ListItem,
        /// Element name inside an XML wrapper, e.g. `OrderItem` inside `OrderItems`.
        wrapper: Option<&'static str>,
    },
}

/// Declares how one attribute is derived from the document.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Attribute name on the mapped object.
    pub name: &'static str,
    /// Document key when it differs from `name`.
    pub source_key: Option<&'static str>,
    /// Shape and coercion.
    pub kind: FieldKind,
    /// Whether absence is reported as a diagnostic.
    pub required: bool,
    /// Behavior on coercion failure.
    pub policy: CoercionPolicy,
}

impl FieldDescriptor {
    /// Scalar field with an explicit coercion.
    #[must_use]
    pub const fn scalar(name: &'static str, coercion: Coercion) -> Self {
        Self {
            name,
            source_key: None,
            kind: FieldKind::Scalar(coercion),
            required: false,
            policy: CoercionPolicy::Strict,
        }
    }

    /// Text field.
    #[must_use]
    pub const fn text(name: &'static str) -> Self {
        Self::scalar(name, Coercion::Text)
    }

    /// Integer field.
    #[must_use]
    pub const fn integer(name: &'static str) -> Self {
        Self::scalar(name, Coercion::Integer)
    }

    /// Decimal field.
    #[must_use]
    pub const fn decimal(name: &'static str) -> Self {
        Self::scalar(name, Coercion::Decimal)
    }

    /// Boolean field.
    #[must_use]
    pub const fn boolean(name: &'static str) -> Self {
        Self::scalar(name, Coercion::Boolean)
    }

    /// Date field.
    #[must_use]
    pub const fn date(name: &'static str) -> Self {
        Self::scalar(name, Coercion::Date)
    }

    /// Timestamp field.
    #[must_use]
    pub const fn datetime(name: &'static str) -> Self {
        Self::scalar(name, Coercion::DateTime)
    }

    /// Nested object field.
    #[must_use]
    pub const fn object(name: &'static str, schema: &'static Schema) -> Self {
        Self {
            name,
            source_key: None,
            kind: FieldKind::Object(schema),
            required: false,
            policy: CoercionPolicy::Strict,
        }
    }

    /// List of objects.
    #[must_use]
    pub const fn list(name: &'static str, schema: &'static Schema) -> Self {
        Self {
            name,
            source_key: None,
            kind: FieldKind::List { item: ListItem::Object(schema), wrapper: None },
            required: false,
            policy: CoercionPolicy::Strict,
        }
    }

    /// List of scalars.
    #[must_use]
    pub const fn scalar_list(name: &'static str, coercion: Coercion) -> Self {
        Self {
            name,
            source_key: None,
            kind: FieldKind::List { item: ListItem::Scalar(coercion), wrapper: None },
            required: false,
            policy: CoercionPolicy::Strict,
        }
    }

    /// Reads list elements named `element` from inside the field's wrapper element.
    ///
    /// Has no effect on non-list fields.
    #[must_use]
    pub const fn wrapped(self, element: &'static str) -> Self {
        let kind = match self.kind {
            FieldKind::List { item, .. } => FieldKind::List { item, wrapper: Some(element) },
            other => other,
        };
        Self { kind, ..self }
    }

    /// Reads the field from `key` instead of `name`.
    #[must_use]
    pub const fn from_key(self, key: &'static str) -> Self {
        Self { source_key: Some(key), ..self }
    }

    /// Reports absence as a missing-field diagnostic.
    #[must_use]
    pub const fn required(self) -> Self {
        Self { required: true, ..self }
    }

    /// Keeps the raw text when coercion fails.
    #[must_use]
    pub const fn best_effort(self) -> Self {
        Self { policy: CoercionPolicy::BestEffort, ..self }
    }

    /// Key looked up in the document.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self.source_key {
            Some(key) => key,
            None => self.name,
        }
    }
}

/// Declarative field set for one marketplace entity.
#[derive(Debug)]
pub struct Schema {
    /// Entity name, used as the root of error paths.
    pub entity: &'static str,
    /// Fields in declaration order.
    pub fields: &'static [FieldDescriptor],
}

impl Schema {
    /// Creates a schema.
    #[must_use]
    pub const fn new(entity: &'static str, fields: &'static [FieldDescriptor]) -> Self {
        Self { entity, fields }
    }

    /// Finds a field by attribute name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }
}
