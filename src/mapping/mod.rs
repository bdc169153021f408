//! Schema-driven mapping between raw documents and typed objects.
//!
//! Every marketplace entity is described once as a static [`Schema`]. [`map_document`] walks a
//! [`RawDocument`](crate::document::RawDocument) with it and produces a [`MappedObject`]:
//!
//! - scalars are coerced per field ([`Coercion`]),
//! - nested objects are mapped recursively,
//! - list fields always yield a list, even for a single child or an absent wrapper,
//! - keys the schema does not name are ignored.
//!
//! Write requests go the other way through [`RequestSchema`] and [`Payload`].

pub mod coerce;
mod mapper;
mod request;
mod schema;
mod value;

pub use coerce::{Coercion, ValueKind};
pub use mapper::{map_document, unmap};
pub use request::{Payload, RequestField, RequestSchema};
pub use schema::{CoercionPolicy, FieldDescriptor, FieldKind, ListItem, Schema};
pub use value::{FieldValue, FromMapped, MappedObject, MissingField, Timestamp};
