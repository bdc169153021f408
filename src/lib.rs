//! bol.com marketplace client library.
//!
//! Maps the responses of the two bol.com seller APIs into typed, navigable objects: the
//! older Plaza API (REST/XML) and the Retailer API (REST/JSON).
//!
//! # Overview
//!
//! The core is a schema-driven mapping layer. A [`Schema`](mapping::Schema) declares, per
//! field, the source key and the coercion to apply (text, integer, exact decimal, boolean,
//! date, timestamp with offset, nested object, repeated collection). The mapper applies it to
//! a parsed [`RawDocument`](document::RawDocument) and yields a
//! [`MappedObject`](mapping::MappedObject) addressable by name or by path. The same mapper
//! serves every resource of both APIs; [`schemas`] holds the declarations.
//!
//! Around it sit the resource clients in [`client`], the [`transport`] and [`auth`]
//! collaborators they call, and [`config`] for building clients from TOML.
//!
//! # Examples
//!
//! ```
//! use bol_api::{document::RawDocument, mapping::map_document, schemas::plaza};
//! use rust_decimal::Decimal;
//!
//! # fn example() -> bol_api::Result<()> {
//! let doc = RawDocument::parse_xml(
//!     b"<Payments><Payment><PaymentAmount>425.77</PaymentAmount></Payment></Payments>",
//! )?;
//! let payments = map_document(&plaza::PAYMENTS, &doc)?;
//!
//! assert_eq!(
//!     payments.path("Payment[0].PaymentAmount").and_then(|v| v.as_decimal()),
//!     Some(Decimal::new(42577, 2)),
//! );
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest and quick-xml"
)]

pub mod auth;
pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod mapping;
pub mod reliability;
pub mod schemas;
pub mod transport;

pub use client::{PlazaApi, ProcessStatus, RetailerApi, TransporterCode};
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use mapping::{FieldValue, MappedObject, Timestamp};
