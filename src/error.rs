//! Error types for the bol.com marketplace client.
//!
//! Every fallible operation in this crate returns [`Result`], whose error type is [`ApiError`].
//! Errors are attributed as precisely as possible: a value that cannot be coerced reports the
//! full field path inside the response document, and a non-2xx response keeps the status code
//! and the marketplace's own description apart from network-level failures.
//!
//! # Error Categories
//!
//! - **Mapping errors** ([`ApiError::Coercion`], [`ApiError::MissingRequiredField`],
//!   [`ApiError::Document`]): the response could not be turned into typed values
//! - **Marketplace errors** ([`ApiError::Marketplace`]): the API answered with a non-2xx status
//! - **Transport errors** ([`ApiError::Transport`], [`ApiError::TransportMessage`]): the request
//!   never produced an HTTP response
//! - **Caller errors** ([`ApiError::InvalidInput`], [`ApiError::Config`], [`ApiError::Auth`])
//!
//! # Examples
//!
//! ```
//! use bol_api::error::{ApiError, Result};
//!
//! fn check_page(page: u32) -> Result<u32> {
//!     if page == 0 {
//!         return Err(ApiError::InvalidInput("page numbers start at 1".to_owned()));
//!     }
//!     Ok(page)
//! }
//!
//! assert!(check_page(0).is_err());
//! ```

use std::fmt;

use thiserror::Error;

use crate::mapping::ValueKind;

/// Result type alias for marketplace operations.
///
/// All fallible functions in this crate return this type.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Source format of a document that failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Plaza API payloads.
    Xml,
    /// Retailer API payloads.
    Json,
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xml => f.write_str("XML"),
            Self::Json => f.write_str("JSON"),
        }
    }
}

/// A scalar could not be converted to the type its field declares.
///
/// The `path` names the field inside the mapped document, for example
/// `Orders.Order[0].OrderItems[0].OfferPrice`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot read `{path}` as {expected}: got {raw_value:?}")]
pub struct CoercionError {
    /// Dotted path of the offending field.
    pub path: String,
    /// The raw value as it appeared in the document.
    pub raw_value: String,
    /// The kind of value the schema expected.
    pub expected: ValueKind,
}

impl CoercionError {
    /// Creates a coercion error for the field at `path`.
    pub fn new(path: impl Into<String>, raw_value: impl Into<String>, expected: ValueKind) -> Self {
        Self { path: path.into(), raw_value: raw_value.into(), expected }
    }
}

/// One field-level complaint attached to a marketplace error response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Name of the rejected request field.
    pub name: String,
    /// Why the marketplace rejected it.
    pub reason: String,
}

/// Error body returned by the marketplace together with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarketplaceError {
    /// HTTP status code.
    pub status: u16,
    /// Marketplace error code (Plaza `ErrorCode`), when supplied.
    pub code: Option<String>,
    /// Human-readable description; the raw body when it could not be parsed.
    pub description: String,
    /// Per-field violations (Retailer problem responses).
    pub violations: Vec<Violation>,
}

impl fmt::Display for MarketplaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {}", self.status)?;
        if let Some(code) = &self.code {
            write!(f, " [{code}]")?;
        }
        if !self.description.is_empty() {
            write!(f, ": {}", self.description)?;
        }
        for violation in &self.violations {
            write!(f, "; {}: {}", violation.name, violation.reason)?;
        }
        Ok(())
    }
}

/// Errors that can occur while talking to the marketplace.
///
/// # Error Recovery
///
/// - **Transient errors** ([`Transport`](Self::Transport)): retried by the HTTP transport
///   according to its [`RetryPolicy`](crate::reliability::RetryPolicy); surfaced once exhausted
/// - **Marketplace errors** ([`Marketplace`](Self::Marketplace)): never retried; inspect the
///   status and description
/// - **Mapping errors** ([`Coercion`](Self::Coercion)): the response does not match its schema;
///   the path points at the field
/// - **Caller errors** ([`InvalidInput`](Self::InvalidInput), [`Config`](Self::Config)): fix the
///   input and call again
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum ApiError {
    /// A response field could not be coerced to its declared type.
    ///
    /// Only fields whose schema is strict raise this; best-effort fields fall back to their raw
    /// text instead.
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    /// Fields declared as required were absent from a mapped object.
    ///
    /// The mapper never raises this on its own. It records absences as diagnostics and callers
    /// opt in with [`MappedObject::require_complete`](crate::mapping::MappedObject::require_complete).
    #[error("{entity} is missing required fields: {}", .paths.join(", "))]
    MissingRequiredField {
        /// Entity that was being mapped.
        entity: String,
        /// Paths of the absent fields.
        paths: Vec<String>,
    },

    /// The marketplace answered with a non-2xx status.
    ///
    /// # Recovery
    ///
    /// 4xx responses mean the request was rejected (bad credentials, unknown id, invalid
    /// body); 5xx responses are marketplace outages. Neither is retried automatically.
    #[error("marketplace error: {0}")]
    Marketplace(MarketplaceError),

    /// HTTP request failed before a response was received.
    ///
    /// Wraps [`reqwest::Error`]: timeouts, refused connections, DNS and TLS failures.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Transport-level failure that does not originate in reqwest.
    ///
    /// Raised for rejected URLs, paths and headers before a request is sent.
    #[error("transport error: {0}")]
    TransportMessage(String),

    /// A response body was not a well-formed document.
    #[error("malformed {format} document: {message}")]
    Document {
        /// Format the body was parsed as.
        format: DocumentFormat,
        /// Parser message.
        message: String,
    },

    /// Authentication failed: the token endpoint refused the credentials, a refresh timed
    /// out, or a request could not be signed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Invalid caller input, such as an unknown request option or a missing required one.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Returns the HTTP status for marketplace errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Marketplace(err) => Some(err.status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
