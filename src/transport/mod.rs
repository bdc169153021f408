//! Transport abstraction.
//!
//! Clients build an [`ApiRequest`] (method, absolute URL, query, headers, body) and hand it
//! to a [`Transport`]. The transport performs the exchange and returns the raw
//! [`TransportResponse`] whatever its status; interpreting non-2xx bodies is the client's job.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bol_api::transport::{ApiRequest, HttpTransport, Method, Transport};
//! use url::Url;
//!
//! # async fn example() -> bol_api::Result<()> {
//! let transport = HttpTransport::new()?;
//!
//! let url = Url::parse("https://plazaapi.bol.com/services/rest/orders/v2").unwrap();
//! let request = ApiRequest::new(Method::Get, url).with_query("page", "1");
//!
//! let response = transport.send(request).await?;
//! println!("Status: {}", response.status);
//! # Ok(())
//! # }
//! ```

use std::{fmt, sync::Arc};

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;

use url::Url;

use crate::error::Result;

pub mod config;
pub mod http;

pub use config::{HttpConfig, HttpVersion, RetryConfig};
pub use http::HttpTransport;

/// HTTP method of a marketplace call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Method {
    /// Upper-case method name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL without query string.
    pub url: Url,
    /// Query parameters in order.
    pub query: Vec<(String, String)>,
    /// Request headers in order.
    pub headers: Vec<(String, String)>,
    /// Body bytes, if any.
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// Creates a request with no query, headers or body.
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url, query: Vec::new(), headers: Vec::new(), body: None }
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query.push((name.to_owned(), value.into()));
        self
    }

    /// Appends a header.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_owned(), value.into()));
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// First header named `name`, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Query value for `name`.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    /// Body as UTF-8 text, lossy.
    #[must_use]
    pub fn body_text(&self) -> String {
        self.body.as_deref().map(String::from_utf8_lossy).unwrap_or_default().into_owned()
    }
}

/// Raw response from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Vec<(String, String)>,
    /// Raw response body bytes.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Creates a response with no headers.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, headers: Vec::new(), body: body.into() }
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// First header named `name`, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
}

/// Performs one HTTP exchange.
///
/// Implementations return every status code as a [`TransportResponse`]; only failures where
/// no response was received are errors. [`HttpTransport`] is the production implementation;
/// tests substitute a stub.
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`](crate::ApiError::Transport) or
    /// [`ApiError::TransportMessage`](crate::ApiError::TransportMessage) when no response was
    /// received.
    fn send<'a>(
        &'a self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;
}

impl<T: Transport> Transport for Arc<T> {
    fn send<'a>(
        &'a self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a {
        (**self).send(request)
    }
}
