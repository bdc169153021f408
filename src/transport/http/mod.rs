//! reqwest-backed [`Transport`] for the Plaza and Retailer hosts.
//!
//! Requests are screened before anything touches the network: the endpoint must be an HTTPS
//! URL on a non-loopback host, the path must not climb out of the API root and no header or
//! query pair may smuggle in control characters.

use std::{net::IpAddr, sync::LazyLock};

use reqwest::Client;
use tracing::{debug, instrument};
use url::{Host, Url};

use super::config::{HttpConfig, HttpVersion};
use crate::{
    error::{ApiError, Result},
    reliability::{RetryPolicy, is_retryable, retry_with_backoff},
    transport::{ApiRequest, Method, Transport, TransportResponse},
};

/// Pooled client behind [`HttpTransport::new`], built once from [`HttpConfig::default`].
///
/// `None` if reqwest could not initialise its TLS backend.
static SHARED_CLIENT: LazyLock<Option<Client>> =
    LazyLock::new(|| build_client(&HttpConfig::default()).ok());

fn build_client(config: &HttpConfig) -> Result<Client> {
    let builder = Client::builder()
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout());

    let builder = match config.http_version {
        HttpVersion::Http1 => builder.http1_only(),
        HttpVersion::Http2 => builder.http2_prior_knowledge(),
        HttpVersion::Auto => builder,
    };

    builder.build().map_err(ApiError::Transport)
}

fn rejected(reason: &str) -> ApiError {
    ApiError::TransportMessage(reason.to_owned())
}

/// Accepts only HTTPS endpoints that do not resolve to the local machine.
pub(crate) fn validate_url(url: &Url) -> Result<()> {
    if url.scheme() != "https" {
        return Err(rejected("marketplace endpoints must use https"));
    }

    let loopback = match url.host() {
        Some(Host::Domain(name)) => name.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
        Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
        None => false,
    };
    if loopback {
        return Err(rejected("loopback hosts cannot be used as a marketplace endpoint"));
    }

    Ok(())
}

/// Refuses `..` and empty segments, and relative paths.
fn sanitize_path(path: &str) -> Result<&str> {
    if path.contains("..") || path.contains("//") {
        return Err(rejected("request path contains a traversal segment"));
    }
    match path.chars().next() {
        None | Some('/') => Ok(path),
        Some(_) => Err(rejected("request path is not absolute")),
    }
}

fn has_control_char(text: &str) -> bool {
    text.chars().any(|c| matches!(c, '\r' | '\n' | '\0'))
}

/// Refuses header (or query) pairs carrying CR, LF or NUL.
fn validate_header(name: &str, value: &str) -> Result<()> {
    if has_control_char(name) {
        return Err(rejected("header name contains a control character"));
    }
    if has_control_char(value) {
        return Err(rejected("header value contains a control character"));
    }
    Ok(())
}

/// Production transport for both marketplace APIs.
///
/// Timeouts and failed connects are retried according to the [`RetryPolicy`]. Every response
/// that carries a status line, error statuses included, goes straight back to the client.
///
/// # Examples
///
/// ```
/// use bol_api::transport::{HttpConfig, HttpTransport, HttpVersion};
///
/// let config = HttpConfig { timeout_secs: 60, http_version: HttpVersion::Http1, ..Default::default() };
/// let transport = HttpTransport::with_config(&config).unwrap();
/// assert_eq!(transport.protocol_name(), "http/1.1");
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    version: HttpVersion,
    retry: RetryPolicy,
}

impl HttpTransport {
    /// Transport on the shared client with [`HttpConfig::default`] settings.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::TransportMessage`] if the TLS backend could not be initialized.
    pub fn new() -> Result<Self> {
        let client = SHARED_CLIENT
            .clone()
            .ok_or_else(|| rejected("the shared HTTP client could not be built"))?;
        Ok(Self { client, version: HttpVersion::Auto, retry: RetryPolicy::default() })
    }

    /// Transport with its own client built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] for out-of-range settings and [`ApiError::Transport`] if
    /// reqwest refuses the builder.
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: build_client(config)?,
            version: config.http_version,
            retry: config.retry.policy(),
        })
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Protocol label recorded on the request span.
    #[must_use]
    pub const fn protocol_name(&self) -> &'static str {
        match self.version {
            HttpVersion::Http1 => "http/1.1",
            HttpVersion::Http2 => "http/2",
            HttpVersion::Auto => "http",
        }
    }

    fn screen(request: &ApiRequest) -> Result<()> {
        validate_url(&request.url)?;
        sanitize_path(request.url.path())?;
        request
            .headers
            .iter()
            .chain(&request.query)
            .try_for_each(|(name, value)| validate_header(name, value))
    }

    async fn attempt(&self, request: &ApiRequest) -> Result<TransportResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut outgoing = self.client.request(method, request.url.clone());
        if !request.query.is_empty() {
            outgoing = outgoing.query(&request.query);
        }
        for (name, value) in &request.headers {
            outgoing = outgoing.header(name, value);
        }
        if let Some(body) = &request.body {
            outgoing = outgoing.body(body.clone());
        }

        let response = outgoing.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_owned())))
            .collect();

        let body = response.bytes().await.map_err(ApiError::Transport)?.to_vec();
        debug!(status, bytes = body.len(), "marketplace responded");

        Ok(TransportResponse { status, headers, body })
    }
}

impl Transport for HttpTransport {
    #[instrument(
        skip(self, request),
        fields(method = %request.method, url = %request.url, protocol = self.protocol_name())
    )]
    async fn send<'a>(&'a self, request: ApiRequest) -> Result<TransportResponse> {
        Self::screen(&request)?;
        retry_with_backoff(&self.retry, is_retryable, || self.attempt(&request)).await
    }
}
