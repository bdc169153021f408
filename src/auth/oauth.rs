//! OAuth2 client-credentials login for the Retailer API.

use std::fmt;

use base64::Engine;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{AccessToken, TokenSource};
use crate::{
    document::RawDocument,
    error::{ApiError, Result},
    mapping::map_document,
    schemas::retailer,
    transport::{ApiRequest, Method, Transport},
};

/// Production token endpoint.
pub const LOGIN_URL: &str = "https://login.bol.com/token";

/// Fetches tokens with the client-credentials grant.
///
/// Every call performs a login; wrap it in a [`TokenCache`](super::TokenCache) to reuse tokens.
#[derive(Clone)]
pub struct ClientCredentials<T> {
    transport: T,
    login_url: String,
    client_id: String,
    client_secret: String,
}

impl<T: Transport> ClientCredentials<T> {
    /// Creates a token source against [`LOGIN_URL`].
    #[must_use]
    pub fn new(transport: T, client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            transport,
            login_url: LOGIN_URL.to_owned(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Overrides the token endpoint.
    #[must_use]
    pub fn with_login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = login_url.into();
        self
    }

    fn login_request(&self) -> Result<ApiRequest> {
        let url = Url::parse(&self.login_url)
            .map_err(|e| ApiError::Config(format!("invalid login URL {}: {e}", self.login_url)))?;
        let credentials = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.client_id, self.client_secret));

        Ok(ApiRequest::new(Method::Post, url)
            .with_query("grant_type", "client_credentials")
            .with_header("Accept", "application/json")
            .with_header("Authorization", format!("Basic {credentials}")))
    }

    #[instrument(skip(self), fields(client_id = %self.client_id))]
    async fn login(&self) -> Result<AccessToken> {
        let response = self.transport.send(self.login_request()?).await?;

        if !response.is_success() {
            warn!(status = response.status, "login rejected");
            return Err(ApiError::Auth(format!(
                "token endpoint answered {}: {}",
                response.status,
                String::from_utf8_lossy(&response.body).trim()
            )));
        }

        let document = RawDocument::parse_json(&response.body)?;
        let token: AccessToken = map_document(&retailer::TOKEN, &document)?.to_record()?;
        debug!(expires_in = ?token.expires_in, "access token issued");
        Ok(token)
    }
}

impl<T: Transport> TokenSource for ClientCredentials<T> {
    async fn fetch_token(&self) -> Result<AccessToken> {
        self.login().await
    }
}

impl<T> fmt::Debug for ClientCredentials<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("login_url", &self.login_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
