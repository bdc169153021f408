//! Credentials for both API generations.
//!
//! The Retailer API takes an OAuth2 bearer token from a [`TokenSource`]. In production that is
//! a [`TokenCache`] wrapping [`ClientCredentials`], so concurrent requests share one login.
//! The Plaza API signs every request with an HMAC instead; see [`PlazaSigner`].

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;
use std::fmt;

use crate::{
    error::Result,
    mapping::{FromMapped, MappedObject},
};

mod cache;
mod hmac;
mod oauth;

pub use cache::TokenCache;
pub use hmac::{PLAZA_CONTENT_TYPE, PlazaSignature, PlazaSigner};
pub use oauth::{ClientCredentials, LOGIN_URL};

/// An OAuth2 access token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// Bearer token value.
    pub access_token: String,
    /// Token type, normally `Bearer`.
    pub token_type: String,
    /// Lifetime in seconds from issue, when the server states one.
    pub expires_in: Option<u64>,
    /// Granted scopes.
    pub scope: Option<String>,
}

impl AccessToken {
    /// Creates a bearer token without an expiry.
    #[must_use]
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".to_owned(),
            expires_in: None,
            scope: None,
        }
    }

    /// Value of the `Authorization` header.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}

impl FromMapped for AccessToken {
    fn from_mapped(object: &MappedObject) -> Result<Self> {
        Ok(Self {
            access_token: object.require_text("access_token")?,
            token_type: object.text("token_type").unwrap_or("Bearer").to_owned(),
            expires_in: object.integer("expires_in").and_then(|secs| u64::try_from(secs).ok()),
            scope: object.text("scope").map(str::to_owned),
        })
    }
}

/// Supplies access tokens to the Retailer client.
pub trait TokenSource: Send + Sync {
    /// Returns a token that is valid now.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Auth`](crate::ApiError::Auth) when no token can be obtained, or the
    /// transport error of the login call.
    fn fetch_token(&self) -> impl Future<Output = Result<AccessToken>> + Send + '_;

    /// Reports that the marketplace refused `rejected`.
    ///
    /// Called by the client after a 401 response, with the token that request carried. A
    /// caching source drops its token only if it is still `rejected`, so callers that shared
    /// one expired token cause a single refresh. Sources without a cache ignore it.
    fn invalidate(&self, rejected: &AccessToken) -> impl Future<Output = ()> + Send {
        let _ = rejected;
        std::future::ready(())
    }
}

/// A fixed token, for pre-issued credentials and tests.
#[derive(Debug, Clone)]
pub struct StaticToken(AccessToken);

impl StaticToken {
    /// Wraps `access_token` as a bearer token.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self(AccessToken::bearer(access_token))
    }
}

impl TokenSource for StaticToken {
    fn fetch_token(&self) -> impl Future<Output = Result<AccessToken>> + Send + '_ {
        std::future::ready(Ok(self.0.clone()))
    }
}
