//! Plaza request signing.
//!
//! Every Plaza request carries a date header and an HMAC-SHA256 over the method, content type,
//! date and URI path, keyed with the seller's private key.

use std::fmt;

use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{
    error::{ApiError, Result},
    transport::Method,
};

type HmacSha256 = Hmac<Sha256>;

/// Content type of every Plaza request, signed as part of the message.
pub const PLAZA_CONTENT_TYPE: &str = "application/xml; charset=UTF-8";

/// Headers produced by [`PlazaSigner::sign`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlazaSignature {
    /// `X-BOL-Date` value (RFC 1123, GMT).
    pub date: String,
    /// `X-BOL-Authorization` value: `{public_key}:{signature}`.
    pub authorization: String,
}

impl PlazaSignature {
    /// Header pairs to attach to the request.
    #[must_use]
    pub fn headers(&self) -> [(&'static str, &str); 3] {
        [
            ("Content-Type", PLAZA_CONTENT_TYPE),
            ("X-BOL-Date", &self.date),
            ("X-BOL-Authorization", &self.authorization),
        ]
    }
}

/// Signs Plaza API requests with the seller's key pair.
///
/// # Examples
///
/// ```
/// use bol_api::{auth::PlazaSigner, transport::Method};
///
/// let signer = PlazaSigner::new("public", "private");
/// let signature = signer.sign(Method::Get, "/services/rest/orders/v2").unwrap();
/// assert!(signature.authorization.starts_with("public:"));
/// ```
#[derive(Clone)]
pub struct PlazaSigner {
    public_key: String,
    private_key: String,
}

impl PlazaSigner {
    /// Creates a signer from the seller's public and private key.
    #[must_use]
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self { public_key: public_key.into(), private_key: private_key.into() }
    }

    /// The public key, sent in clear in every request.
    #[must_use]
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Signs a request for `path` at the current time.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Auth`] if the private key cannot be used as an HMAC key.
    pub fn sign(&self, method: Method, path: &str) -> Result<PlazaSignature> {
        self.sign_at(method, path, Utc::now())
    }

    /// Signs a request for `path` at a fixed time.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Auth`] if the private key cannot be used as an HMAC key.
    pub fn sign_at(&self, method: Method, path: &str, at: DateTime<Utc>) -> Result<PlazaSignature> {
        let date = at.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let message = Self::signature_base(method, path, &date);

        let mut mac = HmacSha256::new_from_slice(self.private_key.as_bytes())
            .map_err(|e| ApiError::Auth(format!("invalid signing key: {e}")))?;
        mac.update(message.as_bytes());
        let signature =
            base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());

        Ok(PlazaSignature { authorization: format!("{}:{signature}", self.public_key), date })
    }

    fn signature_base(method: Method, path: &str, date: &str) -> String {
        format!("{method}\n\n{PLAZA_CONTENT_TYPE}\n{date}\nx-bol-date:{date}\n{path}")
    }
}

impl fmt::Debug for PlazaSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlazaSigner")
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}
