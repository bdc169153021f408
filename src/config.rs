//! Client configuration.
//!
//! TOML-deserializable. Secrets never live in the file: each credential is named by the
//! environment variable that holds it and read when the client is built.
//!
//! ```toml
//! [plaza]
//! public_key_env = "BOL_PLAZA_PUBLIC_KEY"
//! private_key_env = "BOL_PLAZA_PRIVATE_KEY"
//! test = true
//!
//! [retailer]
//! client_id_env = "BOL_CLIENT_ID"
//! client_secret_env = "BOL_CLIENT_SECRET"
//! demo = false
//!
//! [http]
//! timeout_secs = 20
//! ```

use std::{path::Path, time::Duration};

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::{
    auth::{ClientCredentials, LOGIN_URL, PlazaSigner, TokenCache},
    client::{PlazaApi, RetailerApi},
    error::{ApiError, Result},
    transport::{HttpConfig, HttpTransport},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Plaza API settings; absent when only the Retailer API is used.
    #[serde(default)]
    pub plaza: Option<PlazaConfig>,

    /// Retailer API settings; absent when only the Plaza API is used.
    #[serde(default)]
    pub retailer: Option<RetailerConfig>,

    /// Transport settings shared by both clients.
    #[serde(default)]
    pub http: HttpConfig,
}

/// `[plaza]` table.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PlazaConfig {
    /// Variable holding the public key.
    pub public_key_env: String,
    /// Variable holding the private key.
    pub private_key_env: String,
    /// Use the test environment.
    #[serde(default)]
    pub test: bool,
    /// Overrides the environment's base URL.
    #[serde(default)]
    pub base_url: Option<String>,
}

/// `[retailer]` table.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RetailerConfig {
    /// Variable holding the OAuth2 client id.
    pub client_id_env: String,
    /// Variable holding the OAuth2 client secret.
    pub client_secret_env: String,
    /// Use the demo environment.
    #[serde(default)]
    pub demo: bool,
    /// Overrides the environment's base URL.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Overrides the token endpoint.
    #[serde(default)]
    pub login_url: Option<String>,
    /// Bound on a single token refresh.
    #[serde(default = "default_token_timeout_secs")]
    pub token_timeout_secs: u64,
}

fn default_token_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the document does not parse or fails
    /// [`ClientConfig::validate`].
    ///
    /// # Examples
    ///
    /// ```
    /// use bol_api::config::ClientConfig;
    ///
    /// let config = ClientConfig::from_toml(
    ///     r#"
    ///     [retailer]
    ///     client_id_env = "BOL_CLIENT_ID"
    ///     client_secret_env = "BOL_CLIENT_SECRET"
    ///     "#,
    /// )
    /// .unwrap();
    /// assert!(config.plaza.is_none());
    /// ```
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ApiError::Config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the file cannot be read, otherwise as
    /// [`ClientConfig::from_toml`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ApiError::Config(format!("cannot read {}: {e}", path.display())))?;
        debug!(path = %path.display(), "loading client configuration");
        Self::from_toml(&content)
    }

    /// Checks URLs, variable names and HTTP bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when:
    /// - a URL override is not HTTPS or points to localhost
    /// - an environment variable name is not an identifier
    /// - `token_timeout_secs` is outside 1-300
    /// - the `[http]` table is out of bounds
    pub fn validate(&self) -> Result<()> {
        if let Some(plaza) = &self.plaza {
            validate_env_var_name(&plaza.public_key_env)?;
            validate_env_var_name(&plaza.private_key_env)?;
            if let Some(url) = &plaza.base_url {
                validate_base_url("plaza.base_url", url)?;
            }
        }

        if let Some(retailer) = &self.retailer {
            validate_env_var_name(&retailer.client_id_env)?;
            validate_env_var_name(&retailer.client_secret_env)?;
            if let Some(url) = &retailer.base_url {
                validate_base_url("retailer.base_url", url)?;
            }
            if let Some(url) = &retailer.login_url {
                validate_base_url("retailer.login_url", url)?;
            }
            if retailer.token_timeout_secs == 0 || retailer.token_timeout_secs > 300 {
                return Err(ApiError::Config(
                    "retailer.token_timeout_secs must be between 1 and 300".to_owned(),
                ));
            }
        }

        self.http.validate()
    }

    /// Builds a Plaza client with credentials from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the `[plaza]` table is missing or a variable is unset,
    /// or the error of building the transport.
    pub fn plaza_client(&self) -> Result<PlazaApi<HttpTransport>> {
        let plaza = self
            .plaza
            .as_ref()
            .ok_or_else(|| ApiError::Config("missing [plaza] table".to_owned()))?;
        let signer = PlazaSigner::new(
            read_env(&plaza.public_key_env)?,
            read_env(&plaza.private_key_env)?,
        );

        let api = PlazaApi::new(HttpTransport::with_config(&self.http)?, signer)
            .with_test_environment(plaza.test);
        Ok(match &plaza.base_url {
            Some(url) => api.with_base_url(url.clone()),
            None => api,
        })
    }

    /// Builds a Retailer client with a cached client-credentials token source.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the `[retailer]` table is missing or a variable is
    /// unset, or the error of building the transport.
    pub fn retailer_client(
        &self,
    ) -> Result<RetailerApi<HttpTransport, TokenCache<ClientCredentials<HttpTransport>>>> {
        let retailer = self
            .retailer
            .as_ref()
            .ok_or_else(|| ApiError::Config("missing [retailer] table".to_owned()))?;

        let transport = HttpTransport::with_config(&self.http)?;
        let credentials = ClientCredentials::new(
            transport.clone(),
            read_env(&retailer.client_id_env)?,
            read_env(&retailer.client_secret_env)?,
        )
        .with_login_url(retailer.login_url.as_deref().unwrap_or(LOGIN_URL));
        let tokens = TokenCache::new(credentials)
            .with_refresh_timeout(Duration::from_secs(retailer.token_timeout_secs));

        let api = RetailerApi::new(transport, tokens).with_demo_environment(retailer.demo);
        Ok(match &retailer.base_url {
            Some(url) => api.with_base_url(url.clone()),
            None => api,
        })
    }
}

fn read_env(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| ApiError::Config(format!("environment variable {name} is not set")))
}

fn validate_base_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| ApiError::Config(format!("invalid {field} '{value}': {e}")))?;

    if url.scheme() != "https" {
        return Err(ApiError::Config(format!("{field} must use HTTPS, got: {}", url.scheme())));
    }

    if let Some(host) = url.host_str() {
        let host = host.to_lowercase();
        if host == "localhost" || host == "::1" || host == "[::1]" || host.starts_with("127.") {
            return Err(ApiError::Config(format!(
                "{field} must not be localhost or loopback: {host}"
            )));
        }
    }

    Ok(())
}

fn validate_env_var_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(ApiError::Config("environment variable name cannot be empty".to_owned()));
    };

    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(ApiError::Config(format!(
            "environment variable name must start with letter or underscore: {name}"
        )));
    }
    if let Some(ch) = chars.find(|ch| !ch.is_ascii_alphanumeric() && *ch != '_') {
        return Err(ApiError::Config(format!(
            "environment variable name contains invalid character '{ch}': {name}"
        )));
    }

    Ok(())
}
