//! Single-flight token caching.

use std::time::Duration;

use tokio::{
    sync::Mutex,
    time::{Instant, timeout},
};
use tracing::{debug, warn};

use super::{AccessToken, TokenSource};
use crate::error::{ApiError, Result};

/// Tokens are treated as expired this long before the server says they are.
const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
struct CachedToken {
    token: AccessToken,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expires_at| now < expires_at)
    }
}

/// Caches the token of an inner [`TokenSource`] and refreshes it at most once at a time.
///
/// The cache lock is held across the refresh: the first caller to find the token stale
/// fetches a new one, later callers wait on the lock and then reuse it. A rejected token is
/// only dropped while it is still the cached one, so a burst of 401s for the same token
/// leads to one login. A refresh that takes
/// longer than the refresh timeout fails with [`ApiError::Auth`] and leaves the cache empty.
///
/// # Examples
///
/// ```
/// use bol_api::auth::{StaticToken, TokenCache, TokenSource};
///
/// # async fn example() -> bol_api::Result<()> {
/// let tokens = TokenCache::new(StaticToken::new("abc"));
/// assert_eq!(tokens.fetch_token().await?.access_token, "abc");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TokenCache<S> {
    source: S,
    state: Mutex<Option<CachedToken>>,
    refresh_timeout: Duration,
}

impl<S: TokenSource> TokenCache<S> {
    /// Wraps `source` with a 30 second refresh timeout.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self { source, state: Mutex::new(None), refresh_timeout: DEFAULT_REFRESH_TIMEOUT }
    }

    /// Sets the bound on a single refresh.
    #[must_use]
    pub fn with_refresh_timeout(mut self, refresh_timeout: Duration) -> Self {
        self.refresh_timeout = refresh_timeout;
        self
    }

    /// The wrapped source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    async fn current(&self) -> Result<AccessToken> {
        let mut state = self.state.lock().await;

        if let Some(cached) = state.as_ref()
            && cached.is_fresh(Instant::now())
        {
            return Ok(cached.token.clone());
        }

        debug!("refreshing access token");
        let token = timeout(self.refresh_timeout, self.source.fetch_token())
            .await
            .map_err(|_| {
                warn!(timeout_secs = self.refresh_timeout.as_secs(), "token refresh timed out");
                ApiError::Auth("token refresh timed out".to_owned())
            })??;

        let expires_at = token
            .expires_in
            .map(|secs| Instant::now() + Duration::from_secs(secs).saturating_sub(EXPIRY_MARGIN));
        *state = Some(CachedToken { token: token.clone(), expires_at });

        Ok(token)
    }
}

impl<S: TokenSource> TokenSource for TokenCache<S> {
    async fn fetch_token(&self) -> Result<AccessToken> {
        self.current().await
    }

    async fn invalidate(&self, rejected: &AccessToken) {
        let mut state = self.state.lock().await;
        if state.as_ref().is_some_and(|cached| cached.token.access_token == rejected.access_token) {
            debug!("access token invalidated");
            *state = None;
        } else {
            debug!("rejected token already replaced");
        }
    }
}
