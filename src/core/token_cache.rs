use crate::api::IgdbClient;
use crate::error::AuthError;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Cached bearer token with an absolute expiry instant.
#[derive(Debug, Clone)]
struct CachedToken {
    bearer: String,
    expires_at: Instant,
}

impl CachedToken {
    fn new(bearer: String, ttl: Duration) -> Self {
        Self {
            bearer,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// TTL-bounded cache for the single IGDB bearer token.
///
/// Owned explicitly: constructed at startup and handed to the orchestrator,
/// never module-level state. Cloning shares the same underlying slot.
///
/// Refresh is single-flight: the slot mutex is held across the issuance
/// round trip, so concurrent misses wait for one refresh instead of each
/// issuing their own.
#[derive(Debug)]
pub struct TokenCache {
    slot: Arc<Mutex<Option<CachedToken>>>,
    ttl: Duration,
}

impl Clone for TokenCache {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            ttl: self.ttl,
        }
    }
}

impl TokenCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            ttl,
        }
    }

    /// Return the cached token, refreshing through the identity endpoint on
    /// expiry or first use. A failed issuance caches nothing; retrying is
    /// the caller's call.
    pub async fn get_token(&self, client: &IgdbClient) -> Result<String, AuthError> {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if !cached.is_expired() {
                return Ok(cached.bearer.clone());
            }
        }

        let response = client.request_token().await?;

        // The identity server may grant less than the configured TTL.
        let effective_ttl = match response.expires_in {
            Some(secs) => self.ttl.min(Duration::from_secs(secs)),
            None => self.ttl,
        };

        let cached = CachedToken::new(response.access_token, effective_ttl);
        let bearer = cached.bearer.clone();
        *slot = Some(cached);

        tracing::debug!(ttl_secs = effective_ttl.as_secs(), "bearer token refreshed");
        Ok(bearer)
    }

    /// Drop the cached token so the next caller refreshes.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }

    #[cfg(test)]
    async fn seed(&self, bearer: &str, ttl: Duration) {
        *self.slot.lock().await = Some(CachedToken::new(bearer.to_string(), ttl));
    }

    #[cfg(test)]
    async fn cached_bearer(&self) -> Option<String> {
        self.slot
            .lock()
            .await
            .as_ref()
            .filter(|cached| !cached.is_expired())
            .map(|cached| cached.bearer.clone())
    }
}
