//! Fixed-window request limiter.
//!
//! One counter per identifier, reset when the window elapses. The table is an
//! explicitly-owned value injected through `AppState` rather than a
//! process-wide global, so a shared backend can replace it without touching
//! call sites. Correctness holds within a single process instance only; that
//! is an accepted limitation of this deployment, not a bug.

use axum::http::header::HeaderMap;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Per-endpoint limiter settings.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
}

/// Outcome of one limiter check.
#[derive(Debug, Clone)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
    /// Seconds until the window resets; set only when denied.
    pub retry_after_secs: Option<u64>,
}

struct WindowEntry {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// In-memory fixed-window counter table.
#[derive(Clone, Default)]
pub struct FixedWindowLimiter {
    entries: Arc<Mutex<HashMap<String, WindowEntry>>>,
}

impl FixedWindowLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a request for `identifier` against `config`.
    pub async fn check(&self, identifier: &str, config: RateLimitConfig) -> RateLimitDecision {
        self.check_at(identifier, config, Utc::now()).await
    }

    /// Clock-injected variant of `check`, used directly by tests.
    pub async fn check_at(
        &self,
        identifier: &str,
        config: RateLimitConfig,
        now: DateTime<Utc>,
    ) -> RateLimitDecision {
        let window = ChronoDuration::from_std(config.window).unwrap_or(ChronoDuration::zero());
        let mut entries = self.entries.lock().await;

        // Opportunistic cleanup: drop every expired entry, not just this one.
        entries.retain(|_, entry| entry.reset_at > now);

        match entries.get_mut(identifier) {
            None => {
                // Fresh or just-expired window.
                let reset_at = now + window;
                entries.insert(
                    identifier.to_string(),
                    WindowEntry { count: 1, reset_at },
                );
                RateLimitDecision {
                    allowed: true,
                    limit: config.max_requests,
                    remaining: config.max_requests.saturating_sub(1),
                    reset_at,
                    retry_after_secs: None,
                }
            }
            Some(entry) if entry.count >= config.max_requests => {
                let retry_after = (entry.reset_at - now).num_seconds().max(0) as u64;
                RateLimitDecision {
                    allowed: false,
                    limit: config.max_requests,
                    remaining: 0,
                    reset_at: entry.reset_at,
                    // Ceil to a whole second so callers never retry early.
                    retry_after_secs: Some(retry_after.max(1)),
                }
            }
            Some(entry) => {
                entry.count += 1;
                RateLimitDecision {
                    allowed: true,
                    limit: config.max_requests,
                    remaining: config.max_requests.saturating_sub(entry.count),
                    reset_at: entry.reset_at,
                    retry_after_secs: None,
                }
            }
        }
    }
}

/// `X-RateLimit-*` headers for a decision, attached to both allowed and
/// denied responses on rate-limited endpoints.
pub fn rate_limit_headers(decision: &RateLimitDecision) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = decision.limit.to_string().parse() {
        headers.insert("X-RateLimit-Limit", value);
    }
    if let Ok(value) = decision.remaining.to_string().parse() {
        headers.insert("X-RateLimit-Remaining", value);
    }
    if let Ok(value) = decision.reset_at.to_rfc3339().parse() {
        headers.insert("X-RateLimit-Reset", value);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_CONFIG: RateLimitConfig = RateLimitConfig {
        window: Duration::from_secs(60),
        max_requests: 3,
    };

    #[tokio::test]
    async fn test_first_call_in_fresh_window() {
        let limiter = FixedWindowLimiter::new();
        let decision = limiter.check("ip:203.0.113.1", TEST_CONFIG).await;
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 2);
        assert!(decision.retry_after_secs.is_none());
    }

    #[tokio::test]
    async fn test_nth_allowed_n_plus_first_denied() {
        let limiter = FixedWindowLimiter::new();
        let now = Utc::now();

        for i in 0..TEST_CONFIG.max_requests {
            let decision = limiter.check_at("ip:203.0.113.1", TEST_CONFIG, now).await;
            assert!(decision.allowed, "call {} should be allowed", i + 1);
        }

        let denied = limiter.check_at("ip:203.0.113.1", TEST_CONFIG, now).await;
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert!(denied.retry_after_secs.unwrap() >= 1);
    }

    #[tokio::test]
    async fn test_window_reset_starts_fresh_counter() {
        let limiter = FixedWindowLimiter::new();
        let now = Utc::now();

        for _ in 0..=TEST_CONFIG.max_requests {
            limiter.check_at("ip:203.0.113.1", TEST_CONFIG, now).await;
        }
        assert!(
            !limiter
                .check_at("ip:203.0.113.1", TEST_CONFIG, now)
                .await
                .allowed
        );

        let later = now + ChronoDuration::seconds(61);
        let decision = limiter.check_at("ip:203.0.113.1", TEST_CONFIG, later).await;
        assert!(decision.allowed);
        assert_eq!(decision.remaining, TEST_CONFIG.max_requests - 1);
    }

    #[tokio::test]
    async fn test_identifiers_are_independent() {
        let limiter = FixedWindowLimiter::new();
        let now = Utc::now();

        for _ in 0..TEST_CONFIG.max_requests {
            limiter.check_at("ip:203.0.113.1", TEST_CONFIG, now).await;
        }
        let other = limiter.check_at("ip:198.51.100.1", TEST_CONFIG, now).await;
        assert!(other.allowed);
    }

    #[tokio::test]
    async fn test_expired_entries_purged_for_all_identifiers() {
        let limiter = FixedWindowLimiter::new();
        let now = Utc::now();

        limiter.check_at("ip:a", TEST_CONFIG, now).await;
        limiter.check_at("ip:b", TEST_CONFIG, now).await;

        let later = now + ChronoDuration::seconds(120);
        limiter.check_at("ip:c", TEST_CONFIG, later).await;

        let entries = limiter.entries.lock().await;
        assert!(!entries.contains_key("ip:a"));
        assert!(!entries.contains_key("ip:b"));
        assert!(entries.contains_key("ip:c"));
    }
}
