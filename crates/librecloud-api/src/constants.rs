//! API-level constants.

use crate::middleware::rate_limit::RateLimitConfig;
use std::time::Duration;

/// Pairing initiation: 10 requests per 15 minutes per IP.
pub const DESKTOP_INIT_RATE_LIMIT: RateLimitConfig = RateLimitConfig {
    window: Duration::from_secs(15 * 60),
    max_requests: 10,
};

/// Pairing poll: 60 requests per minute per IP, sized for a 1-2s poll loop.
pub const DESKTOP_TOKEN_RATE_LIMIT: RateLimitConfig = RateLimitConfig {
    window: Duration::from_secs(60),
    max_requests: 60,
};
