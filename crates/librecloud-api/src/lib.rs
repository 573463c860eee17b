//! LibreCloud API Library
//!
//! This crate provides the HTTP API handlers, middleware, and application setup.

// Module declarations
mod constants;
mod handlers;
mod middleware;
mod services;
mod utils;

// Public modules
pub mod auth;
pub mod error;
pub mod setup;
pub mod state;

// Re-exports
pub use error::ErrorResponse;
pub use middleware::rate_limit::{FixedWindowLimiter, RateLimitConfig, RateLimitDecision};
pub use services::pairing::{CompleteOutcome, PairingService, PollOutcome};
