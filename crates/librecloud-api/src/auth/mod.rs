//! Credential validation for desktop and browser callers.

pub mod middleware;
pub mod models;
pub mod session;
pub mod token;

pub use middleware::{auth_middleware, AuthState};
pub use models::AuthContext;
pub use session::{JwksSessionVerifier, SessionVerifier, StaticSessionVerifier};
pub use token::DesktopTokenCodec;
