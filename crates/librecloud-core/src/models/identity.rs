use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Which credential scheme authenticated a request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// Short-lived desktop token minted by the pairing flow
    Pairing,
    /// Token issued by the external identity provider for browser sessions
    Session,
}

impl Display for AuthScheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AuthScheme::Pairing => write!(f, "pairing"),
            AuthScheme::Session => write!(f, "session"),
        }
    }
}

/// Normalized identity produced by the credential validator and snapshotted
/// onto a pairing record when the browser sign-in completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            first_name: None,
            last_name: None,
        }
    }
}
