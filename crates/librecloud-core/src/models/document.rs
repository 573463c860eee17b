use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-user document metadata, keyed by `(user_id, doc_id)`.
///
/// A record is owned exclusively by the user who registered it; there is no
/// sharing model. The object-storage payload lives under the deterministic
/// key `{user_id}/{doc_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub user_id: String,
    pub doc_id: Uuid,
    pub file_name: String,
    pub file_size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

/// Partial update for a document record. Fields left as `None` are untouched.
///
/// `last_modified` is always refreshed on update, even when every field here
/// is `None`; callers that want a specific timestamp can supply one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}
