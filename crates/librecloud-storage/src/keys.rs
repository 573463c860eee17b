//! Shared key generation for storage backends.
//!
//! Payload keys are deterministically `{user_id}/{doc_id}`. All backends use
//! this format so metadata and payload stay correlated without a lookup
//! table.

use uuid::Uuid;

/// Storage key for a user's document payload.
pub fn document_key(user_id: &str, doc_id: Uuid) -> String {
    format!("{}/{}", user_id, doc_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let doc_id = Uuid::new_v4();
        let key = document_key("user_2abc", doc_id);
        assert_eq!(key, format!("user_2abc/{doc_id}"));
    }
}
