//! Structural validation for document ids and pairing nonces.
//!
//! Both are canonical hyphenated UUIDs: 32 hex digits grouped 8-4-4-4-12,
//! version nibble 1-5, RFC 4122 variant. Malformed values are rejected here
//! before any store lookup.

/// Check that `value` is a canonical hyphenated UUID string.
///
/// Deliberately stricter than `Uuid::parse_str`, which also accepts braced,
/// URN, and simple (non-hyphenated) forms that the wire format never uses.
pub fn is_valid_document_id(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    for (i, b) in bytes.iter().enumerate() {
        match i {
            8 | 13 | 18 | 23 => {
                if *b != b'-' {
                    return false;
                }
            }
            _ => {
                if !b.is_ascii_hexdigit() {
                    return false;
                }
            }
        }
    }
    // Version nibble (first digit of the third group) must be 1-5.
    if !matches!(bytes[14], b'1'..=b'5') {
        return false;
    }
    // Variant nibble (first digit of the fourth group) must be 8, 9, a, or b.
    matches!(bytes[19], b'8' | b'9' | b'a' | b'b' | b'A' | b'B')
}
