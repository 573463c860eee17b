//! Content-type admission checks for document uploads.
//!
//! The allow-list covers the office-document and audio formats the editor and
//! player understand. Admission is enforced by the presign handler before any
//! signed URL is generated; the storage gateway itself does not re-check.

/// Content types accepted for upload.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    // OpenDocument formats
    "application/vnd.oasis.opendocument.text",
    "application/vnd.oasis.opendocument.spreadsheet",
    "application/vnd.oasis.opendocument.presentation",
    "application/vnd.oasis.opendocument.graphics",
    // Microsoft Office formats
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/msword",
    "application/vnd.ms-excel",
    "application/vnd.ms-powerpoint",
    // Other document formats
    "application/pdf",
    "text/plain",
    "text/rtf",
    // Audio formats
    "audio/mpeg",
    "audio/wav",
    "audio/flac",
    "audio/ogg",
];

pub fn is_allowed_content_type(content_type: &str) -> bool {
    ALLOWED_CONTENT_TYPES
        .iter()
        .any(|ct| content_type.eq_ignore_ascii_case(ct))
}

/// Canonical file extension for an allowed content type, if one is known.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let ext = match content_type.to_ascii_lowercase().as_str() {
        "application/vnd.oasis.opendocument.text" => ".odt",
        "application/vnd.oasis.opendocument.spreadsheet" => ".ods",
        "application/vnd.oasis.opendocument.presentation" => ".odp",
        "application/vnd.oasis.opendocument.graphics" => ".odg",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => ".docx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => ".xlsx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation" => ".pptx",
        "application/msword" => ".doc",
        "application/vnd.ms-excel" => ".xls",
        "application/vnd.ms-powerpoint" => ".ppt",
        "application/pdf" => ".pdf",
        "text/plain" => ".txt",
        "text/rtf" => ".rtf",
        "audio/mpeg" => ".mp3",
        "audio/wav" => ".wav",
        "audio/flac" => ".flac",
        "audio/ogg" => ".ogg",
        _ => return None,
    };
    Some(ext)
}
