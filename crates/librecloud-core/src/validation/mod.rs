//! Input validation shared by handlers and services.

mod document_id;
mod file_type;

pub use document_id::is_valid_document_id;
pub use file_type::{extension_for_content_type, is_allowed_content_type, ALLOWED_CONTENT_TYPES};
