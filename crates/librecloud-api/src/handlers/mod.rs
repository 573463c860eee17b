pub mod desktop_init;
pub mod desktop_ready;
pub mod desktop_token;
pub mod document_detail;
pub mod documents;
pub mod health;
pub mod presign;
