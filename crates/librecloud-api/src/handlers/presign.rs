//! Presigned URL endpoint.
//!
//! The server never proxies document bytes. Clients request a short-lived URL
//! scoped to one operation and talk to storage directly. All admission checks
//! (type allow-list, size cap, ownership) happen here, before any URL is
//! generated.

use crate::auth::models::AuthContext;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use librecloud_core::constants::{MAX_DOCUMENT_SIZE_BYTES, PRESIGNED_URL_TTL};
use librecloud_core::validation::{
    extension_for_content_type, is_allowed_content_type, is_valid_document_id,
};
use librecloud_core::AppError;
use librecloud_storage::document_key;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresignRequestOperation {
    Put,
    Get,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    pub operation: PresignRequestOperation,
    /// Required for `get`; a fresh id is generated for `put` when absent.
    pub doc_id: Option<String>,
    pub file_name: Option<String>,
    /// Required for `put`.
    pub content_type: Option<String>,
    /// Required for `put`; checked against the size cap before signing.
    pub file_size: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    pub presigned_url: String,
    pub doc_id: Uuid,
    pub key: String,
    /// Seconds the URL stays valid.
    pub expires_in: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// `POST /api/presign`
#[tracing::instrument(skip(state, request), fields(user_id = %ctx.identity.user_id))]
pub async fn presign(
    ctx: AuthContext,
    State(state): State<AppState>,
    Json(request): Json<PresignRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    match request.operation {
        PresignRequestOperation::Put => presign_put(ctx, state, request).await,
        PresignRequestOperation::Get => presign_get(ctx, state, request).await,
    }
}

async fn presign_put(
    ctx: AuthContext,
    state: AppState,
    request: PresignRequest,
) -> Result<Json<PresignResponse>, HttpAppError> {
    let content_type = request
        .content_type
        .as_deref()
        .ok_or_else(|| AppError::InvalidInput("contentType is required".to_string()))?;
    if !is_allowed_content_type(content_type) {
        return Err(HttpAppError(AppError::BadRequest(format!(
            "File type not allowed: {content_type}"
        ))));
    }

    let file_size = request
        .file_size
        .ok_or_else(|| AppError::InvalidInput("fileSize is required".to_string()))?;
    if file_size <= 0 {
        return Err(HttpAppError(AppError::InvalidInput(
            "fileSize must be positive".to_string(),
        )));
    }
    if file_size as u64 > MAX_DOCUMENT_SIZE_BYTES {
        return Err(HttpAppError(AppError::PayloadTooLarge(format!(
            "File exceeds the {} MB limit",
            MAX_DOCUMENT_SIZE_BYTES / 1024 / 1024
        ))));
    }

    let doc_id = match request.doc_id.as_deref() {
        Some(raw) => parse_doc_id(raw)?,
        None => Uuid::new_v4(),
    };

    // Canonicalize the display name: append the extension implied by the
    // content type when the client supplied a bare name.
    let file_name = request.file_name.map(|name| {
        match extension_for_content_type(content_type) {
            Some(ext) if !name.to_ascii_lowercase().ends_with(ext) => format!("{name}{ext}"),
            _ => name,
        }
    });

    let key = document_key(ctx.user_id(), doc_id);
    let presigned_url = state
        .storage
        .presigned_put_url(&key, content_type, PRESIGNED_URL_TTL)
        .await?;

    tracing::info!(doc_id = %doc_id, "Issued upload URL");
    Ok(Json(PresignResponse {
        presigned_url,
        doc_id,
        key,
        expires_in: PRESIGNED_URL_TTL.as_secs(),
        file_name,
    }))
}

async fn presign_get(
    ctx: AuthContext,
    state: AppState,
    request: PresignRequest,
) -> Result<Json<PresignResponse>, HttpAppError> {
    let doc_id = request
        .doc_id
        .as_deref()
        .ok_or_else(|| AppError::InvalidInput("docId is required".to_string()))
        .and_then(parse_doc_id)?;

    // Downloads require a registered document; the key format alone is not
    // proof of ownership.
    let record = state
        .documents
        .get(ctx.user_id(), doc_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    let key = document_key(ctx.user_id(), doc_id);
    let presigned_url = state.storage.presigned_get_url(&key, PRESIGNED_URL_TTL).await?;

    tracing::info!(doc_id = %doc_id, "Issued download URL");
    Ok(Json(PresignResponse {
        presigned_url,
        doc_id,
        key,
        expires_in: PRESIGNED_URL_TTL.as_secs(),
        file_name: Some(record.file_name),
    }))
}

fn parse_doc_id(raw: &str) -> Result<Uuid, AppError> {
    if !is_valid_document_id(raw) {
        return Err(AppError::InvalidInput(
            "Invalid document ID format".to_string(),
        ));
    }
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidInput("Invalid document ID format".to_string()))
}
