//! Document collection endpoints: list, register, delete.

use crate::auth::models::AuthContext;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use librecloud_core::constants::MAX_DOCUMENT_SIZE_BYTES;
use librecloud_core::models::DocumentRecord;
use librecloud_core::validation::{is_allowed_content_type, is_valid_document_id};
use librecloud_core::AppError;
use librecloud_storage::document_key;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentRecord>,
    pub total: usize,
}

/// `GET /api/documents`
#[tracing::instrument(skip(state), fields(user_id = %ctx.identity.user_id))]
pub async fn list_documents(
    ctx: AuthContext,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, HttpAppError> {
    let documents = state.documents.list(ctx.user_id()).await?;
    let total = documents.len();
    Ok(Json(DocumentListResponse { documents, total }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    /// Client-supplied id; a fresh one is generated when absent.
    pub doc_id: Option<String>,
    pub file_name: String,
    pub file_size: i64,
    pub content_type: Option<String>,
}

/// `POST /api/documents`
///
/// Registers metadata for a document whose payload the client uploads through
/// a presigned URL. Admission checks (type allow-list, size cap) run here as
/// well as at presign time; storage itself never re-checks.
#[tracing::instrument(skip(state, request), fields(user_id = %ctx.identity.user_id))]
pub async fn create_document(
    ctx: AuthContext,
    State(state): State<AppState>,
    Json(request): Json<CreateDocumentRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let doc_id = match request.doc_id.as_deref() {
        Some(raw) => {
            if !is_valid_document_id(raw) {
                return Err(HttpAppError(AppError::InvalidInput(
                    "Invalid document ID format".to_string(),
                )));
            }
            Uuid::parse_str(raw)
                .map_err(|_| AppError::InvalidInput("Invalid document ID format".to_string()))?
        }
        None => Uuid::new_v4(),
    };

    if request.file_name.trim().is_empty() {
        return Err(HttpAppError(AppError::InvalidInput(
            "fileName must not be empty".to_string(),
        )));
    }
    if request.file_size <= 0 {
        return Err(HttpAppError(AppError::InvalidInput(
            "fileSize must be positive".to_string(),
        )));
    }
    if request.file_size as u64 > MAX_DOCUMENT_SIZE_BYTES {
        return Err(HttpAppError(AppError::PayloadTooLarge(format!(
            "File exceeds the {} MB limit",
            MAX_DOCUMENT_SIZE_BYTES / 1024 / 1024
        ))));
    }
    if let Some(content_type) = request.content_type.as_deref() {
        if !is_allowed_content_type(content_type) {
            return Err(HttpAppError(AppError::BadRequest(format!(
                "File type not allowed: {content_type}"
            ))));
        }
    }

    let now = Utc::now();
    let record = DocumentRecord {
        user_id: ctx.user_id().to_string(),
        doc_id,
        file_name: request.file_name,
        file_size: request.file_size,
        content_type: request.content_type,
        uploaded_at: now,
        last_modified: now,
    };
    state.documents.create(record.clone()).await?;

    tracing::info!(doc_id = %doc_id, "Document registered");
    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDocumentQuery {
    pub doc_id: String,
}

/// `DELETE /api/documents?docId=<uuid>`
///
/// Metadata and payload are deleted concurrently, best-effort: a storage
/// failure is logged and the request still succeeds, since the metadata
/// record is the source of truth for document existence.
#[tracing::instrument(skip(state, query), fields(user_id = %ctx.identity.user_id))]
pub async fn delete_document(
    ctx: AuthContext,
    State(state): State<AppState>,
    Query(query): Query<DeleteDocumentQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !is_valid_document_id(&query.doc_id) {
        return Err(HttpAppError(AppError::InvalidInput(
            "Invalid document ID format".to_string(),
        )));
    }
    let doc_id = Uuid::parse_str(&query.doc_id)
        .map_err(|_| AppError::InvalidInput("Invalid document ID format".to_string()))?;

    let key = document_key(ctx.user_id(), doc_id);
    let (storage_result, store_result) = tokio::join!(
        state.storage.delete(&key),
        state.documents.delete(ctx.user_id(), doc_id),
    );

    if let Err(e) = storage_result {
        tracing::warn!(error = %e, key = %key, "Failed to delete document payload");
    }
    if !store_result? {
        return Err(HttpAppError(AppError::NotFound(
            "Document not found".to_string(),
        )));
    }

    tracing::info!(doc_id = %doc_id, "Document deleted");
    Ok(Json(json!({ "success": true })))
}
