//! Single-document endpoints: fetch and partial update.

use crate::auth::models::AuthContext;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use librecloud_core::constants::MAX_DOCUMENT_SIZE_BYTES;
use librecloud_core::models::{AuthScheme, DocumentUpdate};
use librecloud_core::validation::is_valid_document_id;
use librecloud_core::AppError;
use serde::Deserialize;
use uuid::Uuid;

fn parse_doc_id(raw: &str) -> Result<Uuid, AppError> {
    if !is_valid_document_id(raw) {
        return Err(AppError::InvalidInput(
            "Invalid document ID format".to_string(),
        ));
    }
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidInput("Invalid document ID format".to_string()))
}

/// `GET /api/documents/{docId}`
#[tracing::instrument(skip(state), fields(user_id = %ctx.identity.user_id))]
pub async fn get_document(
    ctx: AuthContext,
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let doc_id = parse_doc_id(&doc_id)?;
    let record = state
        .documents
        .get(ctx.user_id(), doc_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;
    Ok(Json(record))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentRequest {
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
}

/// `PATCH /api/documents/{docId}`
///
/// Browser-session only: the desktop client mutates documents through upload,
/// not metadata patches. An empty body is valid and still refreshes
/// `lastModified`. The update is owner-conditioned in the store; a miss is
/// indistinguishable from a document that does not exist.
#[tracing::instrument(skip(state, request), fields(user_id = %ctx.identity.user_id))]
pub async fn update_document(
    ctx: AuthContext,
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
    Json(request): Json<UpdateDocumentRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    if ctx.scheme != AuthScheme::Session {
        return Err(HttpAppError(AppError::Unauthorized(
            "Session authentication required".to_string(),
        )));
    }

    let doc_id = parse_doc_id(&doc_id)?;

    if let Some(file_name) = request.file_name.as_deref() {
        if file_name.trim().is_empty() {
            return Err(HttpAppError(AppError::InvalidInput(
                "fileName must not be empty".to_string(),
            )));
        }
    }
    if let Some(file_size) = request.file_size {
        if file_size <= 0 || file_size as u64 > MAX_DOCUMENT_SIZE_BYTES {
            return Err(HttpAppError(AppError::InvalidInput(
                "fileSize out of range".to_string(),
            )));
        }
    }

    let changes = DocumentUpdate {
        file_name: request.file_name,
        file_size: request.file_size,
        last_modified: None,
    };
    let record = state
        .documents
        .update(ctx.user_id(), doc_id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    Ok(Json(record))
}
