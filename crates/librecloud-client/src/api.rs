//! Document operations for the LibreCloud API client.

use crate::{ApiClient, API_PREFIX};
use anyhow::{Context, Result};
use librecloud_core::models::{DocumentRecord, DocumentUpdate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentRecord>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDocumentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<Uuid>,
    pub file_name: String,
    pub file_size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    pub presigned_url: String,
    pub doc_id: Uuid,
    pub key: String,
    pub expires_in: u64,
    pub file_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PresignRequest<'a> {
    operation: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_size: Option<i64>,
}

impl ApiClient {
    /// All documents owned by the authenticated user, newest upload first.
    pub async fn list_documents(&self) -> Result<Vec<DocumentRecord>> {
        let response: DocumentListResponse =
            self.get(&format!("{API_PREFIX}/documents"), &[]).await?;
        Ok(response.documents)
    }

    pub async fn get_document(&self, doc_id: Uuid) -> Result<DocumentRecord> {
        self.get(&format!("{API_PREFIX}/documents/{doc_id}"), &[])
            .await
    }

    /// Register metadata for a document; the payload goes up separately
    /// through a presigned URL.
    pub async fn register_document(
        &self,
        request: &RegisterDocumentRequest,
    ) -> Result<DocumentRecord> {
        self.post_json(&format!("{API_PREFIX}/documents"), request)
            .await
    }

    pub async fn update_document(
        &self,
        doc_id: Uuid,
        changes: &DocumentUpdate,
    ) -> Result<DocumentRecord> {
        self.patch_json(&format!("{API_PREFIX}/documents/{doc_id}"), changes)
            .await
    }

    pub async fn delete_document(&self, doc_id: Uuid) -> Result<()> {
        self.delete(
            &format!("{API_PREFIX}/documents"),
            &[("docId", doc_id.to_string())],
        )
        .await
    }

    /// Request a presigned upload URL. The server validates the content type
    /// and size cap before signing.
    pub async fn presign_upload(
        &self,
        doc_id: Option<Uuid>,
        file_name: Option<&str>,
        content_type: &str,
        file_size: i64,
    ) -> Result<PresignResponse> {
        self.post_json(
            &format!("{API_PREFIX}/presign"),
            &PresignRequest {
                operation: "put",
                doc_id,
                file_name,
                content_type: Some(content_type),
                file_size: Some(file_size),
            },
        )
        .await
    }

    /// Request a presigned download URL for a registered document.
    pub async fn presign_download(&self, doc_id: Uuid) -> Result<PresignResponse> {
        self.post_json(
            &format!("{API_PREFIX}/presign"),
            &PresignRequest {
                operation: "get",
                doc_id: Some(doc_id),
                file_name: None,
                content_type: None,
                file_size: None,
            },
        )
        .await
    }

    /// PUT the payload to a presigned URL. The URL embeds its own
    /// authorization; no bearer token is attached.
    pub async fn upload_via_presigned(
        &self,
        url: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<()> {
        let response = self
            .client()
            .put(url)
            .header("Content-Type", content_type)
            .body(body)
            .send()
            .await
            .context("Failed to upload document payload")?;
        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Upload failed with status {}",
                response.status()
            ));
        }
        Ok(())
    }

    /// GET the payload from a presigned URL.
    pub async fn download_via_presigned(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client()
            .get(url)
            .send()
            .await
            .context("Failed to download document payload")?;
        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Download failed with status {}",
                response.status()
            ));
        }
        let bytes = response
            .bytes()
            .await
            .context("Failed to read document payload")?;
        Ok(bytes.to_vec())
    }
}
