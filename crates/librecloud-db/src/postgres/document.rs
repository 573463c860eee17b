use async_trait::async_trait;
use chrono::Utc;
use librecloud_core::models::{DocumentRecord, DocumentUpdate};
use librecloud_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::traits::DocumentStore;

/// Postgres-backed document metadata store.
///
/// Every mutation is scoped by `(user_id, doc_id)` in the WHERE clause, so an
/// update or delete against a record the caller does not own affects zero
/// rows and surfaces as not-found instead of silently succeeding.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    user_id: String,
    doc_id: Uuid,
    file_name: String,
    file_size: i64,
    content_type: Option<String>,
    uploaded_at: chrono::DateTime<Utc>,
    last_modified: chrono::DateTime<Utc>,
}

impl From<DocumentRow> for DocumentRecord {
    fn from(row: DocumentRow) -> Self {
        DocumentRecord {
            user_id: row.user_id,
            doc_id: row.doc_id,
            file_name: row.file_name,
            file_size: row.file_size,
            content_type: row.content_type,
            uploaded_at: row.uploaded_at,
            last_modified: row.last_modified,
        }
    }
}

const DOCUMENT_COLUMNS: &str =
    "user_id, doc_id, file_name, file_size, content_type, uploaded_at, last_modified";

#[async_trait]
impl DocumentStore for PgDocumentStore {
    #[tracing::instrument(skip(self, record), fields(db.table = "documents", db.operation = "insert", doc_id = %record.doc_id))]
    async fn create(&self, record: DocumentRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO documents (user_id, doc_id, file_name, file_size, content_type, uploaded_at, last_modified)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&record.user_id)
        .bind(record.doc_id)
        .bind(&record.file_name)
        .bind(record.file_size)
        .bind(&record.content_type)
        .bind(record.uploaded_at)
        .bind(record.last_modified)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select", doc_id = %doc_id))]
    async fn get(&self, user_id: &str, doc_id: Uuid) -> Result<Option<DocumentRecord>, AppError> {
        let row = sqlx::query_as::<Postgres, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE user_id = $1 AND doc_id = $2"
        ))
        .bind(user_id)
        .bind(doc_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DocumentRecord::from))
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select"))]
    async fn list(&self, user_id: &str) -> Result<Vec<DocumentRecord>, AppError> {
        let rows = sqlx::query_as::<Postgres, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE user_id = $1 ORDER BY uploaded_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DocumentRecord::from).collect())
    }

    #[tracing::instrument(skip(self, changes), fields(db.table = "documents", db.operation = "update", doc_id = %doc_id))]
    async fn update(
        &self,
        user_id: &str,
        doc_id: Uuid,
        changes: DocumentUpdate,
    ) -> Result<Option<DocumentRecord>, AppError> {
        let last_modified = changes.last_modified.unwrap_or_else(Utc::now);

        let row = sqlx::query_as::<Postgres, DocumentRow>(&format!(
            r#"
            UPDATE documents
            SET file_name = COALESCE($3, file_name),
                file_size = COALESCE($4, file_size),
                last_modified = $5
            WHERE user_id = $1 AND doc_id = $2
            RETURNING {DOCUMENT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(doc_id)
        .bind(&changes.file_name)
        .bind(changes.file_size)
        .bind(last_modified)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DocumentRecord::from))
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "delete", doc_id = %doc_id))]
    async fn delete(&self, user_id: &str, doc_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE user_id = $1 AND doc_id = $2")
            .bind(user_id)
            .bind(doc_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
