use async_trait::async_trait;
use chrono::{DateTime, Utc};
use librecloud_core::models::{Identity, PairingRecord, PairingStatus};
use librecloud_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::traits::PairingStore;

/// Postgres-backed pairing store.
///
/// `mark_ready` and `consume` are conditional UPDATEs on the stored status,
/// so the forward-only transition discipline holds under concurrent writers:
/// the row's per-key atomicity decides the race and exactly one caller sees
/// `rows_affected == 1`.
#[derive(Clone)]
pub struct PgPairingStore {
    pool: PgPool,
}

impl PgPairingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PairingRow {
    nonce: Uuid,
    status: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    ready_at: Option<DateTime<Utc>>,
    consumed_at: Option<DateTime<Utc>>,
    user_id: Option<String>,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    client_ip: Option<String>,
}

impl TryFrom<PairingRow> for PairingRecord {
    type Error = AppError;

    fn try_from(row: PairingRow) -> Result<Self, AppError> {
        let status = PairingStatus::parse(&row.status).ok_or_else(|| {
            AppError::Internal(format!("Unknown pairing status in store: {}", row.status))
        })?;
        let user = row.user_id.map(|user_id| Identity {
            user_id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
        });
        Ok(PairingRecord {
            nonce: row.nonce,
            status,
            expires_at: row.expires_at,
            created_at: row.created_at,
            ready_at: row.ready_at,
            consumed_at: row.consumed_at,
            user,
            client_ip: row.client_ip,
        })
    }
}

#[async_trait]
impl PairingStore for PgPairingStore {
    #[tracing::instrument(skip(self, record), fields(db.table = "pairing_logins", db.operation = "insert", nonce = %record.nonce))]
    async fn put(&self, record: PairingRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO pairing_logins (nonce, status, expires_at, created_at, client_ip)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.nonce)
        .bind(record.status.as_str())
        .bind(record.expires_at)
        .bind(record.created_at)
        .bind(&record.client_ip)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "pairing_logins", db.operation = "select", nonce = %nonce))]
    async fn get(&self, nonce: Uuid) -> Result<Option<PairingRecord>, AppError> {
        let row = sqlx::query_as::<Postgres, PairingRow>(
            r#"
            SELECT nonce, status, expires_at, created_at, ready_at, consumed_at,
                   user_id, email, first_name, last_name, client_ip
            FROM pairing_logins WHERE nonce = $1
            "#,
        )
        .bind(nonce)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PairingRecord::try_from).transpose()
    }

    #[tracing::instrument(skip(self, identity), fields(db.table = "pairing_logins", db.operation = "update", nonce = %nonce))]
    async fn mark_ready(
        &self,
        nonce: Uuid,
        identity: Identity,
        ready_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE pairing_logins
            SET status = 'ready', ready_at = $2,
                user_id = $3, email = $4, first_name = $5, last_name = $6
            WHERE nonce = $1 AND status = 'pending'
            "#,
        )
        .bind(nonce)
        .bind(ready_at)
        .bind(&identity.user_id)
        .bind(&identity.email)
        .bind(&identity.first_name)
        .bind(&identity.last_name)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip(self), fields(db.table = "pairing_logins", db.operation = "update", nonce = %nonce))]
    async fn consume(&self, nonce: Uuid, consumed_at: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE pairing_logins
            SET status = 'consumed', consumed_at = $2
            WHERE nonce = $1 AND status = 'ready'
            "#,
        )
        .bind(nonce)
        .bind(consumed_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
