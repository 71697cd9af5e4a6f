use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::database::ports::verifications::{VerificationRecord, VerificationRepository};
use crate::error::{FolioError, Result};

#[derive(Debug, Clone)]
pub struct PostgresVerificationRepository {
    pool: PgPool,
}

impl PostgresVerificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_row(row: &PgRow) -> Result<VerificationRecord> {
        let email: String = row
            .try_get("email")
            .map_err(|e| FolioError::Database(format!("Failed to read verification email: {e}")))?;
        let code_hash: String = row
            .try_get("code_hash")
            .map_err(|e| FolioError::Database(format!("Failed to read verification code hash: {e}")))?;
        let verified: bool = row
            .try_get("verified")
            .map_err(|e| FolioError::Database(format!("Failed to read verified flag: {e}")))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| FolioError::Database(format!("Failed to read created_at: {e}")))?;

        Ok(VerificationRecord {
            email,
            code_hash,
            verified,
            created_at,
        })
    }
}

#[async_trait]
impl VerificationRepository for PostgresVerificationRepository {
    async fn replace(&self, record: VerificationRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO email_verifications (email, code_hash, verified, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
            SET code_hash = EXCLUDED.code_hash,
                verified = EXCLUDED.verified,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(&record.email)
        .bind(&record.code_hash)
        .bind(record.verified)
        .bind(record.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| FolioError::Database(format!("Failed to store verification: {e}")))?;

        Ok(())
    }

    async fn find_pending(
        &self,
        email: &str,
        code_hash: &str,
        not_before: DateTime<Utc>,
    ) -> Result<Option<VerificationRecord>> {
        let row = sqlx::query(
            r#"
            SELECT email, code_hash, verified, created_at
            FROM email_verifications
            WHERE email = $1
              AND code_hash = $2
              AND verified = FALSE
              AND created_at >= $3
            "#,
        )
        .bind(email)
        .bind(code_hash)
        .bind(not_before)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| FolioError::Database(format!("Failed to load verification: {e}")))?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn mark_verified(&self, email: &str) -> Result<()> {
        sqlx::query("UPDATE email_verifications SET verified = TRUE WHERE email = $1")
            .bind(email)
            .execute(self.pool())
            .await
            .map_err(|e| FolioError::Database(format!("Failed to confirm verification: {e}")))?;

        Ok(())
    }

    async fn find_verified(
        &self,
        email: &str,
        not_before: DateTime<Utc>,
    ) -> Result<Option<VerificationRecord>> {
        let row = sqlx::query(
            r#"
            SELECT email, code_hash, verified, created_at
            FROM email_verifications
            WHERE email = $1
              AND verified = TRUE
              AND created_at >= $2
            "#,
        )
        .bind(email)
        .bind(not_before)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| FolioError::Database(format!("Failed to load verification: {e}")))?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn remove(&self, email: &str) -> Result<()> {
        sqlx::query("DELETE FROM email_verifications WHERE email = $1")
            .bind(email)
            .execute(self.pool())
            .await
            .map_err(|e| FolioError::Database(format!("Failed to remove verification: {e}")))?;

        Ok(())
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM email_verifications WHERE created_at < $1")
            .bind(cutoff)
            .execute(self.pool())
            .await
            .map_err(|e| FolioError::Database(format!("Failed to purge verifications: {e}")))?;

        Ok(result.rows_affected())
    }
}
