use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// A pending or confirmed email verification. At most one per address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRecord {
    pub email: String,
    /// Hex-encoded SHA-256 of the issued code.
    pub code_hash: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait VerificationRepository: Send + Sync {
    /// Store a fresh record for `record.email`, dropping any previous one.
    async fn replace(&self, record: VerificationRecord) -> Result<()>;

    /// Unverified record matching email and code hash, created at or after
    /// `not_before`.
    async fn find_pending(
        &self,
        email: &str,
        code_hash: &str,
        not_before: DateTime<Utc>,
    ) -> Result<Option<VerificationRecord>>;

    async fn mark_verified(&self, email: &str) -> Result<()>;

    /// Verified record for `email` created at or after `not_before`.
    async fn find_verified(
        &self,
        email: &str,
        not_before: DateTime<Utc>,
    ) -> Result<Option<VerificationRecord>>;

    async fn remove(&self, email: &str) -> Result<()>;

    /// Drop every record created before `cutoff`, returning how many went.
    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}
