use std::{fmt, sync::Arc};

use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::normalize_email;
use crate::database::ports::{VerificationRecord, VerificationRepository};
use crate::error::{FolioError, Result};
use crate::mail::{Mailer, OutgoingMail};

const DEFAULT_CODE_TTL_MINUTES: i64 = 10;

static GMAIL_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@gmail\.com$").expect("gmail regex should compile")
});

/// Issues and checks the 6-digit codes that gate the contact form.
#[derive(Clone)]
pub struct VerificationService {
    repository: Arc<dyn VerificationRepository>,
    mailer: Arc<dyn Mailer>,
    code_ttl: Duration,
}

impl fmt::Debug for VerificationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationService")
            .field("code_ttl", &self.code_ttl)
            .finish_non_exhaustive()
    }
}

impl VerificationService {
    pub fn new(repository: Arc<dyn VerificationRepository>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            repository,
            mailer,
            code_ttl: Duration::minutes(DEFAULT_CODE_TTL_MINUTES),
        }
    }

    pub fn with_code_ttl(mut self, ttl: Duration) -> Self {
        self.code_ttl = ttl;
        self
    }

    pub fn code_ttl(&self) -> Duration {
        self.code_ttl
    }

    /// Replace any earlier code for `email` with a fresh one and mail it.
    pub async fn send_code(&self, email: &str) -> Result<()> {
        let email = normalize_email(email);
        if !GMAIL_ADDRESS.is_match(&email) {
            return Err(FolioError::validation(
                "Invalid Gmail address. Please enter a valid @gmail.com email address.",
            ));
        }

        let code = generate_code();
        self.repository
            .replace(VerificationRecord {
                email: email.clone(),
                code_hash: hash_code(&code),
                verified: false,
                created_at: Utc::now(),
            })
            .await?;

        let body = format!(
            "Hello,\n\nUse the code below to verify your email address and \
             submit your message:\n\n    {code}\n\nThe code expires in {} minutes. \
             If you didn't request this verification, please ignore this email.\n",
            self.code_ttl.num_minutes()
        );
        self.mailer
            .send(OutgoingMail::new(&email, "Verify Your Email", body))
            .await
            .map_err(|err| match err {
                FolioError::Mail(_) => err,
                other => FolioError::Mail(other.to_string()),
            })?;

        debug!(email = %email, "verification code issued");
        Ok(())
    }

    pub async fn confirm(&self, email: &str, code: &str) -> Result<()> {
        let email = normalize_email(email);
        let code = code.trim();
        let invalid = || {
            FolioError::validation("Invalid verification code. Please check and try again.")
        };
        if email.is_empty() || code.is_empty() {
            return Err(invalid());
        }

        let not_before = Utc::now() - self.code_ttl;
        self.repository
            .find_pending(&email, &hash_code(code), not_before)
            .await?
            .ok_or_else(invalid)?;

        self.repository.mark_verified(&email).await?;
        info!(email = %email, "email verified");
        Ok(())
    }

    /// Whether `email` holds a confirmed, unexpired verification.
    pub async fn is_verified(&self, email: &str) -> Result<bool> {
        let not_before = Utc::now() - self.code_ttl;
        Ok(self
            .repository
            .find_verified(&normalize_email(email), not_before)
            .await?
            .is_some())
    }

    /// Drop the verification of `email` once it has been used.
    pub async fn consume(&self, email: &str) -> Result<()> {
        self.repository.remove(&normalize_email(email)).await
    }

    pub async fn purge_expired(&self) -> Result<u64> {
        self.repository.purge_expired(Utc::now() - self.code_ttl).await
    }
}

fn generate_code() -> String {
    rand::rng().random_range(100_000..=999_999).to_string()
}

fn hash_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}
