//! Outbound mail.
//!
//! Message bodies are plain text; rendering HTML templates is left to
//! whatever sits behind a [`Mailer`].

use std::fmt;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: String,
}

impl OutgoingMail {
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            reply_to: None,
            subject: subject.into(),
            body: body.into(),
        }
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<()>;
}

/// Writes every message to the log instead of delivering it.
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        info!(
            from = %self.from,
            to = %mail.to,
            reply_to = mail.reply_to.as_deref().unwrap_or(""),
            subject = %mail.subject,
            "mail queued (log transport)"
        );
        Ok(())
    }
}

/// Keeps sent messages in memory so callers can inspect them.
#[derive(Default)]
pub struct MemoryMailer {
    outbox: Mutex<Vec<OutgoingMail>>,
}

impl fmt::Debug for MemoryMailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryMailer").finish_non_exhaustive()
    }
}

impl MemoryMailer {
    pub async fn sent(&self) -> Vec<OutgoingMail> {
        self.outbox.lock().await.clone()
    }

    /// Most recent message addressed to `to`.
    pub async fn last_to(&self, to: &str) -> Option<OutgoingMail> {
        self.outbox
            .lock()
            .await
            .iter()
            .rev()
            .find(|mail| mail.to == to)
            .cloned()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        self.outbox.lock().await.push(mail);
        Ok(())
    }
}
