use std::{fmt, sync::Arc};

use folio_model::ClickCount;
use tracing::debug;

use crate::database::ports::ClickRepository;
use crate::error::{FolioError, Result};

const MAX_BUTTON_TYPE_LEN: usize = 64;

#[derive(Clone)]
pub struct AnalyticsService {
    repository: Arc<dyn ClickRepository>,
}

impl fmt::Debug for AnalyticsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyticsService").finish_non_exhaustive()
    }
}

impl AnalyticsService {
    pub fn new(repository: Arc<dyn ClickRepository>) -> Self {
        Self { repository }
    }

    pub async fn record(&self, button_type: &str) -> Result<ClickCount> {
        let button_type = button_type.trim();
        if button_type.is_empty() {
            return Err(FolioError::validation("buttonType is required"));
        }
        if button_type.chars().count() > MAX_BUTTON_TYPE_LEN {
            return Err(FolioError::validation(format!(
                "buttonType must be at most {MAX_BUTTON_TYPE_LEN} characters"
            )));
        }

        let count = self.repository.increment(button_type).await?;
        debug!(button_type, count, "click recorded");
        Ok(ClickCount {
            button_type: button_type.to_string(),
            count,
        })
    }

    pub async fn counts(&self) -> Result<Vec<ClickCount>> {
        self.repository.counts().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryClickRepository;

    #[tokio::test]
    async fn records_trimmed_button_types() {
        let analytics = AnalyticsService::new(Arc::new(MemoryClickRepository::default()));

        analytics.record(" whatsapp ").await.unwrap();
        let second = analytics.record("whatsapp").await.unwrap();

        assert_eq!(second.count, 2);
        assert_eq!(analytics.counts().await.unwrap(), vec![second]);
    }

    #[tokio::test]
    async fn rejects_blank_and_oversized_button_types() {
        let analytics = AnalyticsService::new(Arc::new(MemoryClickRepository::default()));

        assert!(analytics.record("  ").await.unwrap_err().is_validation());
        assert!(analytics.record(&"x".repeat(65)).await.unwrap_err().is_validation());
        assert!(analytics.counts().await.unwrap().is_empty());
    }
}
