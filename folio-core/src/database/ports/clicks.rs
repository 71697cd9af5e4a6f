use async_trait::async_trait;
use folio_model::ClickCount;

use crate::error::Result;

#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Add one click for `button_type` and return the new total.
    async fn increment(&self, button_type: &str) -> Result<i64>;

    /// Every counter, highest count first.
    async fn counts(&self) -> Result<Vec<ClickCount>>;
}
