use async_trait::async_trait;
use folio_model::ClickCount;
use sqlx::{PgPool, Row};

use crate::database::ports::clicks::ClickRepository;
use crate::error::{FolioError, Result};

#[derive(Debug, Clone)]
pub struct PostgresClickRepository {
    pool: PgPool,
}

impl PostgresClickRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ClickRepository for PostgresClickRepository {
    async fn increment(&self, button_type: &str) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO click_counters (button_type, count, updated_at)
            VALUES ($1, 1, NOW())
            ON CONFLICT (button_type) DO UPDATE
            SET count = click_counters.count + 1,
                updated_at = NOW()
            RETURNING count
            "#,
        )
        .bind(button_type)
        .fetch_one(self.pool())
        .await
        .map_err(|e| FolioError::Database(format!("Failed to record click: {e}")))?;

        row.try_get("count")
            .map_err(|e| FolioError::Database(format!("Failed to read click count: {e}")))
    }

    async fn counts(&self) -> Result<Vec<ClickCount>> {
        let rows = sqlx::query(
            "SELECT button_type, count FROM click_counters ORDER BY count DESC, button_type",
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| FolioError::Database(format!("Failed to load click counts: {e}")))?;

        rows.iter()
            .map(|row| {
                Ok(ClickCount {
                    button_type: row.try_get("button_type").map_err(|e| {
                        FolioError::Database(format!("Failed to read button type: {e}"))
                    })?,
                    count: row.try_get("count").map_err(|e| {
                        FolioError::Database(format!("Failed to read click count: {e}"))
                    })?,
                })
            })
            .collect()
    }
}
