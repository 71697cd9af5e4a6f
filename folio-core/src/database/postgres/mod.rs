//! PostgreSQL adapters for the repository ports.

mod clicks;
mod projects;
mod verifications;

pub use clicks::PostgresClickRepository;
pub use projects::PostgresProjectRepository;
pub use verifications::PostgresVerificationRepository;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::error::{FolioError, Result};

/// Open a pool against `database_url`.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|e| FolioError::Database(format!("Failed to connect to database: {e}")))
}

/// Apply the embedded migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    crate::MIGRATOR
        .run(pool)
        .await
        .map_err(|e| FolioError::Database(format!("Failed to run migrations: {e}")))
}
