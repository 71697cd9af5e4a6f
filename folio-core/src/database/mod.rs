//! Persistence for projects, email verifications and click counters.
//!
//! Services only see the traits in [`ports`]. Two adapters implement them:
//! [`postgres`] for deployments with a `DATABASE_URL` and [`memory`] for
//! development and tests.

pub mod memory;
pub mod ports;
pub mod postgres;

use std::sync::Arc;

use ports::{ClickRepository, ProjectRepository, VerificationRepository};

/// The repositories a running server needs, behind trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub projects: Arc<dyn ProjectRepository>,
    pub verifications: Arc<dyn VerificationRepository>,
    pub clicks: Arc<dyn ClickRepository>,
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            projects: Arc::new(memory::MemoryProjectRepository::default()),
            verifications: Arc::new(memory::MemoryVerificationRepository::default()),
            clicks: Arc::new(memory::MemoryClickRepository::default()),
        }
    }

    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            projects: Arc::new(postgres::PostgresProjectRepository::new(pool.clone())),
            verifications: Arc::new(postgres::PostgresVerificationRepository::new(
                pool.clone(),
            )),
            clicks: Arc::new(postgres::PostgresClickRepository::new(pool)),
        }
    }
}
