use async_trait::async_trait;
use folio_model::{Project, ProjectId};

use crate::error::Result;

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// All projects, newest first.
    async fn list(&self) -> Result<Vec<Project>>;

    async fn find(&self, id: ProjectId) -> Result<Option<Project>>;

    async fn insert(&self, project: Project) -> Result<Project>;

    /// Overwrite an existing project. Fails with `NotFound` when the id is
    /// unknown.
    async fn save(&self, project: Project) -> Result<Project>;

    /// Remove a project, returning the removed record if there was one.
    async fn delete(&self, id: ProjectId) -> Result<Option<Project>>;
}
