//! In-process repositories for development and tests. Nothing survives a
//! restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_model::{ClickCount, Project, ProjectId};
use tokio::sync::RwLock;

use super::ports::{
    ClickRepository, ProjectRepository, VerificationRecord, VerificationRepository,
};
use crate::error::{FolioError, Result};

#[derive(Debug, Default)]
pub struct MemoryProjectRepository {
    projects: RwLock<HashMap<ProjectId, Project>>,
}

#[async_trait]
impl ProjectRepository for MemoryProjectRepository {
    async fn list(&self) -> Result<Vec<Project>> {
        let mut projects: Vec<Project> =
            self.projects.read().await.values().cloned().collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn find(&self, id: ProjectId) -> Result<Option<Project>> {
        Ok(self.projects.read().await.get(&id).cloned())
    }

    async fn insert(&self, project: Project) -> Result<Project> {
        let mut guard = self.projects.write().await;
        if guard.contains_key(&project.id) {
            return Err(FolioError::Database(format!(
                "project {} already exists",
                project.id
            )));
        }
        guard.insert(project.id, project.clone());
        Ok(project)
    }

    async fn save(&self, project: Project) -> Result<Project> {
        let mut guard = self.projects.write().await;
        match guard.get_mut(&project.id) {
            Some(slot) => {
                *slot = project.clone();
                Ok(project)
            }
            None => Err(FolioError::not_found("Project not found")),
        }
    }

    async fn delete(&self, id: ProjectId) -> Result<Option<Project>> {
        Ok(self.projects.write().await.remove(&id))
    }
}

#[derive(Debug, Default)]
pub struct MemoryVerificationRepository {
    records: RwLock<HashMap<String, VerificationRecord>>,
}

#[async_trait]
impl VerificationRepository for MemoryVerificationRepository {
    async fn replace(&self, record: VerificationRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.email.clone(), record);
        Ok(())
    }

    async fn find_pending(
        &self,
        email: &str,
        code_hash: &str,
        not_before: DateTime<Utc>,
    ) -> Result<Option<VerificationRecord>> {
        Ok(self
            .records
            .read()
            .await
            .get(email)
            .filter(|r| !r.verified && r.code_hash == code_hash && r.created_at >= not_before)
            .cloned())
    }

    async fn mark_verified(&self, email: &str) -> Result<()> {
        if let Some(record) = self.records.write().await.get_mut(email) {
            record.verified = true;
        }
        Ok(())
    }

    async fn find_verified(
        &self,
        email: &str,
        not_before: DateTime<Utc>,
    ) -> Result<Option<VerificationRecord>> {
        Ok(self
            .records
            .read()
            .await
            .get(email)
            .filter(|r| r.verified && r.created_at >= not_before)
            .cloned())
    }

    async fn remove(&self, email: &str) -> Result<()> {
        self.records.write().await.remove(email);
        Ok(())
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut guard = self.records.write().await;
        let before = guard.len();
        guard.retain(|_, r| r.created_at >= cutoff);
        Ok((before - guard.len()) as u64)
    }
}

#[derive(Debug, Default)]
pub struct MemoryClickRepository {
    counters: RwLock<HashMap<String, i64>>,
}

#[async_trait]
impl ClickRepository for MemoryClickRepository {
    async fn increment(&self, button_type: &str) -> Result<i64> {
        let mut guard = self.counters.write().await;
        let count = guard.entry(button_type.to_string()).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    async fn counts(&self) -> Result<Vec<ClickCount>> {
        let mut counts: Vec<ClickCount> = self
            .counters
            .read()
            .await
            .iter()
            .map(|(button_type, count)| ClickCount {
                button_type: button_type.clone(),
                count: *count,
            })
            .collect();
        counts.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.button_type.cmp(&b.button_type))
        });
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use folio_model::ProjectFields;

    use super::*;

    fn project(title: &str, created_at: DateTime<Utc>) -> Project {
        let fields = ProjectFields {
            title: Some(title.to_string()),
            category: Some("Web".to_string()),
            ..Default::default()
        };
        fields
            .into_new_project()
            .unwrap()
            .into_project(vec![], created_at)
    }

    #[tokio::test]
    async fn lists_projects_newest_first() {
        let repo = MemoryProjectRepository::default();
        let now = Utc::now();
        repo.insert(project("old", now - Duration::days(2))).await.unwrap();
        repo.insert(project("new", now)).await.unwrap();
        repo.insert(project("mid", now - Duration::days(1))).await.unwrap();

        let titles: Vec<String> =
            repo.list().await.unwrap().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn save_requires_existing_project() {
        let repo = MemoryProjectRepository::default();
        let err = repo.save(project("ghost", Utc::now())).await.unwrap_err();
        assert!(matches!(err, FolioError::NotFound(_)));
    }

    #[tokio::test]
    async fn verification_lookups_respect_state_and_age() {
        let repo = MemoryVerificationRepository::default();
        let now = Utc::now();
        repo.replace(VerificationRecord {
            email: "a@gmail.com".into(),
            code_hash: "h1".into(),
            verified: false,
            created_at: now,
        })
        .await
        .unwrap();

        assert!(repo.find_pending("a@gmail.com", "h2", now).await.unwrap().is_none());
        assert!(
            repo.find_pending("a@gmail.com", "h1", now + Duration::seconds(1))
                .await
                .unwrap()
                .is_none()
        );
        assert!(repo.find_pending("a@gmail.com", "h1", now).await.unwrap().is_some());

        repo.mark_verified("a@gmail.com").await.unwrap();
        assert!(repo.find_pending("a@gmail.com", "h1", now).await.unwrap().is_none());
        assert!(repo.find_verified("a@gmail.com", now).await.unwrap().is_some());

        assert_eq!(repo.purge_expired(now + Duration::seconds(1)).await.unwrap(), 1);
        assert!(repo.find_verified("a@gmail.com", now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn click_counts_accumulate() {
        let repo = MemoryClickRepository::default();
        assert_eq!(repo.increment("whatsapp").await.unwrap(), 1);
        assert_eq!(repo.increment("whatsapp").await.unwrap(), 2);
        assert_eq!(repo.increment("call").await.unwrap(), 1);

        assert_eq!(
            repo.counts().await.unwrap(),
            vec![
                ClickCount { button_type: "whatsapp".into(), count: 2 },
                ClickCount { button_type: "call".into(), count: 1 },
            ]
        );
    }
}
