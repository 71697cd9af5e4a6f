use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_model::{Project, ProjectId};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::database::ports::projects::ProjectRepository;
use crate::error::{FolioError, Result};

const COLUMNS: &str = "id, title, subtitle, category, description, images, tags, \
     gradient, client, timeline, role, uploaded_by, challenges, solutions, created_at";

#[derive(Debug, Clone)]
pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_row(row: &PgRow) -> Result<Project> {
        let read = |column: &str, e: sqlx::Error| {
            FolioError::Database(format!("Failed to read project {column}: {e}"))
        };

        let id: Uuid = row.try_get("id").map_err(|e| read("id", e))?;
        let created_at: DateTime<Utc> =
            row.try_get("created_at").map_err(|e| read("created_at", e))?;

        Ok(Project {
            id: ProjectId::from(id),
            title: row.try_get("title").map_err(|e| read("title", e))?,
            subtitle: row.try_get("subtitle").map_err(|e| read("subtitle", e))?,
            category: row.try_get("category").map_err(|e| read("category", e))?,
            description: row
                .try_get("description")
                .map_err(|e| read("description", e))?,
            images: row.try_get("images").map_err(|e| read("images", e))?,
            tags: row.try_get("tags").map_err(|e| read("tags", e))?,
            gradient: row.try_get("gradient").map_err(|e| read("gradient", e))?,
            client: row.try_get("client").map_err(|e| read("client", e))?,
            timeline: row.try_get("timeline").map_err(|e| read("timeline", e))?,
            role: row.try_get("role").map_err(|e| read("role", e))?,
            uploaded_by: row
                .try_get("uploaded_by")
                .map_err(|e| read("uploaded_by", e))?,
            challenges: row
                .try_get("challenges")
                .map_err(|e| read("challenges", e))?,
            solutions: row.try_get("solutions").map_err(|e| read("solutions", e))?,
            created_at,
        })
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn list(&self) -> Result<Vec<Project>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM projects ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(|e| FolioError::Database(format!("Failed to list projects: {e}")))?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn find(&self, id: ProjectId) -> Result<Option<Project>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM projects WHERE id = $1"))
            .bind(id.to_uuid())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| FolioError::Database(format!("Failed to load project {id}: {e}")))?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn insert(&self, project: Project) -> Result<Project> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO projects (
                id, title, subtitle, category, description, images, tags,
                gradient, client, timeline, role, uploaded_by, challenges,
                solutions, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(project.id.to_uuid())
        .bind(&project.title)
        .bind(&project.subtitle)
        .bind(&project.category)
        .bind(&project.description)
        .bind(&project.images)
        .bind(&project.tags)
        .bind(&project.gradient)
        .bind(&project.client)
        .bind(&project.timeline)
        .bind(&project.role)
        .bind(&project.uploaded_by)
        .bind(&project.challenges)
        .bind(&project.solutions)
        .bind(project.created_at)
        .fetch_one(self.pool())
        .await
        .map_err(|e| FolioError::Database(format!("Failed to create project: {e}")))?;

        Self::map_row(&row)
    }

    async fn save(&self, project: Project) -> Result<Project> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE projects
            SET title = $2,
                subtitle = $3,
                category = $4,
                description = $5,
                images = $6,
                tags = $7,
                gradient = $8,
                client = $9,
                timeline = $10,
                role = $11,
                uploaded_by = $12,
                challenges = $13,
                solutions = $14
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(project.id.to_uuid())
        .bind(&project.title)
        .bind(&project.subtitle)
        .bind(&project.category)
        .bind(&project.description)
        .bind(&project.images)
        .bind(&project.tags)
        .bind(&project.gradient)
        .bind(&project.client)
        .bind(&project.timeline)
        .bind(&project.role)
        .bind(&project.uploaded_by)
        .bind(&project.challenges)
        .bind(&project.solutions)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            FolioError::Database(format!("Failed to update project {}: {e}", project.id))
        })?;

        match row {
            Some(row) => Self::map_row(&row),
            None => Err(FolioError::not_found("Project not found")),
        }
    }

    async fn delete(&self, id: ProjectId) -> Result<Option<Project>> {
        let row = sqlx::query(&format!(
            "DELETE FROM projects WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id.to_uuid())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| FolioError::Database(format!("Failed to delete project {id}: {e}")))?;

        row.as_ref().map(Self::map_row).transpose()
    }
}
