use std::{fmt, sync::Arc};

use chrono::Utc;
use folio_model::{ImageStructure, Project, ProjectFields, ProjectId};
use tracing::{info, warn};

use crate::database::ports::ProjectRepository;
use crate::error::{FolioError, Result};
use crate::gallery::{GalleryReconciler, GallerySubmission};
use crate::storage::Upload;

const NOT_FOUND: &str = "Project not found";

/// A decoded project form: descriptive fields, the optional raw
/// `imageStructure` JSON and the uploaded `images` parts in arrival order.
#[derive(Debug, Clone, Default)]
pub struct ProjectForm {
    pub fields: ProjectFields,
    pub image_structure: Option<String>,
    pub uploads: Vec<Upload>,
}

impl ProjectForm {
    fn structure(&self) -> Result<Option<ImageStructure>> {
        match self.image_structure.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Ok(Some(ImageStructure::parse(raw)?)),
            _ => Ok(None),
        }
    }
}

#[derive(Clone)]
pub struct ProjectService {
    repository: Arc<dyn ProjectRepository>,
    gallery: GalleryReconciler,
}

impl fmt::Debug for ProjectService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectService")
            .field("gallery", &self.gallery)
            .finish_non_exhaustive()
    }
}

impl ProjectService {
    pub fn new(repository: Arc<dyn ProjectRepository>, gallery: GalleryReconciler) -> Self {
        Self { repository, gallery }
    }

    pub async fn list(&self) -> Result<Vec<Project>> {
        self.repository.list().await
    }

    pub async fn get(&self, id: ProjectId) -> Result<Project> {
        self.repository
            .find(id)
            .await?
            .ok_or_else(|| FolioError::not_found(NOT_FOUND))
    }

    pub async fn create(&self, form: ProjectForm) -> Result<Project> {
        let structure = form.structure()?;
        let new_project = form.fields.into_new_project()?;

        let submission = match structure {
            Some(structure) => GallerySubmission::new(structure, form.uploads),
            None => GallerySubmission::uploads_only(form.uploads),
        };
        let resolved = self.gallery.resolve(submission, &[]).await?;

        let project = new_project.into_project(resolved.images.clone(), Utc::now());
        match self.repository.insert(project).await {
            Ok(project) => {
                info!(id = %project.id, images = project.images.len(), "project created");
                Ok(project)
            }
            Err(err) => {
                self.gallery.discard(&resolved).await;
                Err(err)
            }
        }
    }

    /// Apply a form to an existing project. Without an `imageStructure` the
    /// stored gallery is left as it is.
    pub async fn update(&self, id: ProjectId, form: ProjectForm) -> Result<Project> {
        let structure = form.structure()?;
        let mut project = self.get(id).await?;

        let resolved = match structure {
            Some(structure) => {
                let submission = GallerySubmission::new(structure, form.uploads);
                Some(self.gallery.resolve(submission, &project.images).await?)
            }
            None => {
                if !form.uploads.is_empty() {
                    warn!(
                        %id,
                        ignored = form.uploads.len(),
                        "update carried files without an image structure"
                    );
                }
                None
            }
        };

        form.fields.into_patch().apply(&mut project);
        if let Some(resolved) = &resolved {
            project.images = resolved.images.clone();
        }

        let saved = match self.repository.save(project).await {
            Ok(saved) => saved,
            Err(err) => {
                if let Some(resolved) = &resolved {
                    self.gallery.discard(resolved).await;
                }
                return Err(err);
            }
        };

        if let Some(resolved) = &resolved {
            self.gallery.prune(resolved).await;
        }
        info!(%id, images = saved.images.len(), "project updated");
        Ok(saved)
    }

    /// Remove a project and, best-effort, its locally stored images.
    pub async fn delete(&self, id: ProjectId) -> Result<Project> {
        let project = self
            .repository
            .delete(id)
            .await?
            .ok_or_else(|| FolioError::not_found(NOT_FOUND))?;

        let report = self.gallery.remove_all(&project.images).await;
        info!(
            %id,
            removed = report.deleted.len(),
            failed = report.warnings.len(),
            "project deleted"
        );
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::database::memory::MemoryProjectRepository;
    use crate::storage::ContentStore;

    const PREFIX: &str = "http://localhost:5000/uploads/";
    const PNG: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[derive(Default)]
    struct RecordingStore {
        puts: Mutex<usize>,
        deletes: Mutex<Vec<String>>,
        /// 1-based put call that fails.
        failing_put: Option<usize>,
    }

    #[async_trait]
    impl ContentStore for RecordingStore {
        async fn put(&self, upload: &Upload, folder: &str) -> Result<String> {
            let mut puts = self.puts.lock().unwrap();
            *puts += 1;
            if self.failing_put == Some(*puts) {
                return Err(FolioError::Storage("disk full".into()));
            }
            Ok(format!(
                "{PREFIX}{folder}/{}-{}",
                *puts,
                upload.file_name.as_deref().unwrap_or("file")
            ))
        }

        async fn delete(&self, url: &str) -> Result<()> {
            self.deletes.lock().unwrap().push(url.to_string());
            Ok(())
        }

        fn owns(&self, url: &str) -> bool {
            url.starts_with(PREFIX)
        }
    }

    /// Accepts inserts but fails every save.
    #[derive(Default)]
    struct BrokenSaves(MemoryProjectRepository);

    #[async_trait]
    impl ProjectRepository for BrokenSaves {
        async fn list(&self) -> Result<Vec<Project>> {
            self.0.list().await
        }
        async fn find(&self, id: ProjectId) -> Result<Option<Project>> {
            self.0.find(id).await
        }
        async fn insert(&self, project: Project) -> Result<Project> {
            self.0.insert(project).await
        }
        async fn save(&self, _project: Project) -> Result<Project> {
            Err(FolioError::Database("connection reset".into()))
        }
        async fn delete(&self, id: ProjectId) -> Result<Option<Project>> {
            self.0.delete(id).await
        }
    }

    fn service_with(
        repository: Arc<dyn ProjectRepository>,
    ) -> (ProjectService, Arc<RecordingStore>) {
        let store = Arc::new(RecordingStore::default());
        let service = ProjectService::new(repository, GalleryReconciler::new(store.clone()));
        (service, store)
    }

    fn service() -> (ProjectService, Arc<RecordingStore>) {
        service_with(Arc::new(MemoryProjectRepository::default()))
    }

    fn form(title: &str, structure: Option<&str>, files: &[&str]) -> ProjectForm {
        let mut fields = ProjectFields::default();
        fields.set("title", title.to_string());
        fields.set("category", "Web".to_string());
        ProjectForm {
            fields,
            image_structure: structure.map(str::to_string),
            uploads: files
                .iter()
                .map(|name| Upload::new(PNG.to_vec()).with_file_name(*name))
                .collect(),
        }
    }

    #[tokio::test]
    async fn create_without_structure_uses_uploads_in_order() {
        let (service, _) = service();

        let project = service
            .create(form("Landing page", None, &["a.png", "b.png"]))
            .await
            .unwrap();

        assert_eq!(
            project.images,
            vec![
                format!("{PREFIX}projects/1-a.png"),
                format!("{PREFIX}projects/2-b.png")
            ]
        );
        assert_eq!(service.get(project.id).await.unwrap(), project);
    }

    #[tokio::test]
    async fn create_requires_title_and_an_image() {
        let (service, store) = service();

        let err = service.create(form("  ", None, &["a.png"])).await.unwrap_err();
        assert_eq!(err.to_string(), "title is required");

        let err = service.create(form("Shop", None, &[])).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(*store.puts.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn malformed_structure_is_rejected_before_lookup() {
        let (service, store) = service();

        let err = service
            .update(ProjectId::new(), form("x", Some("{not json"), &["a.png"]))
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(*store.puts.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn update_reorders_and_prunes_dropped_images() {
        let (service, store) = service();
        let created = service
            .create(form("Shop", None, &["a.png", "b.png"]))
            .await
            .unwrap();
        let (a, b) = (created.images[0].clone(), created.images[1].clone());

        let structure = format!(r#"[{{"type":"file"}},{{"type":"url","value":"{a}"}}]"#);
        let updated = service
            .update(created.id, form("Shop v2", Some(&structure), &["c.png"]))
            .await
            .unwrap();

        assert_eq!(updated.title, "Shop v2");
        assert_eq!(updated.images, vec![format!("{PREFIX}projects/3-c.png"), a]);
        assert_eq!(*store.deletes.lock().unwrap(), vec![b]);
    }

    #[tokio::test]
    async fn update_without_structure_keeps_images() {
        let (service, store) = service();
        let created = service.create(form("Shop", None, &["a.png"])).await.unwrap();

        let updated = service
            .update(created.id, form("Renamed", None, &["ignored.png"]))
            .await
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.images, created.images);
        assert_eq!(*store.puts.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_project_is_not_found() {
        let (service, _) = service();
        let id = ProjectId::new();

        assert!(matches!(service.get(id).await, Err(FolioError::NotFound(_))));
        assert!(matches!(
            service.update(id, form("x", None, &[])).await,
            Err(FolioError::NotFound(_))
        ));
        assert!(matches!(service.delete(id).await, Err(FolioError::NotFound(_))));
    }

    #[tokio::test]
    async fn failed_save_rolls_back_new_uploads_and_keeps_old_images() {
        let (service, store) = service_with(Arc::new(BrokenSaves::default()));
        let created = service.create(form("Shop", None, &["a.png"])).await.unwrap();

        let err = service
            .update(created.id, form("Shop", Some(r#"[{"type":"file"}]"#), &["b.png"]))
            .await
            .unwrap_err();

        assert!(matches!(err, FolioError::Database(_)));
        // only the new upload is removed; the stored image survives
        assert_eq!(
            *store.deletes.lock().unwrap(),
            vec![format!("{PREFIX}projects/2-b.png")]
        );
        assert_eq!(service.get(created.id).await.unwrap().images, created.images);
    }

    #[tokio::test]
    async fn failed_upload_leaves_record_and_old_images_alone() {
        let repository = Arc::new(MemoryProjectRepository::default());
        let healthy = ProjectService::new(
            repository.clone(),
            GalleryReconciler::new(Arc::new(RecordingStore::default())),
        );
        let created = healthy
            .create(form("Shop", None, &["old.png"]))
            .await
            .unwrap();
        let old = created.images[0].clone();

        let store = Arc::new(RecordingStore {
            failing_put: Some(2),
            ..RecordingStore::default()
        });
        let service = ProjectService::new(repository, GalleryReconciler::new(store.clone()));

        let structure = r#"[{"type":"file"},{"type":"file"},{"type":"file"}]"#;
        let err = service
            .update(
                created.id,
                form("Shop v2", Some(structure), &["a.png", "b.png", "c.png"]),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, FolioError::Upload(_)));
        let stored = service.get(created.id).await.unwrap();
        assert_eq!(stored.images, created.images);
        assert_eq!(stored.title, "Shop");

        let deletes = store.deletes.lock().unwrap().clone();
        assert!(!deletes.contains(&old));
        // the uploads that did land are cleaned up again
        assert_eq!(deletes.len(), 2);
    }

    #[tokio::test]
    async fn delete_removes_local_images_only() {
        let (service, store) = service();
        let structure = r#"[{"type":"url","value":"https://cdn.example.com/x.png"},{"type":"file"}]"#;
        let created = service
            .create(form("Shop", Some(structure), &["a.png"]))
            .await
            .unwrap();

        service.delete(created.id).await.unwrap();

        assert_eq!(
            *store.deletes.lock().unwrap(),
            vec![format!("{PREFIX}projects/1-a.png")]
        );
        assert!(service.list().await.unwrap().is_empty());
    }
}
