use std::{collections::HashSet, fmt, sync::Arc, time::Duration};

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use folio_model::GalleryEntry;

use super::{DeleteWarning, GallerySubmission, PruneReport, ResolvedGallery};
use crate::error::{FolioError, Result};
use crate::storage::{ContentStore, Upload};

/// Folder hint used for project gallery objects.
pub const PROJECT_FOLDER: &str = "projects";

const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);
const EMPTY_GALLERY: &str = "at least one image is required";

enum Slot {
    Keep(String),
    /// Index into the paired uploads of the plan.
    Pending(usize),
}

struct Plan {
    slots: Vec<Slot>,
    uploads: Vec<Upload>,
}

/// Merges retained URLs and new uploads into a project's image list.
#[derive(Clone)]
pub struct GalleryReconciler {
    store: Arc<dyn ContentStore>,
    upload_timeout: Duration,
}

impl fmt::Debug for GalleryReconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GalleryReconciler")
            .field("upload_timeout", &self.upload_timeout)
            .finish_non_exhaustive()
    }
}

impl GalleryReconciler {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }

    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    /// Validate a submission and store its new files.
    ///
    /// `previous` is the image list currently persisted for the project
    /// (empty on create). Nothing is deleted here; orphans are only
    /// reported so the caller can [`prune`](Self::prune) them once the
    /// record is saved.
    pub async fn resolve(
        &self,
        submission: GallerySubmission,
        previous: &[String],
    ) -> Result<ResolvedGallery> {
        let plan = self.plan(submission)?;
        let uploaded = self.upload_all(&plan.uploads).await?;

        let images: Vec<String> = plan
            .slots
            .into_iter()
            .map(|slot| match slot {
                Slot::Keep(url) => url,
                Slot::Pending(index) => uploaded[index].clone(),
            })
            .collect();

        let orphans = self.orphans(previous, &images);

        debug!(
            images = images.len(),
            uploaded = uploaded.len(),
            orphans = orphans.len(),
            "gallery resolved"
        );

        Ok(ResolvedGallery {
            images,
            uploaded,
            orphans,
        })
    }

    /// Delete the orphans of a resolved gallery. Failures are collected as
    /// warnings.
    pub async fn prune(&self, resolved: &ResolvedGallery) -> PruneReport {
        let report = self.delete_each(&resolved.orphans).await;
        if report.attempted() > 0 {
            info!(
                deleted = report.deleted.len(),
                failed = report.warnings.len(),
                "pruned orphaned gallery images"
            );
        }
        report
    }

    /// Roll back the uploads of a resolved gallery whose record could not
    /// be persisted.
    pub async fn discard(&self, resolved: &ResolvedGallery) -> PruneReport {
        let report = self.delete_each(&resolved.uploaded).await;
        for warning in &report.warnings {
            error!(
                url = %warning.url,
                reason = %warning.reason,
                "leaked upload of an unsaved gallery"
            );
        }
        report
    }

    /// Delete every locally owned image of a removed project.
    pub async fn remove_all(&self, images: &[String]) -> PruneReport {
        let owned = self.orphans(images, &[]);
        self.delete_each(&owned).await
    }

    fn plan(&self, submission: GallerySubmission) -> Result<Plan> {
        let GallerySubmission { structure, uploads } = submission;

        if structure.is_empty() {
            return Err(FolioError::validation(EMPTY_GALLERY));
        }

        let mut remaining = uploads.into_iter();
        let mut paired = Vec::with_capacity(structure.file_slots());
        let mut slots = Vec::with_capacity(structure.len());

        for (position, entry) in structure.entries().iter().enumerate() {
            match entry {
                GalleryEntry::Url(url) => slots.push(Slot::Keep(url.clone())),
                GalleryEntry::File => match remaining.next() {
                    Some(upload) => {
                        upload.image_format()?;
                        slots.push(Slot::Pending(paired.len()));
                        paired.push(upload);
                    }
                    None => {
                        warn!(position, "file slot has no matching upload; dropping it")
                    }
                },
            }
        }

        let surplus = remaining.count();
        if surplus > 0 {
            warn!(surplus, "uploads without a file slot were ignored");
        }

        if slots.is_empty() {
            return Err(FolioError::validation(EMPTY_GALLERY));
        }

        Ok(Plan {
            slots,
            uploads: paired,
        })
    }

    async fn upload_all(&self, uploads: &[Upload]) -> Result<Vec<String>> {
        if uploads.is_empty() {
            return Ok(Vec::new());
        }

        // join_all yields results in input order, not completion order.
        let results = join_all(
            uploads
                .iter()
                .enumerate()
                .map(|(index, upload)| self.upload_one(index, upload)),
        )
        .await;

        let mut stored = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(url) => stored.push(url),
                Err(err) => {
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }

        if let Some(err) = first_error {
            warn!(
                error = %err,
                stored = stored.len(),
                "gallery upload failed; removing objects stored by this request"
            );
            let cleanup = self.delete_each(&stored).await;
            for warning in &cleanup.warnings {
                error!(
                    url = %warning.url,
                    reason = %warning.reason,
                    "leaked upload after failed reconciliation"
                );
            }
            return Err(err);
        }

        Ok(stored)
    }

    async fn upload_one(&self, index: usize, upload: &Upload) -> Result<String> {
        let attempt = self.store.put(upload, PROJECT_FOLDER);
        match tokio::time::timeout(self.upload_timeout, attempt).await {
            Ok(Ok(url)) => {
                debug!(index, url = %url, "upload stored");
                Ok(url)
            }
            Ok(Err(FolioError::Upload(message))) => Err(FolioError::Upload(message)),
            Ok(Err(err)) => Err(FolioError::Upload(format!(
                "'{}': {err}",
                upload.display_name()
            ))),
            Err(_) => Err(FolioError::Upload(format!(
                "'{}' timed out after {:?}",
                upload.display_name(),
                self.upload_timeout
            ))),
        }
    }

    /// Locally owned URLs of `previous` missing from `current`, first
    /// occurrence only.
    fn orphans(&self, previous: &[String], current: &[String]) -> Vec<String> {
        let keep: HashSet<&str> = current.iter().map(String::as_str).collect();
        let mut orphans: Vec<String> = Vec::new();

        for url in previous {
            if keep.contains(url.as_str()) || orphans.contains(url) {
                continue;
            }
            if !self.store.owns(url) {
                debug!(url = %url, "leaving external image untouched");
                continue;
            }
            orphans.push(url.clone());
        }

        orphans
    }

    async fn delete_each(&self, urls: &[String]) -> PruneReport {
        let results = join_all(
            urls.iter()
                .map(|url| async move { (url, self.store.delete(url).await) }),
        )
        .await;

        let mut report = PruneReport::default();
        for (url, result) in results {
            match result {
                Ok(()) => report.deleted.push(url.clone()),
                Err(err) => {
                    warn!(url = %url, error = %err, "failed to delete stored image");
                    report.warnings.push(DeleteWarning {
                        url: url.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        report
    }
}
