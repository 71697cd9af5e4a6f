//! Gallery reconciliation for project images.
//!
//! A project form submits an [`ImageStructure`] (ordered `url`/`file`
//! slots) together with the uploaded file parts. [`GalleryReconciler`]
//! pairs the Nth `file` slot with the Nth upload, stores the new files,
//! merges everything back into display order and works out which
//! previously stored objects became orphans.
//!
//! The pipeline is `validate -> upload -> merge -> diff`, followed by the
//! caller persisting the record and then calling
//! [`GalleryReconciler::prune`]. A failure before the record is persisted
//! leaves the store as it was: uploads of the failed request are removed
//! again on a best-effort basis.

mod reconciler;

use folio_model::ImageStructure;

use crate::storage::Upload;

pub use reconciler::{GalleryReconciler, PROJECT_FOLDER};

/// Gallery half of a project form submission.
#[derive(Debug, Clone, Default)]
pub struct GallerySubmission {
    pub structure: ImageStructure,
    pub uploads: Vec<Upload>,
}

impl GallerySubmission {
    pub fn new(structure: ImageStructure, uploads: Vec<Upload>) -> Self {
        Self { structure, uploads }
    }

    /// Submission without an explicit structure: every upload becomes a
    /// slot, in arrival order.
    pub fn uploads_only(uploads: Vec<Upload>) -> Self {
        Self {
            structure: ImageStructure::files_only(uploads.len()),
            uploads,
        }
    }
}

/// Outcome of a successful [`GalleryReconciler::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedGallery {
    /// Final image list, in structure order.
    pub images: Vec<String>,
    /// URLs created by this reconciliation.
    pub uploaded: Vec<String>,
    /// Previously stored, locally owned URLs no longer referenced.
    pub orphans: Vec<String>,
}

/// A stored object that could not be removed. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteWarning {
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub deleted: Vec<String>,
    pub warnings: Vec<DeleteWarning>,
}

impl PruneReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.deleted.len() + self.warnings.len()
    }
}
