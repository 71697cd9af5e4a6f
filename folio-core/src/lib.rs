//! Core library for the Folio portfolio backend.
//!
//! The interesting part lives in [`gallery`]: turning an ordered,
//! client-declared mix of retained URLs and freshly uploaded files into the
//! persisted image list of a project, while keeping the content store free
//! of orphans. The remaining modules are the collaborators around it:
//! content storage, repositories, mail delivery and the small services the
//! HTTP layer calls into.

pub mod database;
pub mod error;
pub mod gallery;
pub mod mail;
pub mod services;
pub mod storage;

pub use database::Repositories;
pub use error::{FolioError, Result};
pub use gallery::{
    DeleteWarning, GalleryReconciler, GallerySubmission, PruneReport,
    ResolvedGallery,
};
pub use mail::{LogMailer, Mailer, MemoryMailer, OutgoingMail};
pub use services::{
    AnalyticsService, ContactService, OrderService, ProjectForm, ProjectService,
    VerificationService,
};
pub use storage::{ContentStore, LocalContentStore, Upload};

pub use folio_model as model;

/// Embedded PostgreSQL migrations for every repository in [`database`].
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
