//! Data model definitions shared across Folio crates.
#![allow(missing_docs)]

pub mod analytics;
pub mod contact;
pub mod error;
pub mod gallery;
pub mod ids;
pub mod project;

pub use analytics::{ClickCount, ClickRequest};
pub use contact::{
    ActionResponse, ContactRequest, OrderConfirmation, OrderRequest,
    VerificationConfirmRequest, VerificationSendRequest,
};
pub use error::{ModelError, Result as ModelResult};
pub use gallery::{GalleryEntry, ImageStructure};
pub use ids::ProjectId;
pub use project::{
    DEFAULT_GRADIENT, NewProject, Project, ProjectFields, ProjectPatch,
    split_lines, split_tags,
};
