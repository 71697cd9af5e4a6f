pub mod image_validation;
pub mod local;

use std::fmt;

use async_trait::async_trait;

use crate::error::{FolioError, Result};
pub use image_validation::{ImageFormat, InvalidReason};
pub use local::LocalContentStore;

/// A file part received with a project form, not yet stored anywhere.
#[derive(Clone, Default)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Upload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: None,
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Name used in user-facing messages.
    pub fn display_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("<unnamed>")
    }

    pub fn image_format(&self) -> Result<ImageFormat> {
        image_validation::detect_image_format(
            &self.bytes,
            self.file_name.as_deref(),
        )
        .map_err(|reason| match reason {
            InvalidReason::Empty => FolioError::validation(format!(
                "uploaded file '{}' is empty",
                self.display_name()
            )),
            InvalidReason::UnrecognizedFormat => {
                FolioError::validation(format!(
                    "uploaded file '{}' is not a supported image",
                    self.display_name()
                ))
            }
        })
    }
}

/// Object storage capability used by the gallery reconciler.
///
/// No guarantee spans multiple calls: each `put` and `delete` stands alone.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store `upload` under a fresh name inside `folder` and return its
    /// public URL.
    async fn put(&self, upload: &Upload, folder: &str) -> Result<String>;

    /// Remove the object behind a public URL previously returned by `put`.
    /// Deleting an object that is already gone succeeds.
    async fn delete(&self, url: &str) -> Result<()>;

    /// Whether `url` lives in this store's namespace. Foreign URLs are
    /// never deleted.
    fn owns(&self, url: &str) -> bool;
}
