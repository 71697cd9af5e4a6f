//! Decoding of the multipart project form.

use axum::extract::Multipart;
use tracing::debug;

use folio_core::{ProjectForm, Upload};

use crate::infra::errors::AppResult;

/// File parts carrying gallery uploads.
pub const IMAGES_FIELD: &str = "images";
/// JSON description of the ordered gallery.
pub const IMAGE_STRUCTURE_FIELD: &str = "imageStructure";

/// Drain a multipart body into a [`ProjectForm`]. Uploads keep the order in
/// which their parts arrived.
pub async fn read_project_form(mut multipart: Multipart) -> AppResult<ProjectForm> {
    let mut form = ProjectForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match name.as_str() {
            IMAGES_FIELD => {
                let file_name = field
                    .file_name()
                    .map(str::to_owned)
                    .filter(|n| !n.is_empty());
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field.bytes().await?;

                // browsers send an empty part for an untouched file input
                if bytes.is_empty() && file_name.is_none() {
                    continue;
                }

                let mut upload = Upload::new(bytes.to_vec());
                upload.file_name = file_name;
                upload.content_type = content_type;
                form.uploads.push(upload);
            }
            IMAGE_STRUCTURE_FIELD => {
                form.image_structure = Some(field.text().await?);
            }
            _ => {
                let value = field.text().await?;
                if !form.fields.set(&name, value) {
                    debug!(field = %name, "ignoring unknown form field");
                }
            }
        }
    }

    Ok(form)
}
