//! Multipart upload ingestion.
//!
//! The in-memory analog of the original upload middleware: fields are
//! buffered, unknown ones drained, and files carried as raw bytes plus
//! their declared content type. Size and count caps are enforced later
//! by the core image module; this layer only shapes the form.

use super::error::ApiError;
use axum::extract::Multipart;

/// One uploaded file.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Fields of a post create/update form.
#[derive(Debug, Default)]
pub struct PostForm {
    pub text: String,
    /// Data URLs the client kept from the previous revision.
    pub existing_images: Vec<String>,
    /// Freshly uploaded files.
    pub images: Vec<UploadedImage>,
}

fn form_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::bad_request(format!("malformed form data: {err}"))
}

/// Read a post form (`text`, `existingImages`, `images`).
pub async fn read_post_form(mut multipart: Multipart) -> Result<PostForm, ApiError> {
    let mut form = PostForm::default();

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().map(ToString::to_string).unwrap_or_default();
        match name.as_str() {
            "text" => form.text = field.text().await.map_err(form_error)?,
            "existingImages" => {
                form.existing_images
                    .push(field.text().await.map_err(form_error)?);
            }
            "images" => {
                let mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(form_error)?.to_vec();
                form.images.push(UploadedImage { mime, bytes });
            }
            _ => {
                // Drain and ignore unknown fields.
                let _ = field.bytes().await.map_err(form_error)?;
            }
        }
    }

    Ok(form)
}

/// Read a single-file form (`image`), e.g. the profile picture upload.
pub async fn read_single_image(
    mut multipart: Multipart,
    field_name: &str,
) -> Result<Option<UploadedImage>, ApiError> {
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().map(ToString::to_string).unwrap_or_default();
        if name == field_name && image.is_none() {
            let mime = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await.map_err(form_error)?.to_vec();
            image = Some(UploadedImage { mime, bytes });
        } else {
            let _ = field.bytes().await.map_err(form_error)?;
        }
    }

    Ok(image)
}
