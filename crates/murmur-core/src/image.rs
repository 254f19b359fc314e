//! # Inline Image Handling
//!
//! Posts and profile pictures store images inline as base64 `data:` URLs
//! (`data:<mime>;base64,<payload>`), exactly as the original upload
//! middleware produced them. This module is the encode/decode boundary:
//! uploads are encoded once on the way in, and anything claiming to be a
//! stored data URL is re-checked before it is written back.

use crate::error::CoreError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Accepted image content types.
pub const ALLOWED_MIME: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/webp"];

/// A decoded inline image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Encode raw upload bytes as a `data:` URL.
///
/// Rejects unknown content types, empty uploads, and anything over
/// `max_bytes` (callers pick the post or avatar cap).
pub fn encode_data_url(mime: &str, bytes: &[u8], max_bytes: usize) -> Result<String, CoreError> {
    if !ALLOWED_MIME.contains(&mime) {
        return Err(CoreError::invalid(
            "image",
            format!("Unsupported image type: {mime}"),
        ));
    }
    if bytes.is_empty() {
        return Err(CoreError::invalid("image", "Image file is empty"));
    }
    if bytes.len() > max_bytes {
        return Err(CoreError::invalid(
            "image",
            format!("Image exceeds the {} byte limit", max_bytes),
        ));
    }

    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

/// Decode a `data:` URL back into mime and bytes.
pub fn decode_data_url(url: &str) -> Result<DecodedImage, CoreError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| CoreError::invalid("image", "Not a data URL"))?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| CoreError::invalid("image", "Not a base64 data URL"))?;

    let bytes = STANDARD
        .decode(payload)
        .map_err(|_| CoreError::invalid("image", "Invalid base64 payload"))?;

    Ok(DecodedImage {
        mime: mime.to_string(),
        bytes,
    })
}

/// Verify that a stored data URL is well-formed, of an allowed type, and
/// within the size cap. Used when a post edit echoes back images it kept.
pub fn check_data_url(url: &str, max_bytes: usize) -> Result<(), CoreError> {
    let decoded = decode_data_url(url)?;
    if !ALLOWED_MIME.contains(&decoded.mime.as_str()) {
        return Err(CoreError::invalid(
            "image",
            format!("Unsupported image type: {}", decoded.mime),
        ));
    }
    if decoded.bytes.is_empty() {
        return Err(CoreError::invalid("image", "Image file is empty"));
    }
    if decoded.bytes.len() > max_bytes {
        return Err(CoreError::invalid(
            "image",
            format!("Image exceeds the {} byte limit", max_bytes),
        ));
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
