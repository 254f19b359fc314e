//! # Input Validation
//!
//! Field-level checks for every write operation, with messages matching
//! the original API's validator output.
//!
//! Text fields are trimmed before length checks (`trim: true` in the
//! original schemas); a post that is empty after trimming and carries no
//! images is rejected.

use crate::error::{CoreError, FieldError};
use crate::primitives::{
    MAX_BIO, MAX_COMMENT_TEXT, MAX_NAME, MAX_POST_TEXT, MIN_PASSWORD,
};

// =============================================================================
// REGISTRATION / LOGIN
// =============================================================================

/// Raw registration input before validation.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub bio: String,
}

impl RegisterInput {
    /// Trim and validate all fields.
    ///
    /// Returns the normalized input (trimmed name/bio, lowercased email)
    /// or every failing field at once.
    pub fn validated(self) -> Result<Self, CoreError> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_lowercase();
        let bio = self.bio.trim().to_string();
        let mut errors = Vec::new();

        if name.is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        } else if name.chars().count() > MAX_NAME {
            errors.push(FieldError::new(
                "name",
                format!("Name cannot exceed {MAX_NAME} characters"),
            ));
        }

        if !is_valid_email(&email) {
            errors.push(FieldError::new("email", "Please provide a valid email"));
        }

        if self.password.chars().count() < MIN_PASSWORD {
            errors.push(FieldError::new(
                "password",
                format!("Password must be at least {MIN_PASSWORD} characters"),
            ));
        }

        if bio.chars().count() > MAX_BIO {
            errors.push(FieldError::new(
                "bio",
                format!("Bio cannot exceed {MAX_BIO} characters"),
            ));
        }

        if errors.is_empty() {
            Ok(Self {
                name,
                email,
                bio,
                password: self.password,
            })
        } else {
            Err(CoreError::Validation(errors))
        }
    }
}

/// Structural email check: exactly one `@`, non-empty local part, and a
/// dotted domain. Deliverability is not our problem.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Normalize a login email the same way registration does.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// =============================================================================
// POSTS / COMMENTS
// =============================================================================

/// Validate post content. Returns the trimmed text.
///
/// A post must carry text or at least one image, and text may not exceed
/// `MAX_POST_TEXT` characters.
pub fn post_text(text: &str, image_count: usize) -> Result<String, CoreError> {
    let text = text.trim().to_string();

    if text.chars().count() > MAX_POST_TEXT {
        return Err(CoreError::invalid(
            "text",
            format!("Post cannot exceed {MAX_POST_TEXT} characters"),
        ));
    }
    if text.is_empty() && image_count == 0 {
        return Err(CoreError::invalid(
            "text",
            "Post must have text or at least one image",
        ));
    }

    Ok(text)
}

/// Validate comment text. Returns the trimmed text.
pub fn comment_text(text: &str) -> Result<String, CoreError> {
    let text = text.trim().to_string();

    if text.is_empty() {
        return Err(CoreError::invalid("text", "Comment text is required"));
    }
    if text.chars().count() > MAX_COMMENT_TEXT {
        return Err(CoreError::invalid(
            "text",
            format!("Comment cannot exceed {MAX_COMMENT_TEXT} characters"),
        ));
    }

    Ok(text)
}

// =============================================================================
// TESTS
// =============================================================================
