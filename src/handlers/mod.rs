//! Request handlers, one module per resource.
//!
//! Every handler resolves the caller through the `AuthUser` extractor, validates
//! its payload, calls the repository and returns either a JSON body or an
//! `ApiError`.

pub mod flashcard;
pub mod gradelog;

pub use flashcard::{
    create_flashcard, delete_flashcard, get_flashcard, list_flashcards, update_flashcard,
};
pub use gradelog::{
    create_grade_log, delete_grade_log, list_grade_logs, restore_grade_logs, update_grade_log,
};

use crate::error::ApiError;
use axum::{Json, extract::rejection::JsonRejection};

/// Unwraps a JSON body, turning a missing or malformed body into a 400 instead
/// of axum's default rejection.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(ApiError::validation(format!(
            "Invalid request body: {}",
            rejection.body_text()
        ))),
    }
}

/// `Some` non-blank text, otherwise `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}
