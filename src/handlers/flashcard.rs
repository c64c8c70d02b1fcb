use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    handlers::{json_body, non_blank},
    models::{CreateFlashcardRequest, Flashcard, MessageResponse, NewFlashcard, UpdateFlashcardRequest},
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

const REQUIRED_FIELDS: &str = "Title, content, and deck ID are required.";
const NOT_FOUND: &str = "Flashcard not found.";
const NOT_OWNER: &str = "You do not have permission to modify this flashcard.";
const EMPTY_FIELD: &str = "Title and content cannot be empty.";

/// create_flashcard
///
/// [Authenticated Route] Creates a flashcard owned by the caller. The owner comes
/// from `AuthUser`; the request type has no `user_id` field to trust.
#[utoipa::path(
    post,
    path = "/api/flashcard",
    request_body = CreateFlashcardRequest,
    responses(
        (status = 201, description = "Created", body = Flashcard),
        (status = 400, description = "Missing fields"),
        (status = 500, description = "Save failed")
    )
)]
pub async fn create_flashcard(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateFlashcardRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Flashcard>), ApiError> {
    let card = validate_new_flashcard(json_body(payload)?)?;

    let flashcard = state
        .repo
        .create_flashcard(user_id, card)
        .await
        .map_err(ApiError::persistence("Failed to create flashcard"))?;

    tracing::info!(flashcard_id = flashcard.id, user_id, "flashcard created");
    Ok((StatusCode::CREATED, Json(flashcard)))
}

/// list_flashcards
///
/// [Authenticated Route] Lists the caller's own flashcards.
#[utoipa::path(
    get,
    path = "/api/flashcard",
    responses((status = 200, description = "My flashcards", body = [Flashcard]))
)]
pub async fn list_flashcards(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Flashcard>>, ApiError> {
    let flashcards = state
        .repo
        .list_flashcards(user_id)
        .await
        .map_err(ApiError::persistence("Failed to load flashcards"))?;
    Ok(Json(flashcards))
}

/// get_flashcard
///
/// [Authenticated Route] Reads one flashcard. Cards owned by other users are
/// reported as missing so their existence does not leak.
#[utoipa::path(
    get,
    path = "/api/flashcard/{id}",
    params(("id" = i64, Path, description = "Flashcard ID")),
    responses(
        (status = 200, description = "Found", body = Flashcard),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_flashcard(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Flashcard>, ApiError> {
    match load_flashcard(&state, id).await? {
        Some(flashcard) if flashcard.user_id == user_id => Ok(Json(flashcard)),
        _ => Err(ApiError::not_found(NOT_FOUND)),
    }
}

/// update_flashcard
///
/// [Authenticated Route] Partially updates the caller's flashcard: only the
/// fields present in the body change.
#[utoipa::path(
    put,
    path = "/api/flashcard/{id}",
    params(("id" = i64, Path, description = "Flashcard ID")),
    request_body = UpdateFlashcardRequest,
    responses(
        (status = 200, description = "Updated", body = Flashcard),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Commit failed")
    )
)]
pub async fn update_flashcard(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateFlashcardRequest>, JsonRejection>,
) -> Result<Json<Flashcard>, ApiError> {
    let changes = json_body(payload)?;
    owned_flashcard(&state, id, user_id).await?;

    let blank = |field: &Option<String>| field.as_ref().is_some_and(|text| text.trim().is_empty());
    if blank(&changes.title) || blank(&changes.content) {
        return Err(ApiError::validation(EMPTY_FIELD));
    }

    let updated = state
        .repo
        .update_flashcard(id, changes)
        .await
        .map_err(ApiError::persistence("Failed to update flashcard"))?
        // Deleted between the ownership check and the update.
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    tracing::info!(flashcard_id = id, user_id, "flashcard updated");
    Ok(Json(updated))
}

/// delete_flashcard
///
/// [Authenticated Route] Deletes the caller's flashcard.
#[utoipa::path(
    delete,
    path = "/api/flashcard/{id}",
    params(("id" = i64, Path, description = "Flashcard ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Commit failed")
    )
)]
pub async fn delete_flashcard(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    owned_flashcard(&state, id, user_id).await?;

    let removed = state
        .repo
        .delete_flashcard(id)
        .await
        .map_err(ApiError::persistence("Failed to delete flashcard"))?;
    if !removed {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    tracing::info!(flashcard_id = id, user_id, "flashcard deleted");
    Ok(Json(MessageResponse::new(format!(
        "Flashcard with ID {id} deleted successfully"
    ))))
}

fn validate_new_flashcard(payload: CreateFlashcardRequest) -> Result<NewFlashcard, ApiError> {
    // Non-positive deck ids count as missing.
    let deck_id = payload.deck_id.filter(|id| *id > 0);
    match (non_blank(payload.title), non_blank(payload.content), deck_id) {
        (Some(title), Some(content), Some(deck_id)) => Ok(NewFlashcard {
            title,
            content,
            deck_id,
        }),
        _ => Err(ApiError::validation(REQUIRED_FIELDS)),
    }
}

async fn load_flashcard(state: &AppState, id: i64) -> Result<Option<Flashcard>, ApiError> {
    state
        .repo
        .get_flashcard(id)
        .await
        .map_err(ApiError::persistence("Failed to load flashcard"))
}

/// 404 when the card is missing, 403 when it belongs to someone else.
async fn owned_flashcard(state: &AppState, id: i64, user_id: i64) -> Result<Flashcard, ApiError> {
    let flashcard = load_flashcard(state, id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    if flashcard.user_id != user_id {
        tracing::warn!(flashcard_id = id, user_id, "flashcard ownership check failed");
        return Err(ApiError::forbidden(NOT_OWNER));
    }
    Ok(flashcard)
}
