use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    handlers::{json_body, non_blank},
    models::{
        CreateGradeLogRequest, DeleteGradeLogParams, GradeLog, GradeLogCreated, GradeLogRecord,
        MessageResponse, NewGradeLog, RestoreSummary, UpdateGradeLogRequest,
    },
};
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
};

const REQUIRED_FIELDS: &str = "Subject and grade are required";
const ID_REQUIRED: &str = "Grade Log ID is required";
const VALID_ID_REQUIRED: &str = "A valid Grade Log ID is required";
const NOT_FOUND: &str = "Grade Log not found or unauthorized";
const EMPTY_FIELD: &str = "Subject and grade cannot be empty";

/// create_grade_log
///
/// [Authenticated Route] Records a grade for the caller. `notes` defaults to "".
#[utoipa::path(
    post,
    path = "/api/gradelog",
    request_body = CreateGradeLogRequest,
    responses(
        (status = 201, description = "Logged", body = GradeLogCreated),
        (status = 400, description = "Missing fields"),
        (status = 500, description = "Save failed")
    )
)]
pub async fn create_grade_log(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateGradeLogRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GradeLogCreated>), ApiError> {
    let payload = json_body(payload)?;
    let (Some(subject), Some(grade)) = (non_blank(payload.subject), non_blank(payload.grade)) else {
        return Err(ApiError::validation(REQUIRED_FIELDS));
    };

    let log = NewGradeLog {
        subject,
        grade,
        notes: payload.notes.unwrap_or_default(),
    };

    let created = state
        .repo
        .create_grade_log(user_id, log)
        .await
        .map_err(ApiError::persistence("Failed to create grade log"))?;

    tracing::info!(grade_log_id = created.id, user_id, "grade log created");
    Ok((
        StatusCode::CREATED,
        Json(GradeLogCreated {
            message: "Grade logged successfully".to_string(),
            grade_log_id: created.id,
        }),
    ))
}

/// list_grade_logs
///
/// [Authenticated Route] Lists the caller's grade logs. Admins see every user's logs.
#[utoipa::path(
    get,
    path = "/api/gradelog",
    responses((status = 200, description = "Grade logs", body = [GradeLog]))
)]
pub async fn list_grade_logs(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<GradeLog>>, ApiError> {
    let owner = if user.is_admin() { None } else { Some(user.id) };
    let logs = state
        .repo
        .list_grade_logs(owner)
        .await
        .map_err(ApiError::persistence("Failed to load grade logs"))?;
    Ok(Json(logs))
}

/// update_grade_log
///
/// [Authenticated Route] Updates one of the caller's grade logs. The target id is
/// part of the body; absent fields are left unchanged.
#[utoipa::path(
    put,
    path = "/api/gradelog",
    request_body = UpdateGradeLogRequest,
    responses(
        (status = 200, description = "Updated", body = GradeLog),
        (status = 400, description = "Missing id"),
        (status = 404, description = "Not found or not yours"),
        (status = 500, description = "Commit failed")
    )
)]
pub async fn update_grade_log(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<UpdateGradeLogRequest>, JsonRejection>,
) -> Result<Json<GradeLog>, ApiError> {
    let UpdateGradeLogRequest { id, changes } = json_body(payload)?;
    let id = id.ok_or_else(|| ApiError::validation(ID_REQUIRED))?;

    owned_grade_log(&state, id, user_id).await?;

    let blank = |field: &Option<String>| field.as_ref().is_some_and(|text| text.trim().is_empty());
    if blank(&changes.subject) || blank(&changes.grade) {
        return Err(ApiError::validation(EMPTY_FIELD));
    }

    let updated = state
        .repo
        .update_grade_log(id, changes)
        .await
        .map_err(ApiError::persistence("Failed to update grade log"))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    tracing::info!(grade_log_id = id, user_id, "grade log updated");
    Ok(Json(updated))
}

/// delete_grade_log
///
/// [Authenticated Route] Deletes one of the caller's grade logs, addressed by the
/// `id` query parameter.
#[utoipa::path(
    delete,
    path = "/api/gradelog",
    params(DeleteGradeLogParams),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Not found or not yours"),
        (status = 500, description = "Delete failed")
    )
)]
pub async fn delete_grade_log(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DeleteGradeLogParams>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_grade_log_id(params.id.as_deref())
        .ok_or_else(|| ApiError::validation(VALID_ID_REQUIRED))?;

    owned_grade_log(&state, id, user_id).await?;

    let removed = state
        .repo
        .delete_grade_log(id)
        .await
        .map_err(ApiError::persistence("An error occurred"))?;
    if !removed {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    tracing::info!(grade_log_id = id, user_id, "grade log deleted");
    Ok(Json(MessageResponse::new("Grade Log deleted successfully")))
}

/// restore_grade_logs
///
/// [Admin Route] Bulk-loads grade logs from an exported list. Each element is
/// upserted by its natural key; the batch commits as a whole or not at all.
#[utoipa::path(
    post,
    path = "/api/admin/gradelog/restore",
    request_body = [GradeLogRecord],
    responses(
        (status = 200, description = "Restored", body = RestoreSummary),
        (status = 400, description = "Malformed batch"),
        (status = 403, description = "Not an admin"),
        (status = 500, description = "Batch rolled back")
    )
)]
pub async fn restore_grade_logs(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<Vec<GradeLogRecord>>, JsonRejection>,
) -> Result<Json<RestoreSummary>, ApiError> {
    if !user.is_admin() {
        return Err(ApiError::forbidden("Admin role required"));
    }

    let records = json_body(payload)?;
    if let Some(index) = records
        .iter()
        .position(|record| record.subject.trim().is_empty() || record.grade.trim().is_empty())
    {
        return Err(ApiError::validation(format!(
            "Record {index}: {REQUIRED_FIELDS}"
        )));
    }

    let batch_size = records.len();
    let summary = state
        .repo
        .restore_grade_logs(records)
        .await
        .map_err(ApiError::persistence("Grade log restore failed; no records were changed"))?;

    tracing::info!(
        admin_id = user.id,
        batch_size,
        created = summary.created,
        updated = summary.updated,
        "grade logs restored"
    );
    Ok(Json(summary))
}

/// Accepts only a plain string of ASCII digits naming a positive id.
fn parse_grade_log_id(raw: Option<&str>) -> Option<i64> {
    let raw = raw?;
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

/// Missing and not-owned both map to the same 404.
async fn owned_grade_log(state: &AppState, id: i64, user_id: i64) -> Result<GradeLog, ApiError> {
    state
        .repo
        .get_grade_log(id)
        .await
        .map_err(ApiError::persistence("Failed to load grade log"))?
        .filter(|log| log.user_id == user_id)
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}
