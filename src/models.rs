use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The account record resolved by the authentication gate (`users` table).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub email: String,
    // RBAC field: 'student' or 'admin'.
    pub role: String,
}

/// Flashcard
///
/// A single card from the `flashcards` table. Always owned by exactly one user
/// and filed under exactly one deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Flashcard {
    pub id: i64,
    pub title: String,
    pub content: String,
    // FK to users.id (Owner).
    pub user_id: i64,
    pub deck_id: i64,
}

/// GradeLog
///
/// A recorded grade from the `grade_logs` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct GradeLog {
    pub id: i64,
    // FK to users.id (Owner).
    pub user_id: i64,
    pub subject: String,
    pub grade: String,
    pub notes: String,
    #[ts(type = "string")]
    pub date: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// CreateFlashcardRequest
///
/// Input payload for POST /api/flashcard. Every field is optional at the serde
/// level so that a missing field is reported as a validation error rather than
/// a deserialization failure. No `user_id`: the owner is always the
/// authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CreateFlashcardRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub deck_id: Option<i64>,
}

/// NewFlashcard
///
/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFlashcard {
    pub title: String,
    pub content: String,
    pub deck_id: i64,
}

/// UpdateFlashcardRequest
///
/// Partial update payload for PUT /api/flashcard/{id}. Absent fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateFlashcardRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// CreateGradeLogRequest
///
/// Input payload for POST /api/gradelog.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CreateGradeLogRequest {
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "optional_grade")]
    #[schema(value_type = Option<String>)]
    pub grade: Option<String>,
    pub notes: Option<String>,
}

/// NewGradeLog
///
/// A create request that passed validation. `notes` is already defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGradeLog {
    pub subject: String,
    pub grade: String,
    pub notes: String,
}

/// UpdateGradeLogRequest
///
/// Input payload for PUT /api/gradelog. The target id travels in the body, as
/// a number or a numeric string.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateGradeLogRequest {
    #[serde(default, deserialize_with = "optional_id")]
    #[schema(value_type = Option<i64>)]
    pub id: Option<i64>,

    #[serde(flatten)]
    pub changes: GradeLogChanges,
}

/// GradeLogChanges
///
/// The mutable subset of a grade log. Absent fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct GradeLogChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_grade"
    )]
    #[schema(value_type = Option<String>)]
    pub grade: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

/// DeleteGradeLogParams
///
/// Query string of DELETE /api/gradelog. Kept as raw text so that a malformed
/// id becomes a 400 with a readable message.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct DeleteGradeLogParams {
    /// Positive integer id of the grade log to delete.
    pub id: Option<String>,
}

/// GradeLogRecord
///
/// One element of a restore batch, usually produced by an earlier export.
/// Any `id` present in the input is ignored; records are matched on their
/// natural key instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GradeLogRecord {
    pub user_id: i64,
    pub subject: String,
    #[serde(deserialize_with = "grade_text")]
    #[schema(value_type = String)]
    pub grade: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

// --- Response Payloads (Output Schemas) ---

/// MessageResponse
///
/// Plain confirmation body, e.g. after a delete.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// GradeLogCreated
///
/// Body returned by POST /api/gradelog.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct GradeLogCreated {
    pub message: String,
    pub grade_log_id: i64,
}

/// RestoreSummary
///
/// Outcome of a restore batch: how many rows were inserted and how many
/// existing rows matched and were updated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RestoreSummary {
    pub created: u64,
    pub updated: u64,
}

// --- Grade value handling ---

// Clients send grades either as text ("A-") or as numbers (93.5).
#[derive(Deserialize)]
#[serde(untagged)]
enum GradeValue {
    Text(String),
    Number(serde_json::Number),
}

impl GradeValue {
    fn into_text(self) -> String {
        match self {
            GradeValue::Text(text) => text,
            GradeValue::Number(number) => number.to_string(),
        }
    }
}

fn optional_grade<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<GradeValue>::deserialize(deserializer)?.map(GradeValue::into_text))
}

fn grade_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(GradeValue::deserialize(deserializer)?.into_text())
}


// --- Id handling ---

#[derive(Deserialize)]
#[serde(untagged)]
enum IdValue {
    Number(i64),
    Text(String),
}

fn optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IdValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IdValue::Number(id)) => Ok(Some(id)),
        Some(IdValue::Text(raw)) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid grade log id {raw:?}"))),
    }
}
