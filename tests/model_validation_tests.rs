use serde_json::json;
use study_hub::models::{
    CreateFlashcardRequest, CreateGradeLogRequest, Flashcard, GradeLogCreated, GradeLogRecord,
    UpdateFlashcardRequest, UpdateGradeLogRequest,
};

// --- Tests ---

#[test]
fn test_create_flashcard_request_ignores_user_id() {
    // Clients sometimes echo an owner; it must never reach the model.
    let request: CreateFlashcardRequest = serde_json::from_value(json!({
        "title": "Q1",
        "content": "2+2=4",
        "deck_id": 7,
        "user_id": 99
    }))
    .unwrap();

    assert_eq!(request.title.as_deref(), Some("Q1"));
    assert_eq!(request.deck_id, Some(7));
}

#[test]
fn test_create_flashcard_request_tolerates_missing_fields() {
    // Missing fields are a validation concern, not a parse failure.
    let request: CreateFlashcardRequest =
        serde_json::from_value(json!({ "title": "Q1" })).unwrap();
    assert!(request.content.is_none());
    assert!(request.deck_id.is_none());
}

#[test]
fn test_update_flashcard_request_optionality() {
    let partial_update = UpdateFlashcardRequest {
        title: Some("New Title Only".to_string()),
        content: None,
    };

    let json_output = serde_json::to_string(&partial_update).unwrap();
    assert!(json_output.contains(r#""title":"New Title Only""#));
    assert!(!json_output.contains("content")); // None fields are omitted
}

#[test]
fn test_grade_accepts_numbers_and_text() {
    let numeric: CreateGradeLogRequest =
        serde_json::from_value(json!({ "subject": "Math", "grade": 93 })).unwrap();
    assert_eq!(numeric.grade.as_deref(), Some("93"));

    let decimal: CreateGradeLogRequest =
        serde_json::from_value(json!({ "subject": "Math", "grade": 4.5 })).unwrap();
    assert_eq!(decimal.grade.as_deref(), Some("4.5"));

    let text: CreateGradeLogRequest =
        serde_json::from_value(json!({ "subject": "Math", "grade": "A-" })).unwrap();
    assert_eq!(text.grade.as_deref(), Some("A-"));

    let missing: CreateGradeLogRequest =
        serde_json::from_value(json!({ "subject": "Math" })).unwrap();
    assert!(missing.grade.is_none());
}

#[test]
fn test_grade_rejects_structured_values() {
    let result =
        serde_json::from_value::<CreateGradeLogRequest>(json!({ "subject": "Math", "grade": [1] }));
    assert!(result.is_err());
}

#[test]
fn test_update_grade_log_request_flattens_changes() {
    let request: UpdateGradeLogRequest = serde_json::from_value(json!({
        "id": 3,
        "grade": 88,
        "date": "2024-05-01T09:30:00Z"
    }))
    .unwrap();

    assert_eq!(request.id, Some(3));
    assert_eq!(request.changes.grade.as_deref(), Some("88"));
    assert!(request.changes.subject.is_none());
    assert!(request.changes.notes.is_none());
    assert_eq!(
        request.changes.date.unwrap().to_rfc3339(),
        "2024-05-01T09:30:00+00:00"
    );
}

#[test]
fn test_restore_record_defaults_and_ignores_id() {
    let record: GradeLogRecord = serde_json::from_value(json!({
        "id": 12,
        "user_id": 5,
        "subject": "Art",
        "grade": 4.5
    }))
    .unwrap();

    assert_eq!(record.user_id, 5);
    assert_eq!(record.grade, "4.5");
    assert_eq!(record.notes, "");
    assert!(record.date.is_none());
}

#[test]
fn test_restore_record_requires_owner_and_subject() {
    let result = serde_json::from_value::<GradeLogRecord>(json!({ "grade": "A" }));
    assert!(result.is_err());
}

#[test]
fn test_flashcard_json_shape() {
    let card = Flashcard {
        id: 1,
        title: "Q1".to_string(),
        content: "2+2=4".to_string(),
        user_id: 5,
        deck_id: 7,
    };

    assert_eq!(
        serde_json::to_value(&card).unwrap(),
        json!({ "id": 1, "title": "Q1", "content": "2+2=4", "user_id": 5, "deck_id": 7 })
    );
}

#[test]
fn test_grade_log_created_json_shape() {
    let created = GradeLogCreated {
        message: "Grade logged successfully".to_string(),
        grade_log_id: 42,
    };

    assert_eq!(
        serde_json::to_value(&created).unwrap(),
        json!({ "message": "Grade logged successfully", "grade_log_id": 42 })
    );
}

#[test]
fn test_update_grade_log_request_accepts_string_id() {
    let request: UpdateGradeLogRequest =
        serde_json::from_value(json!({ "id": "5", "notes": "late" })).unwrap();
    assert_eq!(request.id, Some(5));
    assert_eq!(request.changes.notes.as_deref(), Some("late"));

    let missing: UpdateGradeLogRequest =
        serde_json::from_value(json!({ "notes": "late" })).unwrap();
    assert!(missing.id.is_none());

    let garbage = serde_json::from_value::<UpdateGradeLogRequest>(json!({ "id": "five" }));
    assert!(garbage.is_err());
}
