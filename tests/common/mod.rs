#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use study_hub::{
    AppConfig, AppState,
    auth::AuthUser,
    models::{
        Flashcard, GradeLog, GradeLogChanges, GradeLogRecord, NewFlashcard, NewGradeLog,
        RestoreSummary, UpdateFlashcardRequest, User,
    },
    repository::{RepoResult, Repository},
};

// --- IN-MEMORY REPOSITORY ---

#[derive(Default, Clone)]
struct Tables {
    users: Vec<User>,
    flashcards: Vec<Flashcard>,
    grade_logs: Vec<GradeLog>,
    next_flashcard_id: i64,
    next_grade_log_id: i64,
}

/// A `Repository` backed by vectors behind a mutex. Writes are staged on a copy
/// of the tables and only swapped in on success, which mirrors the commit /
/// rollback behaviour of the Postgres implementation.
#[derive(Default)]
pub struct MemoryRepo {
    tables: Mutex<Tables>,
    /// When set, every write returns a database error and changes nothing.
    pub fail_writes: AtomicBool,
    /// Restore fails on the element with this subject, after earlier elements were staged.
    pub poison_subject: Mutex<Option<String>>,
}

const FIXED_DATE: i64 = 1_700_000_000;

pub fn fixed_date() -> DateTime<Utc> {
    Utc.timestamp_opt(FIXED_DATE, 0).unwrap()
}

fn write_failure() -> sqlx::Error {
    sqlx::Error::Protocol("simulated commit failure".to_string())
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, id: i64, role: &str) -> Self {
        self.tables.lock().unwrap().users.push(User {
            id,
            email: format!("user{id}@example.com"),
            role: role.to_string(),
        });
        self
    }

    pub fn failing_writes(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    pub fn flashcards(&self) -> Vec<Flashcard> {
        self.tables.lock().unwrap().flashcards.clone()
    }

    pub fn grade_logs(&self) -> Vec<GradeLog> {
        self.tables.lock().unwrap().grade_logs.clone()
    }

    pub fn seed_flashcard(&self, user_id: i64, title: &str, content: &str, deck_id: i64) -> Flashcard {
        let mut tables = self.tables.lock().unwrap();
        tables.next_flashcard_id += 1;
        let card = Flashcard {
            id: tables.next_flashcard_id,
            title: title.to_string(),
            content: content.to_string(),
            user_id,
            deck_id,
        };
        tables.flashcards.push(card.clone());
        card
    }

    pub fn seed_grade_log(&self, user_id: i64, subject: &str, grade: &str, notes: &str) -> GradeLog {
        let mut tables = self.tables.lock().unwrap();
        tables.next_grade_log_id += 1;
        let log = GradeLog {
            id: tables.next_grade_log_id,
            user_id,
            subject: subject.to_string(),
            grade: grade.to_string(),
            notes: notes.to_string(),
            date: fixed_date(),
        };
        tables.grade_logs.push(log.clone());
        log
    }

    fn check_writable(&self) -> RepoResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(write_failure())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Repository for MemoryRepo {
    async fn get_user(&self, id: i64) -> Option<User> {
        let tables = self.tables.lock().unwrap();
        tables.users.iter().find(|u| u.id == id).cloned()
    }

    async fn create_flashcard(&self, user_id: i64, card: NewFlashcard) -> RepoResult<Flashcard> {
        self.check_writable()?;
        Ok(self.seed_flashcard(user_id, &card.title, &card.content, card.deck_id))
    }

    async fn get_flashcard(&self, id: i64) -> RepoResult<Option<Flashcard>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.flashcards.iter().find(|c| c.id == id).cloned())
    }

    async fn list_flashcards(&self, user_id: i64) -> RepoResult<Vec<Flashcard>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .flashcards
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_flashcard(
        &self,
        id: i64,
        changes: UpdateFlashcardRequest,
    ) -> RepoResult<Option<Flashcard>> {
        self.check_writable()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.flashcards.iter_mut().find(|c| c.id == id).map(|card| {
            if let Some(title) = changes.title {
                card.title = title;
            }
            if let Some(content) = changes.content {
                card.content = content;
            }
            card.clone()
        }))
    }

    async fn delete_flashcard(&self, id: i64) -> RepoResult<bool> {
        self.check_writable()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.flashcards.len();
        tables.flashcards.retain(|c| c.id != id);
        Ok(tables.flashcards.len() < before)
    }

    async fn create_grade_log(&self, user_id: i64, log: NewGradeLog) -> RepoResult<GradeLog> {
        self.check_writable()?;
        Ok(self.seed_grade_log(user_id, &log.subject, &log.grade, &log.notes))
    }

    async fn get_grade_log(&self, id: i64) -> RepoResult<Option<GradeLog>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.grade_logs.iter().find(|l| l.id == id).cloned())
    }

    async fn list_grade_logs(&self, owner: Option<i64>) -> RepoResult<Vec<GradeLog>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .grade_logs
            .iter()
            .filter(|l| owner.is_none_or(|user_id| l.user_id == user_id))
            .cloned()
            .collect())
    }

    async fn update_grade_log(
        &self,
        id: i64,
        changes: GradeLogChanges,
    ) -> RepoResult<Option<GradeLog>> {
        self.check_writable()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.grade_logs.iter_mut().find(|l| l.id == id).map(|log| {
            if let Some(subject) = changes.subject {
                log.subject = subject;
            }
            if let Some(grade) = changes.grade {
                log.grade = grade;
            }
            if let Some(notes) = changes.notes {
                log.notes = notes;
            }
            if let Some(date) = changes.date {
                log.date = date;
            }
            log.clone()
        }))
    }

    async fn delete_grade_log(&self, id: i64) -> RepoResult<bool> {
        self.check_writable()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.grade_logs.len();
        tables.grade_logs.retain(|l| l.id != id);
        Ok(tables.grade_logs.len() < before)
    }

    async fn restore_grade_logs(&self, records: Vec<GradeLogRecord>) -> RepoResult<RestoreSummary> {
        self.check_writable()?;
        let poison = self.poison_subject.lock().unwrap().clone();
        let mut tables = self.tables.lock().unwrap();
        let mut staged = tables.clone();
        let mut summary = RestoreSummary::default();

        for record in records {
            if poison.as_deref() == Some(record.subject.as_str()) {
                // Dropping `staged` discards the earlier elements too.
                return Err(write_failure());
            }

            let existing = staged.grade_logs.iter_mut().find(|l| {
                l.user_id == record.user_id
                    && l.subject == record.subject
                    && l.grade == record.grade
                    && l.notes == record.notes
                    && Some(l.date) == record.date
            });

            match existing {
                Some(log) => {
                    log.notes = record.notes;
                    summary.updated += 1;
                }
                None => {
                    staged.next_grade_log_id += 1;
                    let id = staged.next_grade_log_id;
                    staged.grade_logs.push(GradeLog {
                        id,
                        user_id: record.user_id,
                        subject: record.subject,
                        grade: record.grade,
                        notes: record.notes,
                        date: record.date.unwrap_or_else(Utc::now),
                    });
                    summary.created += 1;
                }
            }
        }

        *tables = staged;
        Ok(summary)
    }
}

// --- TEST UTILITIES ---

pub const OWNER_ID: i64 = 5;
pub const OTHER_ID: i64 = 6;
pub const ADMIN_ID: i64 = 1;

/// Repository with a student owner, a second student and an admin.
pub fn seeded_repo() -> MemoryRepo {
    MemoryRepo::new()
        .with_user(OWNER_ID, "student")
        .with_user(OTHER_ID, "student")
        .with_user(ADMIN_ID, "admin")
}

pub fn create_test_state(repo: Arc<MemoryRepo>) -> AppState {
    AppState {
        repo,
        config: AppConfig::default(),
    }
}

pub fn student(id: i64) -> AuthUser {
    AuthUser {
        id,
        role: "student".to_string(),
    }
}

pub fn admin() -> AuthUser {
    AuthUser {
        id: ADMIN_ID,
        role: "admin".to_string(),
    }
}

/// Reads a handler response body as JSON.
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
