use crate::models::{
    Flashcard, GradeLog, GradeLogChanges, GradeLogRecord, NewFlashcard, NewGradeLog,
    RestoreSummary, UpdateFlashcardRequest, User,
};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::Arc;

/// Result type for every fallible repository call.
pub type RepoResult<T> = Result<T, sqlx::Error>;

/// Repository Trait
///
/// The persistence contract consumed by the handlers. Implementations must be
/// `Send + Sync` so the trait object (`Arc<dyn Repository>`) can live in the shared
/// application state.
///
/// Ownership is NOT enforced here: handlers fetch a record, compare `user_id`
/// with the caller, and only then mutate. Mutations run inside a transaction
/// that is rolled back when any statement or the commit fails.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- User/Auth ---
    async fn get_user(&self, id: i64) -> Option<User>;

    // --- Flashcards ---
    async fn create_flashcard(&self, user_id: i64, card: NewFlashcard) -> RepoResult<Flashcard>;
    async fn get_flashcard(&self, id: i64) -> RepoResult<Option<Flashcard>>;
    // Every card owned by `user_id`, oldest first.
    async fn list_flashcards(&self, user_id: i64) -> RepoResult<Vec<Flashcard>>;
    // Applies only the fields that are `Some`. `None` when the row vanished.
    async fn update_flashcard(
        &self,
        id: i64,
        changes: UpdateFlashcardRequest,
    ) -> RepoResult<Option<Flashcard>>;
    // `true` if a row was removed.
    async fn delete_flashcard(&self, id: i64) -> RepoResult<bool>;

    // --- Grade logs ---
    async fn create_grade_log(&self, user_id: i64, log: NewGradeLog) -> RepoResult<GradeLog>;
    async fn get_grade_log(&self, id: i64) -> RepoResult<Option<GradeLog>>;
    /// Grade logs owned by `owner`, or every grade log when `owner` is `None`.
    async fn list_grade_logs(&self, owner: Option<i64>) -> RepoResult<Vec<GradeLog>>;
    async fn update_grade_log(
        &self,
        id: i64,
        changes: GradeLogChanges,
    ) -> RepoResult<Option<GradeLog>>;
    async fn delete_grade_log(&self, id: i64) -> RepoResult<bool>;

    /// Upserts every record of the batch by its natural key
    /// (user_id, subject, grade, notes, date) and commits once. A failure on any
    /// element rolls back the whole batch.
    async fn restore_grade_logs(&self, records: Vec<GradeLogRecord>) -> RepoResult<RestoreSummary>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const FLASHCARD_COLUMNS: &str = "id, title, content, user_id, deck_id";
const GRADE_LOG_COLUMNS: &str = "id, user_id, subject, grade, notes, date";

#[async_trait]
impl Repository for PostgresRepository {
    /// get_user
    ///
    /// Resolves the account behind an authenticated request. Database errors are
    /// logged and treated as "no such user", which makes the auth gate fail closed.
    async fn get_user(&self, id: i64) -> Option<User> {
        sqlx::query_as::<_, User>("SELECT id, email, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_user error: {:?}", e);
                None
            })
    }

    async fn create_flashcard(&self, user_id: i64, card: NewFlashcard) -> RepoResult<Flashcard> {
        let query = format!(
            "INSERT INTO flashcards (title, content, user_id, deck_id) VALUES ($1, $2, $3, $4) RETURNING {FLASHCARD_COLUMNS}"
        );
        sqlx::query_as::<_, Flashcard>(&query)
            .bind(card.title)
            .bind(card.content)
            .bind(user_id)
            .bind(card.deck_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_flashcard(&self, id: i64) -> RepoResult<Option<Flashcard>> {
        let query = format!("SELECT {FLASHCARD_COLUMNS} FROM flashcards WHERE id = $1");
        sqlx::query_as::<_, Flashcard>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_flashcards(&self, user_id: i64) -> RepoResult<Vec<Flashcard>> {
        let query =
            format!("SELECT {FLASHCARD_COLUMNS} FROM flashcards WHERE user_id = $1 ORDER BY id");
        sqlx::query_as::<_, Flashcard>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
    }

    /// update_flashcard
    ///
    /// Uses `COALESCE` so that only the provided columns change.
    async fn update_flashcard(
        &self,
        id: i64,
        changes: UpdateFlashcardRequest,
    ) -> RepoResult<Option<Flashcard>> {
        let query = format!(
            r#"
            UPDATE flashcards
            SET title = COALESCE($2, title),
                content = COALESCE($3, content)
            WHERE id = $1
            RETURNING {FLASHCARD_COLUMNS}
            "#
        );

        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query_as::<_, Flashcard>(&query)
            .bind(id)
            .bind(changes.title)
            .bind(changes.content)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_flashcard(&self, id: i64) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM flashcards WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_grade_log(&self, user_id: i64, log: NewGradeLog) -> RepoResult<GradeLog> {
        let query = format!(
            "INSERT INTO grade_logs (user_id, subject, grade, notes) VALUES ($1, $2, $3, $4) RETURNING {GRADE_LOG_COLUMNS}"
        );
        sqlx::query_as::<_, GradeLog>(&query)
            .bind(user_id)
            .bind(log.subject)
            .bind(log.grade)
            .bind(log.notes)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_grade_log(&self, id: i64) -> RepoResult<Option<GradeLog>> {
        let query = format!("SELECT {GRADE_LOG_COLUMNS} FROM grade_logs WHERE id = $1");
        sqlx::query_as::<_, GradeLog>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// list_grade_logs
    ///
    /// Newest first. The owner filter is appended with `QueryBuilder` so the
    /// admin path shares the same statement.
    async fn list_grade_logs(&self, owner: Option<i64>) -> RepoResult<Vec<GradeLog>> {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {GRADE_LOG_COLUMNS} FROM grade_logs"));

        if let Some(user_id) = owner {
            builder.push(" WHERE user_id = ");
            builder.push_bind(user_id);
        }

        builder.push(" ORDER BY date DESC, id DESC");

        builder
            .build_query_as::<GradeLog>()
            .fetch_all(&self.pool)
            .await
    }

    async fn update_grade_log(
        &self,
        id: i64,
        changes: GradeLogChanges,
    ) -> RepoResult<Option<GradeLog>> {
        let query = format!(
            r#"
            UPDATE grade_logs
            SET subject = COALESCE($2, subject),
                grade = COALESCE($3, grade),
                notes = COALESCE($4, notes),
                date = COALESCE($5, date)
            WHERE id = $1
            RETURNING {GRADE_LOG_COLUMNS}
            "#
        );

        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query_as::<_, GradeLog>(&query)
            .bind(id)
            .bind(changes.subject)
            .bind(changes.grade)
            .bind(changes.notes)
            .bind(changes.date)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_grade_log(&self, id: i64) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM grade_logs WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// restore_grade_logs
    ///
    /// Each element is looked up and written on its own; the transaction is
    /// committed once after the last element. `date IS NOT DISTINCT FROM` lets a
    /// record without a date match nothing, so it is inserted with `NOW()`.
    async fn restore_grade_logs(&self, records: Vec<GradeLogRecord>) -> RepoResult<RestoreSummary> {
        let mut summary = RestoreSummary::default();
        let mut tx = self.pool.begin().await?;

        for record in records {
            let existing: Option<i64> = sqlx::query_scalar(
                r#"
                SELECT id FROM grade_logs
                WHERE user_id = $1 AND subject = $2 AND grade = $3 AND notes = $4
                  AND date IS NOT DISTINCT FROM $5
                ORDER BY id
                LIMIT 1
                "#,
            )
            .bind(record.user_id)
            .bind(&record.subject)
            .bind(&record.grade)
            .bind(&record.notes)
            .bind(record.date)
            .fetch_optional(&mut *tx)
            .await?;

            match existing {
                Some(id) => {
                    sqlx::query(
                        r#"
                        UPDATE grade_logs
                        SET user_id = $2, subject = $3, grade = $4, notes = $5,
                            date = COALESCE($6, date)
                        WHERE id = $1
                        "#,
                    )
                    .bind(id)
                    .bind(record.user_id)
                    .bind(record.subject)
                    .bind(record.grade)
                    .bind(record.notes)
                    .bind(record.date)
                    .execute(&mut *tx)
                    .await?;
                    summary.updated += 1;
                }
                None => {
                    sqlx::query(
                        r#"
                        INSERT INTO grade_logs (user_id, subject, grade, notes, date)
                        VALUES ($1, $2, $3, $4, COALESCE($5, NOW()))
                        "#,
                    )
                    .bind(record.user_id)
                    .bind(record.subject)
                    .bind(record.grade)
                    .bind(record.notes)
                    .bind(record.date)
                    .execute(&mut *tx)
                    .await?;
                    summary.created += 1;
                }
            }
        }

        tx.commit().await?;
        tracing::info!(
            created = summary.created,
            updated = summary.updated,
            "grade log restore committed"
        );
        Ok(summary)
    }
}
