use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// The two CRUD resources. The router is wrapped by the auth middleware in
/// `create_router`, and every handler additionally takes `AuthUser`, whose id is
/// used for all ownership checks.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Flashcards ---
        // POST creates a card owned by the caller; GET lists the caller's cards.
        .route(
            "/api/flashcard",
            post(handlers::create_flashcard).get(handlers::list_flashcards),
        )
        // GET/PUT/DELETE /api/flashcard/{id}
        // Owner-scoped read, partial update and delete.
        .route(
            "/api/flashcard/{id}",
            get(handlers::get_flashcard)
                .put(handlers::update_flashcard)
                .delete(handlers::delete_flashcard),
        )
        // --- Grade logs ---
        // PUT carries the id in the body, DELETE in the `id` query parameter.
        .route(
            "/api/gradelog",
            post(handlers::create_grade_log)
                .get(handlers::list_grade_logs)
                .put(handlers::update_grade_log)
                .delete(handlers::delete_grade_log),
        )
}
