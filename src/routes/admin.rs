use crate::{AppState, handlers};
use axum::{Router, routing::post};

/// Admin Router Module
///
/// Administrative maintenance endpoints, nested under `/api/admin`. The router is
/// authenticated like the rest of the API; the 'admin' role check happens inside
/// each handler.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /api/admin/gradelog/restore
        // Re-imports an exported list of grade logs as one all-or-nothing batch.
        .route("/gradelog/restore", post(handlers::restore_grade_logs))
}
