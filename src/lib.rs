use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod cors;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

// Routing split by access level (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::ApiError;
pub use repository::{PostgresRepository, Repository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document aggregated from the `#[utoipa::path]` handlers and the
/// `ToSchema` models, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::flashcard::create_flashcard, handlers::flashcard::list_flashcards,
        handlers::flashcard::get_flashcard, handlers::flashcard::update_flashcard,
        handlers::flashcard::delete_flashcard,
        handlers::gradelog::create_grade_log, handlers::gradelog::list_grade_logs,
        handlers::gradelog::update_grade_log, handlers::gradelog::delete_grade_log,
        handlers::gradelog::restore_grade_logs
    ),
    components(
        schemas(
            models::Flashcard, models::CreateFlashcardRequest, models::UpdateFlashcardRequest,
            models::GradeLog, models::CreateGradeLogRequest, models::UpdateGradeLogRequest,
            models::GradeLogChanges, models::GradeLogRecord, models::GradeLogCreated,
            models::RestoreSummary, models::MessageResponse,
        )
    ),
    tags(
        (name = "study-hub", description = "Flashcard and grade log API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared, immutable container handed to every request: the
/// repository handle and the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: abstracts database access.
    pub repo: RepositoryState,
    /// Configuration loaded at startup.
    pub config: AppConfig,
}

// Let extractors (notably `AuthUser`) pull single components out of AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Gate for the authenticated and admin routers. Extracting `AuthUser` is the
/// whole check: if it fails the extractor rejects with 401 and the handler never
/// runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing tree, applies the auth gate to the protected routers,
/// and wraps everything in request-id, tracing and CORS layers. Preflight answers
/// leave as 204.
pub fn create_router(state: AppState) -> Router {
    let cors = cors::cors_layer(&state.config.cors_origin);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .nest(
            "/api/admin",
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
        .layer(middleware::from_fn(cors::preflight_no_content))
}

/// trace_span_logger
///
/// Span for `TraceLayer`: method, URI and the generated `x-request-id`, so every
/// log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
