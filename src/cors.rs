//! Cross-origin policy for the browser client.

use axum::{
    extract::Request,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Allows exactly the configured origin, with credentials. An origin that is not
/// a valid header value allows nothing.
pub fn cors_layer(origin: &str) -> CorsLayer {
    let origins = origin
        .parse::<HeaderValue>()
        .map(|value| vec![value])
        .unwrap_or_else(|_| {
            tracing::warn!("CORS origin {:?} is not a valid header value", origin);
            vec![]
        });

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
}

/// Preflight middleware
///
/// `CorsLayer` answers every OPTIONS request itself with an empty 200. This
/// layer sits outside it and reports those answers as 204 No Content, without
/// authentication and without reaching any handler.
pub async fn preflight_no_content(request: Request, next: Next) -> Response {
    let is_preflight = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;

    if is_preflight && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}
