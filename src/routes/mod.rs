//! Router Module Index
//!
//! Routing split by access level. Access control is applied per module with
//! axum layers in `create_router`.

/// Routes accessible without a token (health).
pub mod public;

/// Routes protected by the `AuthUser` middleware.
pub mod authenticated;

/// Routes restricted to the 'admin' role.
pub mod admin;
