//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/login` - Username/password sign-in
/// - `POST /api/auth/logout` - Logout (client-side token removal)
/// - `POST /api/auth/password` - Change the current user's password
/// - `GET /api/me` - Get current user information
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/login", post(handlers::login_handler))
        .route("/api/auth/logout", post(handlers::logout_handler))
        .route("/api/auth/password", post(handlers::change_password_handler))
        .route("/api/me", get(handlers::me_handler))
}
