// src/selections/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

pub fn selections_routes() -> Router {
    Router::new()
        .route(
            "/api/selections/toggle",
            post(handlers::toggle_selection),
        )
        .route(
            "/api/selections/shortlisted",
            get(handlers::get_shortlisted_applications),
        )
}
