// src/applications/routes.rs

use axum::{routing::get, Router};

use super::handlers;

pub fn applications_routes() -> Router {
    Router::new()
        .route(
            "/api/applications",
            get(handlers::get_applications_snapshot),
        )
        .route(
            "/api/applications/view",
            get(handlers::get_applications_view),
        )
        .route(
            "/api/applications/export",
            get(handlers::export_applications),
        )
        .route(
            "/api/applications/categories",
            get(handlers::get_categories),
        )
        .route(
            "/api/applications/:id",
            get(handlers::get_application_details),
        )
}
