// src/admin/routes.rs

use axum::{routing::get, Router};

use super::handlers;

pub fn admin_routes() -> Router {
    Router::new()
        .route("/api/dashboard/stats", get(handlers::get_dashboard_stats))
        .route("/api/admin/staff", get(handlers::get_staff_users))
}
