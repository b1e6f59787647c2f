// src/admin/handlers.rs

use axum::extract::{Extension, Json, Query};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use super::models::{DashboardStats, StaffListQuery, StaffSort, StaffSummary};
use super::services::{dashboard_stats, sort_staff};
use crate::applications::services::load_snapshot;
use crate::auth::{AuthedUser, StaffUser};
use crate::common::{ApiError, AppState};

/// GET /api/dashboard/stats - Totals and recent activity for the caller
pub async fn get_dashboard_stats(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<DashboardStats>, ApiError> {
    let state = state_lock.read().await.clone();

    let snapshot = load_snapshot(&state.db, &authed.id).await?;
    let stats = dashboard_stats(&snapshot.applications, &snapshot.selections);

    info!(
        user_id = %authed.id,
        total = stats.total_applications,
        shortlisted = stats.shortlisted_count,
        "Dashboard stats computed"
    );

    Ok(Json(stats))
}

/// GET /api/admin/staff - Staff accounts, admin only
pub async fn get_staff_users(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(query): Query<StaffListQuery>,
) -> Result<Json<Vec<StaffSummary>>, ApiError> {
    let state = state_lock.read().await.clone();

    authed.require_admin()?;

    let sort = match query.sort.as_deref() {
        Some(raw) => raw.parse::<StaffSort>().map_err(ApiError::BadRequest)?,
        None => StaffSort::default(),
    };

    let staff = sqlx::query_as::<_, StaffUser>("SELECT * FROM staff_users ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching staff list");
            ApiError::DatabaseError(e)
        })?;

    info!(
        admin_user_id = %authed.id,
        staff_count = staff.len(),
        sort = ?sort,
        "Staff list fetched successfully"
    );

    Ok(Json(sort_staff(staff, sort)))
}
