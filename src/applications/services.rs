// src/applications/services.rs
//! Loading applications and the per-staff snapshot from the database

use sqlx::SqlitePool;
use tracing::{error, info};

use super::models::{Application, ApplicationRow, ApplicationsSnapshot};
use crate::common::ApiError;
use crate::selections::services::SelectionService;

/// All applications, newest first
pub async fn fetch_applications(db: &SqlitePool) -> Result<Vec<Application>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ApplicationRow>(
        "SELECT * FROM applications ORDER BY created_at DESC",
    )
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(Application::from).collect())
}

pub async fn fetch_application(
    db: &SqlitePool,
    application_id: &str,
) -> Result<Option<Application>, sqlx::Error> {
    let row = sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = ?")
        .bind(application_id)
        .fetch_optional(db)
        .await?;

    Ok(row.map(Application::from))
}

/// Applications plus the caller's own selections
pub async fn load_snapshot(db: &SqlitePool, user_id: &str) -> Result<ApplicationsSnapshot, ApiError> {
    let applications = fetch_applications(db).await.map_err(|e| {
        error!(error = %e, "Database error fetching applications");
        ApiError::DatabaseError(e)
    })?;

    let (selections, selection_data) = SelectionService::new(db.clone())
        .keys_for_user(user_id)
        .await
        .map_err(ApiError::from)?;

    info!(
        user_id = %user_id,
        application_count = applications.len(),
        selection_count = selections.len(),
        "Applications snapshot loaded"
    );

    Ok(ApplicationsSnapshot {
        applications,
        selections,
        selection_data,
    })
}
