// src/applications/handlers.rs

use axum::{
    extract::{Extension, Json, Path, Query},
    http::{header, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::export::{export_csv, sanitize_filename, ExportMode, ShortlistData};
use super::filters::{Category, FilterState};
use super::models::*;
use super::services::{fetch_application, load_snapshot};
use super::sorting::{SortDirection, SortKey, SortState};
use super::subjects::parsed_subjects;
use super::view::{shortlist_times, visible_applications};
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};

/// Builds filter and sort state from the query string
pub fn view_from_query(query: &ApplicationViewQuery) -> Result<(FilterState, SortState), ApiError> {
    let mut filters = FilterState::new();

    if let Some(category) = query.category.as_deref().map(str::trim) {
        if !category.is_empty() && !category.eq_ignore_ascii_case("all") {
            let category = category.parse::<Category>().map_err(ApiError::BadRequest)?;
            filters.set_category(Some(category));
        }
    }
    if let Some(q) = &query.q {
        filters.set_query(q.as_str());
    }
    filters.set_batch(query.batch.as_deref());
    if let Some(subjects) = &query.subjects {
        for subject in subjects.split(',') {
            filters.add_subject(subject);
        }
    }

    let mut sort = SortState::default();
    if let Some(key) = &query.sort {
        sort.key = key.parse::<SortKey>().map_err(ApiError::BadRequest)?;
    }
    if let Some(direction) = &query.direction {
        sort.direction = direction
            .parse::<SortDirection>()
            .map_err(ApiError::BadRequest)?;
    }

    Ok((filters, sort))
}

fn list_item(application: &Application, shortlist: &ShortlistData<'_>) -> ApplicationListItem {
    ApplicationListItem {
        subjects: parsed_subjects(application),
        shortlisted_subjects: shortlist.subjects_for(&application.id),
        application: application.clone(),
    }
}

/// GET /api/applications - Applications with the caller's selections
pub async fn get_applications_snapshot(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let snapshot = load_snapshot(&state.db, &authed.id).await?;

    Ok((
        StatusCode::OK,
        [(
            header::CACHE_CONTROL,
            "private, s-maxage=30, stale-while-revalidate=60",
        )],
        Json(snapshot),
    ))
}

/// GET /api/applications/view - Filtered and sorted list
pub async fn get_applications_view(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(query): Query<ApplicationViewQuery>,
) -> Result<Json<Vec<ApplicationListItem>>, ApiError> {
    let state = state_lock.read().await.clone();
    let (filters, sort) = view_from_query(&query)?;

    let snapshot = load_snapshot(&state.db, &authed.id).await?;
    let times = shortlist_times(&snapshot.selection_data);
    let visible = visible_applications(
        &snapshot.applications,
        &filters,
        sort,
        &state.config.roll_number_prefix,
        &times,
    );

    let shortlist = ShortlistData {
        selections: &snapshot.selections,
        selection_data: &snapshot.selection_data,
    };
    let items: Vec<ApplicationListItem> = visible
        .into_iter()
        .map(|app| list_item(app, &shortlist))
        .collect();

    info!(
        user_id = %authed.id,
        total = snapshot.applications.len(),
        visible = items.len(),
        sort = ?sort,
        "Applications view computed"
    );

    Ok(Json(items))
}

/// GET /api/applications/export - CSV of the filtered view
///
/// `mode=shortlisted` exports only applicants with at least one shortlisted subject.
pub async fn export_applications(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(query): Query<ApplicationViewQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let (filters, sort) = view_from_query(&query)?;
    let mode = match query.mode.as_deref() {
        Some(raw) => raw.parse::<ExportMode>().map_err(|e| {
            warn!(user_id = %authed.id, mode = raw, "Invalid export mode requested");
            ApiError::BadRequest(e)
        })?,
        None => ExportMode::default(),
    };

    let snapshot = load_snapshot(&state.db, &authed.id).await?;
    let times = shortlist_times(&snapshot.selection_data);
    let visible = visible_applications(
        &snapshot.applications,
        &filters,
        sort,
        &state.config.roll_number_prefix,
        &times,
    );
    let shortlist = ShortlistData {
        selections: &snapshot.selections,
        selection_data: &snapshot.selection_data,
    };

    let csv_content = export_csv(mode, &visible, shortlist);
    let filename = sanitize_filename(query.filename.as_deref(), mode.default_filename());

    info!(
        user_id = %authed.id,
        record_count = visible.len(),
        mode = ?mode,
        filename = %filename,
        "Applications exported successfully"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv_content,
    ))
}

/// GET /api/applications/categories - Course-year categories and their subjects
pub async fn get_categories(_authed: AuthedUser) -> Json<Vec<CategoryInfo>> {
    Json(
        Category::ALL
            .iter()
            .map(|category| CategoryInfo {
                name: category.as_str().to_string(),
                subjects: category.subjects().iter().map(|s| s.to_string()).collect(),
            })
            .collect(),
    )
}

/// GET /api/applications/:id - One application with parsed subjects
pub async fn get_application_details(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(application_id): Path<String>,
) -> Result<Json<ApplicationListItem>, ApiError> {
    let state = state_lock.read().await.clone();

    let application = fetch_application(&state.db, &application_id)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                application_id = %application_id,
                "Database error fetching application"
            );
            ApiError::DatabaseError(e)
        })?
        .ok_or_else(|| ApiError::NotFound("Application not found".to_string()))?;

    let (selections, selection_data) =
        crate::selections::services::SelectionService::new(state.db.clone())
            .keys_for_user(&authed.id)
            .await?;
    let shortlist = ShortlistData {
        selections: &selections,
        selection_data: &selection_data,
    };

    Ok(Json(list_item(&application, &shortlist)))
}
