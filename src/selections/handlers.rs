// src/selections/handlers.rs

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use super::models::{ToggleSelectionRequest, ToggleSelectionResponse};
use super::services::{SelectionError, SelectionService};
use crate::applications::export::ShortlistData;
use crate::applications::models::ApplicationListItem;
use crate::applications::services::load_snapshot;
use crate::applications::subjects::parsed_subjects;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};

/// POST /api/selections/toggle - Flip one (application, subject) shortlist entry
///
/// The server decides add vs remove from stored state.
pub async fn toggle_selection(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<ToggleSelectionRequest>,
) -> Result<Json<ToggleSelectionResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let outcome = SelectionService::new(state.db.clone())
        .toggle(&authed.id, &request.application_id, &request.subject)
        .await
        .map_err(|e| {
            if !matches!(e, SelectionError::DatabaseError(_)) {
                warn!(
                    user_id = %authed.id,
                    application_id = %request.application_id,
                    error = %e,
                    "Selection toggle rejected"
                );
            }
            ApiError::from(e)
        })?;

    Ok(Json(ToggleSelectionResponse {
        success: true,
        selected: outcome.is_selected(),
    }))
}

/// GET /api/selections/shortlisted - Applications the caller has shortlisted
pub async fn get_shortlisted_applications(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<ApplicationListItem>>, ApiError> {
    let state = state_lock.read().await.clone();

    let snapshot = load_snapshot(&state.db, &authed.id).await?;
    let shortlist = ShortlistData {
        selections: &snapshot.selections,
        selection_data: &snapshot.selection_data,
    };

    let items = snapshot
        .applications
        .iter()
        .filter_map(|application| {
            let shortlisted = shortlist.subjects_for(&application.id);
            if shortlisted.is_empty() {
                return None;
            }
            Some(ApplicationListItem {
                application: application.clone(),
                subjects: parsed_subjects(application),
                shortlisted_subjects: shortlisted,
            })
        })
        .collect();

    Ok(Json(items))
}
