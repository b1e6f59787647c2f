// src/selections/services.rs
//! Source of truth for shortlist selections

use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use super::models::{Selection, SelectionKey};
use crate::applications::models::SelectionMeta;
use crate::common::parse_timestamp;

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("Application not found: {0}")]
    ApplicationNotFound(String),

    #[error("Invalid subject: {0}")]
    InvalidSubject(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Outcome of a flip performed by [`SelectionService::toggle`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

impl ToggleOutcome {
    pub fn is_selected(&self) -> bool {
        matches!(self, ToggleOutcome::Added)
    }
}

#[derive(Debug, Clone)]
pub struct SelectionService {
    db: SqlitePool,
}

impl SelectionService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Flips membership of `(application_id, subject)` for one staff member.
    ///
    /// The add/remove decision is made here against stored state, never
    /// taken from the client.
    pub async fn toggle(
        &self,
        user_id: &str,
        application_id: &str,
        subject: &str,
    ) -> Result<ToggleOutcome, SelectionError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(SelectionError::InvalidSubject(
                "subject must not be empty".to_string(),
            ));
        }
        if subject.len() > 255 {
            return Err(SelectionError::InvalidSubject(
                "subject must not exceed 255 characters".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        let application_exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM applications WHERE id = ?")
                .bind(application_id)
                .fetch_one(&mut *tx)
                .await?;
        if application_exists == 0 {
            return Err(SelectionError::ApplicationNotFound(
                application_id.to_string(),
            ));
        }

        let existing: Option<String> = sqlx::query_scalar(
            "SELECT id FROM selections WHERE user_id = ? AND application_id = ? AND subject = ?",
        )
        .bind(user_id)
        .bind(application_id)
        .bind(subject)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = match existing {
            Some(selection_id) => {
                sqlx::query("DELETE FROM selections WHERE id = ?")
                    .bind(&selection_id)
                    .execute(&mut *tx)
                    .await?;
                ToggleOutcome::Removed
            }
            None => {
                sqlx::query(
                    "INSERT INTO selections (id, user_id, application_id, subject, created_at) VALUES (?, ?, ?, ?, ?)",
                )
                .bind(Uuid::new_v4().to_string())
                .bind(user_id)
                .bind(application_id)
                .bind(subject)
                .bind(Utc::now().to_rfc3339())
                .execute(&mut *tx)
                .await?;
                ToggleOutcome::Added
            }
        };

        tx.commit().await?;

        info!(
            user_id = %user_id,
            application_id = %application_id,
            subject = %subject,
            outcome = ?outcome,
            "Selection toggled"
        );

        Ok(outcome)
    }

    /// Selections of one staff member, newest first
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Selection>, SelectionError> {
        let selections = sqlx::query_as::<_, Selection>(
            "SELECT * FROM selections WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        debug!(
            user_id = %user_id,
            selection_count = selections.len(),
            "Loaded selections"
        );

        Ok(selections)
    }

    /// Composite keys plus per-key metadata, in the snapshot wire shape
    pub async fn keys_for_user(
        &self,
        user_id: &str,
    ) -> Result<(Vec<String>, HashMap<String, SelectionMeta>), SelectionError> {
        let selections = self.list_for_user(user_id).await?;

        let mut keys = Vec::with_capacity(selections.len());
        let mut data = HashMap::with_capacity(selections.len());
        for selection in selections {
            let key = SelectionKey::new(&selection.application_id, &selection.subject).to_string();
            if let Some(created_at) = parse_timestamp(&selection.created_at) {
                data.insert(
                    key.clone(),
                    SelectionMeta {
                        subject: selection.subject.clone(),
                        created_at,
                    },
                );
            }
            keys.push(key);
        }

        Ok((keys, data))
    }
}
