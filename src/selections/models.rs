// src/selections/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

pub const KEY_SEPARATOR: &str = "::";

/// `applicationId::subjectName`, one shortlist-able unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectionKey {
    pub application_id: String,
    pub subject: String,
}

impl SelectionKey {
    pub fn new(application_id: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            subject: subject.into(),
        }
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.application_id, KEY_SEPARATOR, self.subject)
    }
}

impl FromStr for SelectionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_once(KEY_SEPARATOR)
            .map(|(application_id, subject)| SelectionKey::new(application_id, subject))
            .ok_or_else(|| format!("'{}' is not an applicationId::subject key", s))
    }
}

/// Row of the `selections` table
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Selection {
    pub id: String,
    pub user_id: String,
    pub application_id: String,
    pub subject: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleSelectionRequest {
    pub application_id: String,
    pub subject: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleSelectionResponse {
    pub success: bool,
    /// Membership after the server applied its own flip
    pub selected: bool,
}
