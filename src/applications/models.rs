// src/applications/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use std::collections::HashMap;
use tracing::warn;

use crate::common::parse_timestamp;

// ============================================================================
// Subject entries
// ============================================================================

/// One entry of an application's `selected_subjects` list, as submitted.
///
/// The intake form has produced bare strings, objects with varying keys and
/// the occasional null over time; the shape is decided once here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubjectEntry {
    Missing,
    Name(String),
    Record(Map<String, Value>),
    Other(Value),
}

/// Normalized view of a [`SubjectEntry`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedSubject {
    pub name: String,
    pub grade: String,
    pub priority: String,
}

/// Decodes `selected_subjects`; anything that is not a list means "no usable subjects".
pub fn deserialize_subject_list<'de, D>(deserializer: D) -> Result<Option<Vec<SubjectEntry>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(subject_list_from_value))
}

pub fn subject_list_from_value(value: Value) -> Option<Vec<SubjectEntry>> {
    match value {
        Value::Array(items) => Some(items.into_iter().map(SubjectEntry::from).collect()),
        _ => None,
    }
}

impl From<Value> for SubjectEntry {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => SubjectEntry::Missing,
            Value::String(s) => SubjectEntry::Name(s),
            Value::Object(map) => SubjectEntry::Record(map),
            other => SubjectEntry::Other(other),
        }
    }
}

// ============================================================================
// Application Models
// ============================================================================

/// Row as stored in the `applications` table
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRow {
    pub id: String,
    pub created_at: String,
    pub student_name: String,
    pub roll_number: String,
    pub email: String,
    pub reason: Option<String>,
    pub internship: Option<String>,
    pub selected_subjects: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub roll_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub internship: Option<String>,
    #[serde(default, deserialize_with = "deserialize_subject_list")]
    pub selected_subjects: Option<Vec<SubjectEntry>>,
}

impl Application {
    /// Subjects usable for filtering and ranking; `None` when the list is absent or empty.
    pub fn subjects(&self) -> Option<&[SubjectEntry]> {
        self.selected_subjects
            .as_deref()
            .filter(|subjects| !subjects.is_empty())
    }
}

impl From<ApplicationRow> for Application {
    fn from(row: ApplicationRow) -> Self {
        let created_at = parse_timestamp(&row.created_at).unwrap_or_else(|| {
            warn!(
                application_id = %row.id,
                created_at = %row.created_at,
                "Unparseable application timestamp, falling back to epoch"
            );
            DateTime::<Utc>::UNIX_EPOCH
        });

        let selected_subjects = row.selected_subjects.as_deref().and_then(|raw| {
            match serde_json::from_str::<Value>(raw) {
                Ok(value) => subject_list_from_value(value),
                Err(e) => {
                    warn!(
                        application_id = %row.id,
                        error = %e,
                        "selected_subjects is not valid JSON, treating as a single subject name"
                    );
                    Some(vec![SubjectEntry::Name(raw.to_string())])
                }
            }
        });

        Application {
            id: row.id,
            created_at,
            student_name: row.student_name,
            roll_number: row.roll_number,
            email: row.email,
            reason: row.reason,
            internship: row.internship,
            selected_subjects,
        }
    }
}

// ============================================================================
// Selection metadata shared with the snapshot
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionMeta {
    pub subject: String,
    pub created_at: DateTime<Utc>,
}

/// Everything the dashboard needs in one fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationsSnapshot {
    #[serde(default)]
    pub applications: Vec<Application>,
    #[serde(default)]
    pub selections: Vec<String>,
    #[serde(default, rename = "selectionData")]
    pub selection_data: HashMap<String, SelectionMeta>,
}

// ============================================================================
// Request / response models
// ============================================================================

/// Query string shared by the view and export endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ApplicationViewQuery {
    pub q: Option<String>,
    pub batch: Option<String>,
    pub category: Option<String>,
    /// Comma separated subject filters, in selection order
    pub subjects: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    /// `full` (default) or `shortlisted`
    pub mode: Option<String>,
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationListItem {
    #[serde(flatten)]
    pub application: Application,
    pub subjects: Vec<ParsedSubject>,
    pub shortlisted_subjects: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryInfo {
    pub name: String,
    pub subjects: Vec<String>,
}
