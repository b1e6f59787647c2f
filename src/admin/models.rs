// src/admin/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::applications::Application;

// ============================================================================
// Dashboard statistics
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentApplication {
    pub id: String,
    pub student_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Application> for RecentApplication {
    fn from(app: &Application) -> Self {
        Self {
            id: app.id.clone(),
            student_name: app.student_name.clone(),
            email: app.email.clone(),
            created_at: app.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_applications: usize,
    /// Distinct applications the caller shortlisted at least one subject for
    pub shortlisted_count: usize,
    /// Whole percent of applications shortlisted
    pub selection_rate: u32,
    pub recent_applications: Vec<RecentApplication>,
}

// ============================================================================
// Staff list
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct StaffListQuery {
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaffSort {
    #[default]
    NewestFirst,
    OldestFirst,
    Username,
    Role,
}

impl FromStr for StaffSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "created_at-desc" => Ok(StaffSort::NewestFirst),
            "created_at-asc" => Ok(StaffSort::OldestFirst),
            "username-asc" => Ok(StaffSort::Username),
            "role-asc" => Ok(StaffSort::Role),
            other => Err(format!(
                "Invalid sort '{}'. Use created_at-desc, created_at-asc, username-asc or role-asc",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffSummary {
    pub id: String,
    pub username: String,
    pub role: String,
    pub created_at: Option<String>,
}
