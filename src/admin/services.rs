// src/admin/services.rs

use std::collections::HashSet;

use super::models::{DashboardStats, RecentApplication, StaffSort, StaffSummary};
use crate::applications::Application;
use crate::auth::StaffUser;
use crate::common::parse_timestamp;
use crate::selections::SelectionKey;

const RECENT_LIMIT: usize = 5;

/// Headline numbers for one staff member's dashboard
pub fn dashboard_stats(applications: &[Application], selections: &[String]) -> DashboardStats {
    let shortlisted: HashSet<String> = selections
        .iter()
        .filter_map(|raw| raw.parse::<SelectionKey>().ok())
        .map(|key| key.application_id)
        .collect();

    let total = applications.len();
    let selection_rate = if total == 0 {
        0
    } else {
        ((shortlisted.len() as f64 / total as f64) * 100.0).round() as u32
    };

    let mut recent: Vec<&Application> = applications.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    DashboardStats {
        total_applications: total,
        shortlisted_count: shortlisted.len(),
        selection_rate,
        recent_applications: recent
            .into_iter()
            .take(RECENT_LIMIT)
            .map(RecentApplication::from)
            .collect(),
    }
}

/// Orders staff for the admin list; ties keep database order
pub fn sort_staff(mut staff: Vec<StaffUser>, sort: StaffSort) -> Vec<StaffSummary> {
    let created = |user: &StaffUser| user.created_at.as_deref().and_then(parse_timestamp);

    match sort {
        StaffSort::NewestFirst => staff.sort_by(|a, b| created(b).cmp(&created(a))),
        StaffSort::OldestFirst => staff.sort_by(|a, b| created(a).cmp(&created(b))),
        StaffSort::Username => staff.sort_by(|a, b| {
            a.username
                .to_lowercase()
                .cmp(&b.username.to_lowercase())
        }),
        StaffSort::Role => staff.sort_by(|a, b| a.role.cmp(&b.role)),
    }

    staff
        .into_iter()
        .map(|user| StaffSummary {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: user.created_at,
        })
        .collect()
}
