// src/applications/view.rs
//! fetch → filter → sort pipeline shared by the API and the dashboard client

use std::collections::HashMap;

use super::filters::{filter_applications, FilterState};
use super::models::{Application, SelectionMeta};
use super::ranking::{RankingContext, ShortlistTimes};
use super::sorting::{sort_applications, SortState};
use crate::selections::models::SelectionKey;

/// Shortlist timestamps keyed by application, from confirmed selection data
pub fn shortlist_times(selection_data: &HashMap<String, SelectionMeta>) -> ShortlistTimes {
    let mut times = ShortlistTimes::new();
    for (raw_key, meta) in selection_data {
        if let Ok(key) = raw_key.parse::<SelectionKey>() {
            times.insert(&key.application_id, &meta.subject, meta.created_at);
        }
    }
    times
}

/// Applications matching `filters`, ordered by `sort`
pub fn visible_applications<'a>(
    applications: &'a [Application],
    filters: &FilterState,
    sort: SortState,
    roll_number_prefix: &str,
    times: &ShortlistTimes,
) -> Vec<&'a Application> {
    let filtered = filter_applications(applications, filters, roll_number_prefix);
    let ctx = RankingContext {
        subject_filters: filters.subjects(),
        shortlist_times: times,
    };
    sort_applications(filtered, sort, &ctx)
}
