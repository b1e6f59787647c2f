// src/applications/ranking.rs
//! Grade scale and per-application grade rank used by the grade sort

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::models::Application;
use super::subjects::{parse_subject, subject_code};

/// Rank of `-` and of any unrecognized grade token
pub const UNKNOWN_GRADE: f64 = -1.0;
/// Rank of an application without usable subjects; below every grade
pub const NO_SUBJECTS_RANK: f64 = -2.0;

/// Numeric value of a grade token on the ten point scale.
pub fn grade_value(grade: &str) -> f64 {
    let token = grade.trim().to_uppercase();
    match token.as_str() {
        "O" => 10.0,
        "A+" => 9.5,
        "A" => 9.0,
        "B+" => 8.0,
        "B" => 7.0,
        "C" => 6.0,
        "P" => 5.0,
        "F" => 0.0,
        _ => token
            .parse::<f64>()
            .ok()
            .filter(|value| (0.0..=10.0).contains(value))
            .unwrap_or(UNKNOWN_GRADE),
    }
}

/// When each subject of an application was shortlisted
#[derive(Debug, Clone, Default)]
pub struct ShortlistTimes {
    by_application: HashMap<String, Vec<(String, DateTime<Utc>)>>,
}

impl ShortlistTimes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a timestamp; a later call for the same subject replaces it.
    pub fn insert(&mut self, application_id: &str, subject: &str, at: DateTime<Utc>) {
        let entries = self
            .by_application
            .entry(application_id.to_string())
            .or_default();
        match entries.iter_mut().find(|(s, _)| s == subject) {
            Some(entry) => entry.1 = at,
            None => entries.push((subject.to_string(), at)),
        }
    }

    /// Subjects of the application, most recently shortlisted first
    pub fn most_recent_first(&self, application_id: &str) -> Vec<&str> {
        let mut entries: Vec<&(String, DateTime<Utc>)> = self
            .by_application
            .get(application_id)
            .map(|entries| entries.iter().collect())
            .unwrap_or_default();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.into_iter().map(|(subject, _)| subject.as_str()).collect()
    }
}

/// Inputs to [`grade_rank`] beyond the application itself
#[derive(Debug, Clone, Copy)]
pub struct RankingContext<'a> {
    pub subject_filters: &'a [String],
    pub shortlist_times: &'a ShortlistTimes,
}

/// Comparable score of the application's most relevant subject.
///
/// Active subject filters win, then the most recently shortlisted subject,
/// then the applicant's top stated priority, then the best grade overall.
pub fn grade_rank(application: &Application, ctx: &RankingContext<'_>) -> f64 {
    let Some(entries) = application.subjects() else {
        return NO_SUBJECTS_RANK;
    };
    let subjects: Vec<_> = entries.iter().map(parse_subject).collect();

    if !ctx.subject_filters.is_empty() {
        let first_hit = ctx.subject_filters.iter().find_map(|filter| {
            let code = subject_code(filter);
            subjects.iter().find(|subject| subject.name.contains(code))
        });
        if let Some(subject) = first_hit {
            return grade_value(&subject.grade);
        }
    }

    let recent_hit = ctx
        .shortlist_times
        .most_recent_first(&application.id)
        .into_iter()
        .find_map(|shortlisted| subjects.iter().find(|subject| subject.name == shortlisted));
    if let Some(subject) = recent_hit {
        return grade_value(&subject.grade);
    }

    let preferred = subjects
        .iter()
        .filter_map(|subject| {
            subject
                .priority
                .trim()
                .parse::<f64>()
                .ok()
                .map(|priority| (priority, subject))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0));
    if let Some((_, subject)) = preferred {
        return grade_value(&subject.grade);
    }

    subjects
        .iter()
        .map(|subject| grade_value(&subject.grade))
        .fold(UNKNOWN_GRADE, f64::max)
}
