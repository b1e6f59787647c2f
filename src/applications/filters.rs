// src/applications/filters.rs
//! Filter engine: search, batch, course-year category and subject filters

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::models::Application;
use super::subjects::{parsed_subjects, subject_code};

/// Named bucket of course codes offered in one year of the programme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    FirstYear,
    SecondYear,
    ThirdYear,
    ThirdYearFreeElectives,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::FirstYear,
        Category::SecondYear,
        Category::ThirdYear,
        Category::ThirdYearFreeElectives,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::FirstYear => "First Year",
            Category::SecondYear => "Second Year",
            Category::ThirdYear => "Third Year",
            Category::ThirdYearFreeElectives => "Third Year Free Electives",
        }
    }

    pub fn subjects(&self) -> &'static [&'static str] {
        match self {
            Category::FirstYear => &["23CSE111", "23CSE113"],
            Category::SecondYear => &["23CSE211", "23CSE212", "23CSE213", "23CSE214"],
            Category::ThirdYear => &["23CSE311", "23CSE312", "23CSE313", "23CSE314"],
            Category::ThirdYearFreeElectives => &[
                "23CSE475", "23CSE461", "23CSE465", "23CSE363", "23CSE473", "23CSE452",
                "23CSE334", "23CSE365",
            ],
        }
    }

    pub fn codes(&self) -> impl Iterator<Item = &'static str> {
        self.subjects().iter().map(|subject| subject_code(subject))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown category '{}'", wanted))
    }
}

/// Transient filter selection of one dashboard view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub query: String,
    pub batch: Option<String>,
    category: Option<Category>,
    subjects: Vec<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    /// Subject filters in the order they were chosen
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// `None`, an empty string or `All` clears the batch filter.
    pub fn set_batch(&mut self, batch: Option<&str>) {
        self.batch = batch
            .map(str::trim)
            .filter(|b| !b.is_empty() && !b.eq_ignore_ascii_case("all"))
            .map(str::to_string);
    }

    /// Changing the category always clears the subject filters.
    pub fn set_category(&mut self, category: Option<Category>) {
        self.category = category;
        self.subjects.clear();
    }

    pub fn add_subject(&mut self, subject: &str) {
        let subject = subject.trim();
        if !subject.is_empty() && !self.subjects.iter().any(|s| s == subject) {
            self.subjects.push(subject.to_string());
        }
    }

    pub fn remove_subject(&mut self, subject: &str) {
        self.subjects.retain(|s| s != subject);
    }

    pub fn clear_subjects(&mut self) {
        self.subjects.clear();
    }

    /// Subjects offered for explicit filtering under the current category
    pub fn available_subjects(&self) -> Vec<&'static str> {
        match self.category {
            Some(category) => category.subjects().to_vec(),
            None => Category::ALL
                .iter()
                .flat_map(|category| category.subjects().iter().copied())
                .collect(),
        }
    }
}

/// Applications satisfying every active predicate, in input order.
pub fn filter_applications<'a>(
    applications: &'a [Application],
    filters: &FilterState,
    roll_number_prefix: &str,
) -> Vec<&'a Application> {
    let query = filters.query.trim().to_lowercase();
    let batch_prefix = filters
        .batch
        .as_ref()
        .map(|batch| format!("{}{}", roll_number_prefix, batch));

    applications
        .iter()
        .filter(|app| matches_search(app, &query))
        .filter(|app| {
            batch_prefix
                .as_deref()
                .map_or(true, |prefix| app.roll_number.starts_with(prefix))
        })
        .filter(|app| {
            filters
                .category
                .map_or(true, |category| matches_any_code(app, category.codes()))
        })
        .filter(|app| {
            filters.subjects.is_empty()
                || matches_any_code(app, filters.subjects.iter().map(|s| subject_code(s)))
        })
        .collect()
}

fn matches_search(application: &Application, query: &str) -> bool {
    query.is_empty()
        || application.student_name.to_lowercase().contains(query)
        || application.roll_number.to_lowercase().contains(query)
}

/// True when any parsed subject name contains any of the codes.
///
/// Containment rather than equality: a code that prefixes a longer one also matches it.
fn matches_any_code<'c>(application: &Application, codes: impl Iterator<Item = &'c str>) -> bool {
    let names: Vec<String> = parsed_subjects(application)
        .into_iter()
        .map(|subject| subject.name)
        .collect();
    if names.is_empty() {
        return false;
    }

    let codes: Vec<&str> = codes.collect();
    codes
        .iter()
        .any(|code| names.iter().any(|name| name.contains(code)))
}
