// src/applications/sorting.rs
//! Stable ordering of the filtered application list

use std::cmp::Ordering;
use std::str::FromStr;

use super::models::Application;
use super::ranking::{grade_rank, RankingContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Date,
    RollNumber,
    Grade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Newest first unless the user picks otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "date" | "created_at" => Ok(SortKey::Date),
            "rollNumber" | "roll_number" => Ok(SortKey::RollNumber),
            "grade" => Ok(SortKey::Grade),
            other => Err(format!(
                "Invalid sort key '{}'. Use 'date', 'roll_number' or 'grade'",
                other
            )),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("Invalid sort direction '{}'. Use 'asc' or 'desc'", other)),
        }
    }
}

/// Sorts the filtered list. Ties keep their input order in both directions.
pub fn sort_applications<'a>(
    applications: Vec<&'a Application>,
    sort: SortState,
    ctx: &RankingContext<'_>,
) -> Vec<&'a Application> {
    let mut keyed: Vec<(f64, &'a Application)> = applications
        .into_iter()
        .map(|app| {
            let rank = match sort.key {
                SortKey::Grade => grade_rank(app, ctx),
                _ => 0.0,
            };
            (rank, app)
        })
        .collect();

    keyed.sort_by(|(rank_a, a), (rank_b, b)| {
        let ordering = compare(sort.key, (*rank_a, a), (*rank_b, b));
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    keyed.into_iter().map(|(_, app)| app).collect()
}

fn compare(key: SortKey, a: (f64, &Application), b: (f64, &Application)) -> Ordering {
    match key {
        SortKey::Date => a.1.created_at.cmp(&b.1.created_at),
        SortKey::RollNumber => a.1.roll_number.cmp(&b.1.roll_number),
        SortKey::Grade => a.0.total_cmp(&b.0),
    }
}
