// src/applications/export.rs
//! CSV rendering of the current view. Pure functions of their inputs.

use std::collections::HashMap;
use std::str::FromStr;

use super::models::{Application, SelectionMeta};
use super::subjects::format_subjects;
use crate::selections::models::SelectionKey;

pub const DEFAULT_EXPORT_FILENAME: &str = "applications_list.csv";
pub const DEFAULT_SHORTLIST_FILENAME: &str = "shortlisted_students.csv";

const NOT_SHORTLISTED: &str = "Not shortlisted";

/// Which CSV to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportMode {
    #[default]
    Full,
    Shortlisted,
}

impl ExportMode {
    pub fn default_filename(&self) -> &'static str {
        match self {
            ExportMode::Full => DEFAULT_EXPORT_FILENAME,
            ExportMode::Shortlisted => DEFAULT_SHORTLIST_FILENAME,
        }
    }
}

impl FromStr for ExportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(ExportMode::Full),
            "shortlisted" => Ok(ExportMode::Shortlisted),
            _ => Err("Invalid mode. Use 'full' or 'shortlisted'".to_string()),
        }
    }
}

/// A staff member's selections, as handed to the exporter
#[derive(Debug, Clone, Copy)]
pub struct ShortlistData<'a> {
    /// Composite keys in display order
    pub selections: &'a [String],
    pub selection_data: &'a HashMap<String, SelectionMeta>,
}

impl<'a> ShortlistData<'a> {
    /// Subjects shortlisted for one application, in selection order
    pub fn subjects_for(&self, application_id: &str) -> Vec<String> {
        self.selections
            .iter()
            .filter_map(|raw| {
                let key: SelectionKey = raw.parse().ok()?;
                if key.application_id != application_id {
                    return None;
                }
                Some(
                    self.selection_data
                        .get(raw)
                        .map(|meta| meta.subject.clone())
                        .unwrap_or(key.subject),
                )
            })
            .collect()
    }
}

/// Quotes one cell, doubling embedded quotes
pub fn csv_cell(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn csv_row<S: AsRef<str>>(cells: &[S]) -> String {
    cells
        .iter()
        .map(|cell| csv_cell(cell.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// One row per application. The shortlisted column appears only when
/// selection data is supplied.
pub fn applications_csv(applications: &[&Application], shortlist: Option<ShortlistData<'_>>) -> String {
    let mut headers = vec!["Student Name", "Roll Number", "Email"];
    if shortlist.is_some() {
        headers.push("Shortlisted Subject(s)");
    }
    headers.extend(["Subjects", "Reason", "Internship", "Submitted Date"]);

    let mut lines = vec![csv_row(&headers)];

    for app in applications {
        let mut row = vec![
            app.student_name.clone(),
            app.roll_number.clone(),
            app.email.clone(),
        ];

        if let Some(data) = &shortlist {
            let shortlisted = data.subjects_for(&app.id);
            row.push(if shortlisted.is_empty() {
                NOT_SHORTLISTED.to_string()
            } else {
                shortlisted.join(", ")
            });
        }

        row.push(format_subjects(app));
        row.push(app.reason.clone().unwrap_or_default());
        row.push(app.internship.clone().unwrap_or_default());
        row.push(app.created_at.format("%Y-%m-%d").to_string());

        lines.push(csv_row(&row));
    }

    lines.join("\n")
}

/// One row per applicant with at least one shortlisted subject.
pub fn shortlisted_csv(applications: &[&Application], shortlist: ShortlistData<'_>) -> String {
    let mut lines = vec![csv_row(&["Name", "Roll Number", "Email", "Subjects"])];

    for app in applications {
        let shortlisted = shortlist.subjects_for(&app.id);
        if shortlisted.is_empty() {
            continue;
        }
        lines.push(csv_row(&[
            app.student_name.as_str(),
            app.roll_number.as_str(),
            app.email.as_str(),
            shortlisted.join(", ").as_str(),
        ]));
    }

    lines.join("\n")
}

/// Renders the CSV for `mode`
pub fn export_csv(
    mode: ExportMode,
    applications: &[&Application],
    shortlist: ShortlistData<'_>,
) -> String {
    match mode {
        ExportMode::Full => applications_csv(applications, Some(shortlist)),
        ExportMode::Shortlisted => shortlisted_csv(applications, shortlist),
    }
}

/// Restricts a caller supplied download name to a safe `.csv` file name.
pub fn sanitize_filename(requested: Option<&str>, default: &str) -> String {
    let cleaned: String = requested
        .unwrap_or_default()
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        default.to_string()
    } else if cleaned.to_lowercase().ends_with(".csv") {
        cleaned.to_string()
    } else {
        format!("{}.csv", cleaned)
    }
}
