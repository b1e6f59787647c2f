// src/applications/subjects.rs
//! Normalization of subject entries into `{name, grade, priority}`

use serde_json::{Map, Value};

use super::models::{Application, ParsedSubject, SubjectEntry};

pub const UNKNOWN_SUBJECT: &str = "Unknown";
pub const PLACEHOLDER: &str = "-";

const NAME_FIELDS: [&str; 4] = ["name", "subject", "code", "title"];
const GRADE_FIELDS: [&str; 3] = ["grade", "mark", "score"];

/// Parses one subject entry. Total: every shape yields a value.
pub fn parse_subject(entry: &SubjectEntry) -> ParsedSubject {
    match entry {
        SubjectEntry::Missing => unknown(),
        SubjectEntry::Name(name) if name.is_empty() => unknown(),
        SubjectEntry::Name(name) => ParsedSubject {
            name: name.clone(),
            grade: PLACEHOLDER.to_string(),
            priority: PLACEHOLDER.to_string(),
        },
        SubjectEntry::Record(fields) => parse_record(fields),
        SubjectEntry::Other(value) if !is_truthy(value) => unknown(),
        SubjectEntry::Other(value) => ParsedSubject {
            name: value.to_string(),
            grade: PLACEHOLDER.to_string(),
            priority: PLACEHOLDER.to_string(),
        },
    }
}

fn parse_record(fields: &Map<String, Value>) -> ParsedSubject {
    let name = first_text(fields, &NAME_FIELDS)
        .unwrap_or_else(|| Value::Object(fields.clone()).to_string());
    let grade = first_text(fields, &GRADE_FIELDS).unwrap_or_else(|| PLACEHOLDER.to_string());
    let priority = fields
        .get("priority")
        .and_then(value_text)
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    ParsedSubject {
        name,
        grade,
        priority,
    }
}

fn unknown() -> ParsedSubject {
    ParsedSubject {
        name: UNKNOWN_SUBJECT.to_string(),
        grade: PLACEHOLDER.to_string(),
        priority: PLACEHOLDER.to_string(),
    }
}

fn first_text(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find(|value| is_truthy(value))
        .and_then(value_text)
}

/// Empty strings, zero, false and null count as absent.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Parsed subjects of an application; empty when it has none usable.
pub fn parsed_subjects(application: &Application) -> Vec<ParsedSubject> {
    application
        .subjects()
        .map(|subjects| subjects.iter().map(parse_subject).collect())
        .unwrap_or_default()
}

/// Course code of a catalogue entry such as `23CSE211 - Design and Analysis of Algorithms`.
pub fn subject_code(subject: &str) -> &str {
    subject.split(" - ").next().unwrap_or(subject)
}

/// Subject names joined for display, `None` when there are no subjects.
pub fn format_subjects(application: &Application) -> String {
    let names: Vec<String> = parsed_subjects(application)
        .into_iter()
        .map(|subject| subject.name)
        .collect();

    if names.is_empty() {
        "None".to_string()
    } else {
        names.join(", ")
    }
}
