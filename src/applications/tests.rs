//! Tests for applications module
//!
//! These tests verify the pure pipeline behind the dashboard:
//! - Subject parsing of every stored shape
//! - Search, batch, category and subject filters
//! - Grade ranking and stable sorting
//! - CSV export and filename handling

#[cfg(test)]
mod tests {
    use super::super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use export::{applications_csv, sanitize_filename, shortlisted_csv, ShortlistData};
    use filters::{filter_applications, Category, FilterState};
    use models::{ApplicationRow, ApplicationViewQuery, ParsedSubject};
    use ranking::{grade_rank, grade_value, RankingContext, ShortlistTimes, NO_SUBJECTS_RANK};
    use serde_json::json;
    use sorting::{sort_applications, SortDirection, SortKey, SortState};
    use std::collections::HashMap;
    use subjects::{format_subjects, parse_subject, subject_code};

    const PREFIX: &str = "CB.SC.U4CSE";

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, d, 10, 0, 0).unwrap()
    }

    fn app(id: &str, name: &str, roll: &str, subjects: serde_json::Value) -> Application {
        Application {
            id: id.to_string(),
            created_at: day(1),
            student_name: name.to_string(),
            roll_number: roll.to_string(),
            email: format!("{}@students.example.edu", id),
            reason: Some("Enjoy teaching".to_string()),
            internship: None,
            selected_subjects: models::subject_list_from_value(subjects),
        }
    }

    fn graded(id: &str, grade: &str) -> Application {
        app(
            id,
            id,
            &format!("{}23{}", PREFIX, id),
            json!([{ "name": "23CSE211 - DAA", "grade": grade }]),
        )
    }

    fn no_times() -> ShortlistTimes {
        ShortlistTimes::new()
    }

    fn ids(apps: &[&Application]) -> Vec<String> {
        apps.iter().map(|a| a.id.clone()).collect()
    }

    /// Minimal RFC 4180 reader used to check the exporter's quoting
    fn parse_csv(text: &str) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        let mut row = Vec::new();
        let mut cell = String::new();
        let mut in_quotes = false;
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            match (c, in_quotes) {
                ('"', true) if chars.peek() == Some(&'"') => {
                    cell.push('"');
                    chars.next();
                }
                ('"', _) => in_quotes = !in_quotes,
                (',', false) => row.push(std::mem::take(&mut cell)),
                ('\n', false) => {
                    row.push(std::mem::take(&mut cell));
                    rows.push(std::mem::take(&mut row));
                }
                (other, _) => cell.push(other),
            }
        }
        row.push(cell);
        rows.push(row);
        rows
    }

    // ------------------------------------------------------------------
    // Subject parsing
    // ------------------------------------------------------------------

    #[test]
    fn test_parse_subject_handles_every_shape() {
        let cases = vec![
            (json!(null), "Unknown", "-", "-"),
            (json!(""), "Unknown", "-", "-"),
            (json!("Math"), "Math", "-", "-"),
            (json!({ "name": "DAA", "grade": "A", "priority": 1 }), "DAA", "A", "1"),
            (json!({ "subject": "OS", "mark": "B+" }), "OS", "B+", "-"),
            (json!({ "name": "", "code": "23CSE212" }), "23CSE212", "-", "-"),
            (json!({ "title": "Networks", "score": 8 }), "Networks", "8", "-"),
            (json!(0), "Unknown", "-", "-"),
            (json!(false), "Unknown", "-", "-"),
            (json!(42), "42", "-", "-"),
        ];

        for (value, name, grade, priority) in cases {
            let parsed = parse_subject(&SubjectEntry::from(value.clone()));
            assert_eq!(
                parsed,
                ParsedSubject {
                    name: name.to_string(),
                    grade: grade.to_string(),
                    priority: priority.to_string(),
                },
                "input {}",
                value
            );
        }
    }

    #[test]
    fn test_parse_record_without_name_fields_uses_json_text() {
        let parsed = parse_subject(&SubjectEntry::from(json!({ "grade": "O" })));
        assert_eq!(parsed.name, r#"{"grade":"O"}"#);
        assert_eq!(parsed.grade, "O");
    }

    #[test]
    fn test_subject_list_deserialization_tolerates_bad_shapes() {
        let raw = json!({
            "id": "a1",
            "created_at": "2024-07-01T10:00:00Z",
            "student_name": "Asha",
            "roll_number": "CB.SC.U4CSE23001",
            "email": "asha@example.edu",
            "selected_subjects": "not a list"
        });
        let application: Application = serde_json::from_value(raw).unwrap();
        assert!(application.selected_subjects.is_none());
        assert!(application.subjects().is_none());

        let raw = json!({
            "id": "a2",
            "created_at": "2024-07-01T10:00:00Z",
            "selected_subjects": ["Math", null, { "name": "DAA" }]
        });
        let application: Application = serde_json::from_value(raw).unwrap();
        assert_eq!(application.subjects().map(|s| s.len()), Some(3));
        assert_eq!(format_subjects(&application), "Math, Unknown, DAA");
    }

    #[test]
    fn test_application_row_conversion() {
        let row = ApplicationRow {
            id: "a1".to_string(),
            created_at: "2024-07-01 10:00:00".to_string(),
            student_name: "Asha".to_string(),
            roll_number: "CB.SC.U4CSE23001".to_string(),
            email: "asha@example.edu".to_string(),
            reason: None,
            internship: None,
            selected_subjects: Some(r#"[{"name":"23CSE211 - DAA","grade":"A"}]"#.to_string()),
        };
        let application = Application::from(row.clone());
        assert_eq!(application.created_at, day(1));
        assert_eq!(format_subjects(&application), "23CSE211 - DAA");

        let broken = ApplicationRow {
            created_at: "yesterday".to_string(),
            selected_subjects: Some("Math".to_string()),
            ..row
        };
        let application = Application::from(broken);
        assert_eq!(application.created_at, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(format_subjects(&application), "Math");
    }

    #[test]
    fn test_empty_subject_list_counts_as_none() {
        let application = app("a1", "Asha", "x", json!([]));
        assert!(application.subjects().is_none());
        assert_eq!(format_subjects(&application), "None");
    }

    #[test]
    fn test_subject_code() {
        assert_eq!(subject_code("23CSE211 - Design and Analysis of Algorithms"), "23CSE211");
        assert_eq!(subject_code("23CSE211"), "23CSE211");
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    #[test]
    fn test_category_filter_matches_catalogue_code() {
        let apps = vec![app(
            "app1",
            "Asha",
            "CB.SC.U4CSE23001",
            json!([{ "name": "23CSE211 - DAA", "grade": "A" }]),
        )];
        let mut filters = FilterState::new();
        filters.set_category(Some(Category::SecondYear));

        let visible = filter_applications(&apps, &filters, PREFIX);
        assert_eq!(ids(&visible), vec!["app1"]);
    }

    #[test]
    fn test_category_filter_excludes_missing_subjects() {
        let apps = vec![app("app1", "Asha", "CB.SC.U4CSE23001", json!(null))];

        for category in Category::ALL {
            let mut filters = FilterState::new();
            filters.set_category(Some(category));
            assert!(filter_applications(&apps, &filters, PREFIX).is_empty());
        }
    }

    #[test]
    fn test_search_matches_name_or_roll_case_insensitively() {
        let apps = vec![
            app("a1", "Asha Menon", "CB.SC.U4CSE23001", json!(["Math"])),
            app("a2", "Ravi", "CB.SC.U4CSE22042", json!(["Math"])),
        ];
        let mut filters = FilterState::new();

        filters.set_query("MENON");
        assert_eq!(ids(&filter_applications(&apps, &filters, PREFIX)), vec!["a1"]);

        filters.set_query("u4cse22");
        assert_eq!(ids(&filter_applications(&apps, &filters, PREFIX)), vec!["a2"]);

        filters.set_query("");
        assert_eq!(filter_applications(&apps, &filters, PREFIX).len(), 2);
    }

    #[test]
    fn test_batch_filter_uses_roll_number_prefix() {
        let apps = vec![
            app("a1", "Asha", "CB.SC.U4CSE23001", json!(["Math"])),
            app("a2", "Ravi", "CB.SC.U4CSE22042", json!(["Math"])),
            app("a3", "Mira", "CB.EN.U4CSE23007", json!(["Math"])),
        ];
        let mut filters = FilterState::new();
        filters.set_batch(Some("23"));
        assert_eq!(ids(&filter_applications(&apps, &filters, PREFIX)), vec!["a1"]);

        filters.set_batch(Some("All"));
        assert!(filters.batch.is_none());
        assert_eq!(filter_applications(&apps, &filters, PREFIX).len(), 3);
    }

    #[test]
    fn test_subject_filters_match_any_selected_code() {
        let apps = vec![
            app("a1", "Asha", "r1", json!(["23CSE211 - DAA"])),
            app("a2", "Ravi", "r2", json!(["23CSE212 - Principles of Functional Languages"])),
            app("a3", "Mira", "r3", json!(["23CSE311 - Software Engineering"])),
        ];
        let mut filters = FilterState::new();
        filters.set_category(Some(Category::SecondYear));
        filters.add_subject("23CSE211 - Design and Analysis of Algorithms");
        filters.add_subject("23CSE212");
        filters.add_subject("23CSE212");

        assert_eq!(filters.subjects().len(), 2);
        assert_eq!(ids(&filter_applications(&apps, &filters, PREFIX)), vec!["a1", "a2"]);

        filters.remove_subject("23CSE212");
        assert_eq!(ids(&filter_applications(&apps, &filters, PREFIX)), vec!["a1"]);
    }

    #[test]
    fn test_changing_category_clears_subject_filters() {
        let mut filters = FilterState::new();
        filters.add_subject("23CSE211");
        filters.set_category(Some(Category::ThirdYear));
        assert!(filters.subjects().is_empty());
        assert_eq!(filters.available_subjects().len(), 4);

        filters.set_category(None);
        assert_eq!(filters.available_subjects().len(), 18);
    }

    #[test]
    fn test_code_containment_also_matches_longer_codes() {
        // A code that prefixes a longer one matches it as well.
        let apps = vec![app("a1", "Asha", "r1", json!(["23CSE2110 - Seminar"]))];
        let mut filters = FilterState::new();
        filters.add_subject("23CSE211");

        assert_eq!(filter_applications(&apps, &filters, PREFIX).len(), 1);
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("second year".parse::<Category>(), Ok(Category::SecondYear));
        assert_eq!(
            "Third Year Free Electives".parse::<Category>(),
            Ok(Category::ThirdYearFreeElectives)
        );
        assert!("Fourth Year".parse::<Category>().is_err());
    }

    #[test]
    fn test_stacking_filters_never_grows_the_result() {
        let apps = vec![
            app("a1", "Asha", &format!("{}23001", PREFIX), json!([{ "name": "23CSE211 - DAA", "grade": "A" }])),
            app("a2", "Aravind", &format!("{}23002", PREFIX), json!(null)),
            app("a3", "Kavya", &format!("{}23003", PREFIX), json!("23CSE211 - DAA")),
            app("a4", "Nandana", &format!("{}23004", PREFIX), json!([null, 0, false, "23CSE111"])),
            app("a5", "Arjun", &format!("{}22005", PREFIX), json!(["23CSE212 - OS"])),
            app("a6", "Maya", &format!("{}23006", PREFIX), json!(["23CSE214 - DBMS"])),
        ];

        let steps: [fn(&mut FilterState); 4] = [
            |f| f.set_query("a"),
            |f| f.set_batch(Some("23")),
            |f| f.set_category(Some(Category::SecondYear)),
            |f| f.add_subject("23CSE211"),
        ];

        let mut filters = FilterState::new();
        let mut previous = ids(&filter_applications(&apps, &filters, PREFIX));
        let mut counts = vec![previous.len()];
        for step in steps {
            step(&mut filters);
            let current = ids(&filter_applications(&apps, &filters, PREFIX));
            assert!(
                current.iter().all(|id| previous.contains(id)),
                "{:?} is not a subset of {:?}",
                current,
                previous
            );
            counts.push(current.len());
            previous = current;
        }

        assert_eq!(counts, vec![6, 6, 5, 2, 1]);
        assert_eq!(previous, vec!["a1"]);
    }

    // ------------------------------------------------------------------
    // Ranking and sorting
    // ------------------------------------------------------------------

    #[test]
    fn test_grade_scale() {
        assert_eq!(grade_value("O"), 10.0);
        assert_eq!(grade_value("a+"), 9.5);
        assert_eq!(grade_value("A"), 9.0);
        assert_eq!(grade_value("B+"), 8.0);
        assert_eq!(grade_value("B"), 7.0);
        assert_eq!(grade_value("C"), 6.0);
        assert_eq!(grade_value("P"), 5.0);
        assert_eq!(grade_value("F"), 0.0);
        assert_eq!(grade_value("8.5"), 8.5);
        assert_eq!(grade_value("-"), -1.0);
        assert_eq!(grade_value("Z"), -1.0);
        assert_eq!(grade_value("42"), -1.0);
    }

    #[test]
    fn test_grade_scale_is_monotonic() {
        let ladder = ["F", "P", "C", "B", "B+", "A", "A+", "O"];
        for pair in ladder.windows(2) {
            assert!(grade_value(pair[0]) < grade_value(pair[1]), "{:?}", pair);
        }
        assert!(grade_value("-") < grade_value("F"));
    }

    #[test]
    fn test_grade_sort_descending() {
        let apps = vec![graded("a", "A"), graded("o", "O"), graded("dash", "-")];
        let times = no_times();
        let ctx = RankingContext {
            subject_filters: &[],
            shortlist_times: &times,
        };

        let sorted = sort_applications(
            apps.iter().collect(),
            SortState::new(SortKey::Grade, SortDirection::Desc),
            &ctx,
        );
        assert_eq!(ids(&sorted), vec!["o", "a", "dash"]);
    }

    #[test]
    fn test_no_subjects_rank_below_unknown_grade() {
        let empty = app("e", "e", "r", json!(null));
        let times = no_times();
        let ctx = RankingContext {
            subject_filters: &[],
            shortlist_times: &times,
        };
        assert_eq!(grade_rank(&empty, &ctx), NO_SUBJECTS_RANK);
        assert!(grade_rank(&empty, &ctx) < grade_rank(&graded("d", "-"), &ctx));
    }

    #[test]
    fn test_grade_rank_prefers_subject_filter_then_shortlist_then_priority() {
        let application = app(
            "a1",
            "Asha",
            "r1",
            json!([
                { "name": "23CSE211 - DAA", "grade": "B", "priority": 2 },
                { "name": "23CSE212 - PFL", "grade": "A", "priority": 1 },
                { "name": "23CSE213 - CN", "grade": "O", "priority": 3 }
            ]),
        );

        let mut times = ShortlistTimes::new();
        let filters = vec!["23CSE211".to_string()];
        let ctx = RankingContext {
            subject_filters: &filters,
            shortlist_times: &times,
        };
        assert_eq!(grade_rank(&application, &ctx), 7.0);

        times.insert("a1", "23CSE212 - PFL", day(2));
        times.insert("a1", "23CSE213 - CN", day(3));
        let ctx = RankingContext {
            subject_filters: &[],
            shortlist_times: &times,
        };
        assert_eq!(grade_rank(&application, &ctx), 10.0);

        let empty = ShortlistTimes::new();
        let ctx = RankingContext {
            subject_filters: &[],
            shortlist_times: &empty,
        };
        assert_eq!(grade_rank(&application, &ctx), 9.0);
    }

    #[test]
    fn test_grade_rank_falls_back_to_best_grade() {
        let application = app(
            "a1",
            "Asha",
            "r1",
            json!([{ "name": "X", "grade": "C" }, { "name": "Y", "grade": "A+" }, "Z"]),
        );
        let times = no_times();
        let filters = vec!["23CSE999".to_string()];
        let ctx = RankingContext {
            subject_filters: &filters,
            shortlist_times: &times,
        };
        assert_eq!(grade_rank(&application, &ctx), 9.5);
    }

    #[test]
    fn test_sort_is_stable_in_both_directions() {
        let mut apps = vec![graded("first", "A"), graded("second", "A"), graded("third", "B")];
        apps[2].created_at = day(5);
        let times = no_times();
        let ctx = RankingContext {
            subject_filters: &[],
            shortlist_times: &times,
        };

        let asc = sort_applications(
            apps.iter().collect(),
            SortState::new(SortKey::Date, SortDirection::Asc),
            &ctx,
        );
        assert_eq!(ids(&asc), vec!["first", "second", "third"]);

        let desc = sort_applications(
            apps.iter().collect(),
            SortState::new(SortKey::Date, SortDirection::Desc),
            &ctx,
        );
        assert_eq!(ids(&desc), vec!["third", "first", "second"]);

        let by_grade = sort_applications(
            apps.iter().collect(),
            SortState::new(SortKey::Grade, SortDirection::Desc),
            &ctx,
        );
        assert_eq!(ids(&by_grade), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_sort_by_roll_number() {
        let apps = vec![
            app("b", "B", "CB.SC.U4CSE23010", json!([])),
            app("a", "A", "CB.SC.U4CSE22001", json!([])),
        ];
        let times = no_times();
        let ctx = RankingContext {
            subject_filters: &[],
            shortlist_times: &times,
        };
        let sorted = sort_applications(
            apps.iter().collect(),
            SortState::new(SortKey::RollNumber, SortDirection::Asc),
            &ctx,
        );
        assert_eq!(ids(&sorted), vec!["a", "b"]);
    }

    #[test]
    fn test_view_query_parsing() {
        let query = ApplicationViewQuery {
            q: Some("asha".to_string()),
            category: Some("Second Year".to_string()),
            subjects: Some("23CSE211, 23CSE212".to_string()),
            sort: Some("grade".to_string()),
            direction: Some("asc".to_string()),
            ..Default::default()
        };
        let (filters, sort) = handlers::view_from_query(&query).unwrap();
        assert_eq!(filters.query, "asha");
        assert_eq!(filters.category(), Some(Category::SecondYear));
        assert_eq!(filters.subjects(), ["23CSE211", "23CSE212"]);
        assert_eq!(sort, SortState::new(SortKey::Grade, SortDirection::Asc));

        let bad = ApplicationViewQuery {
            sort: Some("salary".to_string()),
            ..Default::default()
        };
        assert!(handlers::view_from_query(&bad).is_err());

        let (_, default_sort) = handlers::view_from_query(&ApplicationViewQuery::default()).unwrap();
        assert_eq!(default_sort, SortState::new(SortKey::Date, SortDirection::Desc));
    }

    #[test]
    fn test_view_pipeline_uses_shortlist_times() {
        let apps = vec![
            app(
                "a1",
                "Asha",
                "r1",
                json!([{ "name": "X", "grade": "C" }, { "name": "Y", "grade": "O" }]),
            ),
            app("a2", "Ravi", "r2", json!([{ "name": "X", "grade": "A" }])),
        ];
        let mut data = HashMap::new();
        data.insert(
            "a1::X".to_string(),
            SelectionMeta {
                subject: "X".to_string(),
                created_at: day(3),
            },
        );

        let times = view::shortlist_times(&data);
        let sorted = view::visible_applications(
            &apps,
            &FilterState::new(),
            SortState::new(SortKey::Grade, SortDirection::Desc),
            PREFIX,
            &times,
        );
        assert_eq!(ids(&sorted), vec!["a2", "a1"]);
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    #[test]
    fn test_shortlisted_export_only_includes_selected_applicants() {
        let apps = vec![
            app("app1", "Asha", "r1", json!(["Math"])),
            app("app2", "Ravi", "r2", json!(["Physics"])),
        ];
        let selections = vec!["app1::Math".to_string()];
        let data = HashMap::new();
        let shortlist = ShortlistData {
            selections: &selections,
            selection_data: &data,
        };

        let csv = shortlisted_csv(&apps.iter().collect::<Vec<_>>(), shortlist);
        let rows = parse_csv(&csv);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["Name", "Roll Number", "Email", "Subjects"]);
        assert_eq!(rows[1][0], "Asha");
        assert_eq!(rows[1][3], "Math");
    }

    #[test]
    fn test_full_export_columns_and_escaping() {
        let mut tricky = app(
            "app1",
            "O\"Brien, Jr.",
            "r1",
            json!([{ "name": "23CSE211 - DAA" }, "Math"]),
        );
        tricky.reason = Some("Line one\nline \"two\"".to_string());
        let plain = app("app2", "Ravi", "r2", json!(null));
        let apps = vec![tricky, plain];

        let selections = vec!["app1::Math".to_string(), "app1::23CSE211 - DAA".to_string()];
        let data = HashMap::new();
        let shortlist = ShortlistData {
            selections: &selections,
            selection_data: &data,
        };

        let rows = parse_csv(&applications_csv(
            &apps.iter().collect::<Vec<_>>(),
            Some(shortlist),
        ));
        assert_eq!(
            rows[0],
            vec![
                "Student Name",
                "Roll Number",
                "Email",
                "Shortlisted Subject(s)",
                "Subjects",
                "Reason",
                "Internship",
                "Submitted Date"
            ]
        );
        assert_eq!(rows[1][0], "O\"Brien, Jr.");
        assert_eq!(rows[1][3], "Math, 23CSE211 - DAA");
        assert_eq!(rows[1][4], "23CSE211 - DAA, Math");
        assert_eq!(rows[1][5], "Line one\nline \"two\"");
        assert_eq!(rows[1][7], "2024-07-01");
        assert_eq!(rows[2][3], "Not shortlisted");
        assert_eq!(rows[2][4], "None");
    }

    #[test]
    fn test_full_export_without_selection_data_omits_column() {
        let apps = vec![app("app1", "Asha", "r1", json!(["Math"]))];
        let rows = parse_csv(&applications_csv(&apps.iter().collect::<Vec<_>>(), None));
        assert_eq!(rows[0].len(), 7);
        assert_eq!(rows[1].len(), 7);
        assert!(!rows[0].contains(&"Shortlisted Subject(s)".to_string()));
    }

    #[test]
    fn test_selection_meta_subject_wins_over_key_suffix() {
        let selections = vec!["app1::math".to_string()];
        let mut data = HashMap::new();
        data.insert(
            "app1::math".to_string(),
            SelectionMeta {
                subject: "Mathematics".to_string(),
                created_at: day(2),
            },
        );
        let shortlist = ShortlistData {
            selections: &selections,
            selection_data: &data,
        };
        assert_eq!(shortlist.subjects_for("app1"), vec!["Mathematics"]);
        assert!(shortlist.subjects_for("app2").is_empty());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename(None, "applications_list.csv"), "applications_list.csv");
        assert_eq!(sanitize_filename(Some("  "), "x.csv"), "x.csv");
        assert_eq!(sanitize_filename(Some("report"), "x.csv"), "report.csv");
        assert_eq!(sanitize_filename(Some("../../etc/passwd"), "x.csv"), "etcpasswd.csv");
        assert_eq!(sanitize_filename(Some("Round 2.CSV"), "x.csv"), "Round2.CSV");
    }
}
