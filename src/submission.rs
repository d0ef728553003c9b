use base64::Engine;
use chrono::NaiveDate;
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

use crate::calc::{CA_MAX, EXAM_MAX, TEST_MAX};
use crate::config::subject_key;
use crate::db::NewReport;

/// Raw fields collected from the entry form.
#[derive(Debug, Clone, Default)]
pub struct SubmissionFields {
    pub text: HashMap<String, String>,
    pub photo: Option<Vec<u8>>,
}

impl SubmissionFields {
    fn get(&self, key: &str) -> Option<&str> {
        self.text.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("{0} is required.")]
    MissingField(&'static str),
    #[error("{subject} {component} score must be a whole number between 0 and {max}.")]
    InvalidScore {
        subject: String,
        component: &'static str,
        max: u32,
    },
    #[error("Student photo exceeds the {limit_kb} KB limit.")]
    PhotoTooLarge { limit_kb: usize },
    #[error("Could not read the submitted form: {0}")]
    Malformed(String),
}

const COMPONENTS: [(&str, &str, f64); 3] = [
    ("ca", "CA", CA_MAX),
    ("test", "Test", TEST_MAX),
    ("exam", "Exam", EXAM_MAX),
];

fn parse_component(
    fields: &SubmissionFields,
    subject: &str,
    suffix: &str,
    label: &'static str,
    max: f64,
) -> Result<i64, SubmissionError> {
    let key = format!("{}_{}", subject_key(subject), suffix);
    let invalid = || SubmissionError::InvalidScore {
        subject: subject.to_string(),
        component: label,
        max: max as u32,
    };
    let raw = fields.get(&key).ok_or_else(invalid)?;
    let value: i64 = raw.parse().map_err(|_| invalid())?;
    if value < 0 || value as f64 > max {
        return Err(invalid());
    }
    Ok(value)
}

/// Builds the row to insert from a submitted form.
///
/// Scores are checked against the component maxima here so stored rows keep
/// the per-subject total at or below 100.
pub fn build_report(
    fields: &SubmissionFields,
    subjects: &[String],
    max_photo_bytes: usize,
    today: NaiveDate,
) -> Result<NewReport, SubmissionError> {
    let required = |key: &str, label: &'static str| {
        fields
            .get(key)
            .map(str::to_string)
            .ok_or(SubmissionError::MissingField(label))
    };
    let name = required("student_name", "Student Name")?;
    let student_id = required("student_id", "Student ID")?;
    let grade_level = required("grade_level", "Grade/Class")?;
    let term = required("term", "Academic Term")?;

    let mut results = Vec::with_capacity(subjects.len());
    for subject in subjects {
        let mut scores = [0_i64; 3];
        for (slot, (suffix, label, max)) in scores.iter_mut().zip(COMPONENTS) {
            *slot = parse_component(fields, subject, suffix, label, max)?;
        }
        results.push(json!({
            "subject": subject,
            "ca": scores[0],
            "test": scores[1],
            "exam": scores[2],
        }));
    }

    let photo_base64 = match fields.photo.as_deref() {
        None | Some([]) => None,
        Some(bytes) if bytes.len() > max_photo_bytes => {
            return Err(SubmissionError::PhotoTooLarge {
                limit_kb: max_photo_bytes / 1024,
            })
        }
        Some(bytes) => Some(base64::engine::general_purpose::STANDARD.encode(bytes)),
    };

    Ok(NewReport {
        name,
        student_id,
        grade_level,
        term,
        date_generated: today.format("%Y-%m-%d").to_string(),
        results_json: serde_json::Value::Array(results).to_string(),
        photo_base64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::evaluate_results;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 19).expect("date")
    }

    fn filled(subjects: &[String]) -> SubmissionFields {
        let mut f = SubmissionFields::default();
        for (k, v) in [
            ("student_name", "John Doe"),
            ("student_id", "S123456"),
            ("grade_level", "SS2 A"),
            ("term", "Third"),
        ] {
            f.text.insert(k.to_string(), v.to_string());
        }
        for s in subjects {
            let key = subject_key(s);
            f.text.insert(format!("{key}_ca"), "25".to_string());
            f.text.insert(format!("{key}_test"), "18".to_string());
            f.text.insert(format!("{key}_exam"), "49".to_string());
        }
        f
    }

    fn subjects() -> Vec<String> {
        vec!["Mathematics".to_string(), "English Language".to_string()]
    }

    #[test]
    fn builds_report_from_complete_form() {
        let subs = subjects();
        let report = build_report(&filled(&subs), &subs, 1024, today()).expect("build");
        assert_eq!(report.name, "John Doe");
        assert_eq!(report.date_generated, "2024-07-19");
        assert_eq!(report.photo_base64, None);
        let e = evaluate_results(&report.results_json);
        assert_eq!(e.total_subjects, 2);
        assert_eq!(e.subjects[1].subject, "English Language");
        assert_eq!(e.subjects[1].total, 92.0);
    }

    #[test]
    fn missing_student_field_is_reported_by_label() {
        let subs = subjects();
        let mut f = filled(&subs);
        f.text.insert("student_id".to_string(), "   ".to_string());
        let e = build_report(&f, &subs, 1024, today()).expect_err("should fail");
        assert_eq!(e, SubmissionError::MissingField("Student ID"));
        assert_eq!(e.to_string(), "Student ID is required.");
    }

    #[test]
    fn scores_outside_component_bounds_are_rejected() {
        let subs = subjects();
        for (key, value) in [
            ("mathematics_ca", "31"),
            ("mathematics_test", "-1"),
            ("english_language_exam", "12.5"),
            ("english_language_exam", "fifty"),
        ] {
            let mut f = filled(&subs);
            f.text.insert(key.to_string(), value.to_string());
            let e = build_report(&f, &subs, 1024, today()).expect_err(key);
            assert!(matches!(e, SubmissionError::InvalidScore { .. }), "{key}={value}");
        }
        let mut f = filled(&subs);
        f.text.remove("mathematics_exam");
        let e = build_report(&f, &subs, 1024, today()).expect_err("missing");
        assert_eq!(
            e.to_string(),
            "Mathematics Exam score must be a whole number between 0 and 50."
        );
    }

    #[test]
    fn photo_is_encoded_and_size_limited() {
        let subs = subjects();
        let mut f = filled(&subs);
        f.photo = Some(vec![0x89, b'P', b'N', b'G']);
        let report = build_report(&f, &subs, 1024, today()).expect("build");
        assert_eq!(report.photo_base64.as_deref(), Some("iVBORw=="));

        f.photo = Some(Vec::new());
        let report = build_report(&f, &subs, 1024, today()).expect("build");
        assert_eq!(report.photo_base64, None);

        f.photo = Some(vec![0; 2048]);
        let e = build_report(&f, &subs, 1024, today()).expect_err("too large");
        assert_eq!(e, SubmissionError::PhotoTooLarge { limit_kb: 1 });
    }
}
