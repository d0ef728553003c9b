use serde::Serialize;

use crate::db::StoredReport;

pub const CA_MAX: f64 = 30.0;
pub const TEST_MAX: f64 = 20.0;
pub const EXAM_MAX: f64 = 50.0;
pub const SUBJECT_MAX: f64 = CA_MAX + TEST_MAX + EXAM_MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl LetterGrade {
    /// Thresholds apply to the unrounded percentage out of 100.
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 90.0 {
            LetterGrade::A
        } else if percent >= 80.0 {
            LetterGrade::B
        } else if percent >= 70.0 {
            LetterGrade::C
        } else if percent >= 60.0 {
            LetterGrade::D
        } else {
            LetterGrade::F
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        }
    }

    pub fn is_failing(self) -> bool {
        self == LetterGrade::F
    }
}

/// Overall standing of a report. One policy only: Excellent / Pass / Fail,
/// with `NoData` for a report that has no subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OverallStatus {
    Excellent,
    Pass,
    Fail,
    #[serde(rename = "No Data")]
    NoData,
}

impl OverallStatus {
    pub const EXCELLENT_FROM: f64 = 90.0;
    pub const PASS_FROM: f64 = 65.0;

    pub fn from_overall(percent: f64, subject_count: usize) -> Self {
        if subject_count == 0 {
            OverallStatus::NoData
        } else if percent >= Self::EXCELLENT_FROM {
            OverallStatus::Excellent
        } else if percent >= Self::PASS_FROM {
            OverallStatus::Pass
        } else {
            OverallStatus::Fail
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OverallStatus::Excellent => "Excellent",
            OverallStatus::Pass => "Pass",
            OverallStatus::Fail => "Fail",
            OverallStatus::NoData => "No Data",
        }
    }

    pub fn color_class(self) -> &'static str {
        match self {
            OverallStatus::Excellent => "text-green-600",
            OverallStatus::Pass => "text-indigo-600",
            OverallStatus::Fail => "text-red-600",
            OverallStatus::NoData => "text-gray-500",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComponentScores {
    pub ca: f64,
    pub test: f64,
    pub exam: f64,
}

impl ComponentScores {
    pub fn total(&self) -> f64 {
        self.ca + self.test + self.exam
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectResult {
    pub subject: String,
    pub ca: f64,
    pub test: f64,
    pub exam: f64,
    pub total: f64,
    pub percentage: String,
    pub grade: LetterGrade,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    pub name: String,
    pub student_id: String,
    pub grade_level: String,
    pub term: String,
    pub date_generated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_base64: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub subjects: Vec<SubjectResult>,
    pub total_subjects: usize,
    pub overall_percentage: String,
    pub status: OverallStatus,
    pub status_color: &'static str,
}

impl Evaluation {
    fn empty() -> Self {
        Self::from_subjects(Vec::new(), 0.0)
    }

    fn from_subjects(subjects: Vec<SubjectResult>, total_score_sum: f64) -> Self {
        let total_subjects = subjects.len();
        let overall = if total_subjects > 0 {
            total_score_sum * 100.0 / (SUBJECT_MAX * total_subjects as f64)
        } else {
            0.0
        };
        let overall = if overall.is_finite() { overall } else { 0.0 };
        let status = OverallStatus::from_overall(overall, total_subjects);
        Evaluation {
            subjects,
            total_subjects,
            overall_percentage: format_percent(overall),
            status,
            status_color: status.color_class(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCard {
    pub student: StudentInfo,
    #[serde(flatten)]
    pub evaluation: Evaluation,
}

/// Two decimals, halves rounded away from zero ("75.125" -> "75.13").
///
/// The scaled value is nudged by a tiny epsilon first so decimal halves that
/// land a hair below .5 in binary (1.005 * 100 = 100.4999...) still round up.
pub fn format_percent(value: f64) -> String {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return format!("{:.2}", value);
    }
    let nudged = scaled + scaled.signum() * 1e-9;
    // `+ 0.0` folds -0.0 into 0.0 so nothing prints as "-0.00".
    format!("{:.2}", nudged.round() / 100.0 + 0.0)
}

/// Whole scores print without a fractional part ("25", not "25.00").
pub fn format_score(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn component(item: &serde_json::Map<String, serde_json::Value>, key: &str) -> f64 {
    let v = match item.get(key) {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

pub fn evaluate_subject(subject: impl Into<String>, scores: ComponentScores) -> SubjectResult {
    let mut total = scores.total();
    let mut percent = total * 100.0 / SUBJECT_MAX;
    // Finite components can still overflow once summed or scaled.
    if !percent.is_finite() {
        total = 0.0;
        percent = 0.0;
    }
    SubjectResult {
        subject: subject.into(),
        ca: scores.ca,
        test: scores.test,
        exam: scores.exam,
        total,
        percentage: format_percent(percent),
        grade: LetterGrade::from_percent(percent),
    }
}

/// Evaluates a stored `results_json` payload.
///
/// Never fails: a payload that is not a JSON list yields the empty
/// evaluation, list items that are not objects are skipped, and missing or
/// non-numeric components count as zero. Stored `total`/`percentage`/`grade`
/// fields are ignored and recomputed from the raw components.
pub fn evaluate_results(results_json: &str) -> Evaluation {
    let parsed: serde_json::Value = match serde_json::from_str(results_json) {
        Ok(v) => v,
        Err(_) => return Evaluation::empty(),
    };
    let Some(items) = parsed.as_array() else {
        return Evaluation::empty();
    };

    let mut subjects = Vec::with_capacity(items.len());
    let mut total_score_sum = 0.0;
    for item in items {
        let Some(obj) = item.as_object() else {
            continue;
        };
        let name = obj
            .get("subject")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let scores = ComponentScores {
            ca: component(obj, "ca"),
            test: component(obj, "test"),
            exam: component(obj, "exam"),
        };
        let result = evaluate_subject(name, scores);
        total_score_sum += result.total;
        subjects.push(result);
    }

    Evaluation::from_subjects(subjects, total_score_sum)
}

pub fn evaluate(report: &StoredReport) -> ReportCard {
    ReportCard {
        student: StudentInfo {
            name: report.name.clone(),
            student_id: report.student_id.clone(),
            grade_level: report.grade_level.clone().unwrap_or_default(),
            term: report.term.clone().unwrap_or_default(),
            date_generated: report.date_generated.clone().unwrap_or_default(),
            photo_base64: report.photo_base64.clone().filter(|p| !p.is_empty()),
        },
        evaluation: evaluate_results(report.results_json.as_deref().unwrap_or("")),
    }
}
