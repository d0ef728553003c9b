//! HTML rendering
//!
//! Server-side pages built with `format!`. Every value that came from a user
//! or the database goes through [`escape`]. Rendering makes no decisions:
//! grades, percentages and statuses arrive precomputed in a [`ReportCard`].

use std::fmt::Write as _;

use crate::calc::{format_score, ReportCard, SubjectResult};
use crate::config::subject_key;

const PHOTO_PLACEHOLDER: &str = "https://placehold.co/96x96/e5e7eb/4b5563?text=STUDENT";

pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    Success(String),
    Error(String),
}

impl Alert {
    fn render(&self) -> String {
        let (class, text) = match self {
            Alert::Success(t) => ("alert alert-success", t),
            Alert::Error(t) => ("alert alert-error", t),
        };
        format!(
            r#"<div class="{class}" role="alert">{}</div>"#,
            escape(text)
        )
    }
}

fn layout(title: &str, body_class: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>{css}</style>
</head>
<body class="{body_class}">
{body}
</body>
</html>"#,
        title = escape(title),
        css = inline_css(),
    )
}

fn inline_css() -> &'static str {
    r#"
        @import url('https://fonts.googleapis.com/css2?family=Inter:wght@400;600;700;800&display=swap');
        body { font-family: 'Inter', sans-serif; background-color: #f3f4f6; }
        .container { max-width: 1000px; }
        .alert { padding: 1rem; margin-bottom: 1rem; font-size: 0.875rem; border-radius: 0.5rem; }
        .alert-success { color: #15803d; background-color: #dcfce7; }
        .alert-error { color: #b91c1c; background-color: #fee2e2; }
        @media print {
            body { background: none !important; color: #000; margin: 0; padding: 0; }
            .no-print { display: none !important; }
            #report-content {
                width: 210mm; min-height: 297mm; margin: 0 auto !important;
                box-shadow: none !important; border: none !important;
                padding: 0; font-size: 11px;
            }
            table th, table td { padding: 3px 5px !important; }
        }
    "#
}

fn auth_card(heading: &str, tagline: &str, alert: Option<&Alert>, form: &str, footer: &str) -> String {
    format!(
        r#"<div class="w-full max-w-md bg-white p-8 md:p-10 shadow-2xl rounded-xl border border-gray-100">
    <h2 class="text-3xl font-extrabold text-gray-900 text-center mb-6">{heading}</h2>
    <p class="text-center text-sm text-gray-500 mb-8">{tagline}</p>
    {alert}
    {form}
    <p class="mt-8 text-center text-sm text-gray-600">{footer}</p>
</div>"#,
        alert = alert.map(Alert::render).unwrap_or_default(),
    )
}

fn text_input(name: &str, label: &str, kind: &str, autocomplete: &str, value: Option<&str>) -> String {
    let value_attr = value
        .map(|v| format!(r#" value="{}""#, escape(v)))
        .unwrap_or_default();
    format!(
        r#"<div>
        <label for="{name}" class="block text-sm font-medium text-gray-700 mb-1">{label}</label>
        <input type="{kind}" name="{name}" id="{name}" required autocomplete="{autocomplete}"
            class="w-full px-4 py-2 border border-gray-300 rounded-lg"{value_attr}>
    </div>"#
    )
}

/// Sign-in page. The username is echoed back; the password never is.
pub fn render_login(alert: Option<&Alert>, username: &str) -> String {
    let form = format!(
        r#"<form method="POST" action="/login" class="space-y-6">
    {user}
    {pass}
    <div class="flex items-center">
        <input id="remember_me" name="remember_me" type="checkbox" class="h-4 w-4">
        <label for="remember_me" class="ml-2 block text-sm text-gray-900">Remember me</label>
    </div>
    <button type="submit" class="w-full py-2 px-4 rounded-lg text-lg font-bold text-white bg-blue-600 hover:bg-blue-700">Log In</button>
</form>"#,
        user = text_input("username", "Username / Email", "text", "email", Some(username)),
        pass = text_input("password", "Password", "password", "current-password", None),
    );
    let card = auth_card(
        "Sign In",
        "Access your account securely.",
        alert,
        &form,
        r#"Don't have an account? <a href="/signup" class="font-medium text-blue-600">Sign up here</a>"#,
    );
    layout(
        "Sign In",
        "min-h-screen flex items-center justify-center p-4",
        &card,
    )
}

/// Registration page. Same echo rules as [`render_login`].
pub fn render_signup(alert: Option<&Alert>, username: &str) -> String {
    let form = format!(
        r#"<form method="POST" action="/signup" class="space-y-6">
    {user}
    {pass}
    {confirm}
    <button type="submit" class="w-full py-2 px-4 rounded-lg text-lg font-bold text-white bg-green-600 hover:bg-green-700">Sign Up</button>
</form>"#,
        user = text_input("username", "Username / Email", "email", "email", Some(username)),
        pass = text_input("password", "Password", "password", "new-password", None),
        confirm = text_input(
            "confirm_password",
            "Confirm Password",
            "password",
            "new-password",
            None
        ),
    );
    let card = auth_card(
        "Create Account",
        "Start your free account today.",
        alert,
        &form,
        r#"Already have an account? <a href="/login" class="font-medium text-blue-600">Log In here</a>"#,
    );
    layout(
        "Create Account",
        "min-h-screen flex items-center justify-center p-4",
        &card,
    )
}

fn render_store_error() -> String {
    r#"<div class="alert alert-error" role="alert">
    <strong>Database unavailable:</strong> could not connect to the report database.
    <p>Check that the database path in the service configuration is reachable and writable.</p>
</div>"#
        .to_string()
}

pub fn render_empty_state() -> String {
    r#"<div class="text-center py-12 text-gray-500">No report data found. Submit the form above to generate the first report.</div>"#
        .to_string()
}

fn render_score_form(subjects: &[String]) -> String {
    let mut rows = String::new();
    for subject in subjects {
        let key = subject_key(subject);
        let _ = write!(
            rows,
            r#"<div class="grid grid-cols-4 gap-2 sm:gap-4 items-center bg-gray-50 p-3 rounded-md border border-gray-200">
    <div class="col-span-1 text-sm font-medium text-gray-700">{name}</div>
    <div><label class="block text-xs text-gray-500 text-center">CA (30)</label><input type="number" name="{key}_ca" min="0" max="30" required class="mt-1 block w-full p-1 border text-sm text-center" value="25"></div>
    <div><label class="block text-xs text-gray-500 text-center">Test (20)</label><input type="number" name="{key}_test" min="0" max="20" required class="mt-1 block w-full p-1 border text-sm text-center" value="15"></div>
    <div><label class="block text-xs text-gray-500 text-center">Exam (50)</label><input type="number" name="{key}_exam" min="0" max="50" required class="mt-1 block w-full p-1 border text-sm text-center" value="45"></div>
</div>
"#,
            name = escape(subject),
            key = escape(&key),
        );
    }

    format!(
        r#"<div class="no-print bg-white p-4 sm:p-6 shadow-xl rounded-lg mb-8 border-t-4 border-indigo-500">
    <h2 class="text-lg sm:text-xl font-semibold text-gray-800 mb-4">Input New Student Results</h2>
    <p class="text-xs sm:text-sm text-gray-600 mb-6">Enter scores for CA (30%), Test (20%), and Exam (50%) for each subject.</p>
    <form method="POST" action="/insert" enctype="multipart/form-data" class="space-y-6">
        <div class="grid grid-cols-2 sm:grid-cols-4 gap-4 sm:gap-6">
            <div class="col-span-2 sm:col-span-1">
                <label for="student_name" class="block text-sm font-medium text-gray-700">Student Name</label>
                <input type="text" name="student_name" id="student_name" required class="mt-1 block w-full p-2 border text-sm">
            </div>
            <div class="col-span-2 sm:col-span-1">
                <label for="student_id" class="block text-sm font-medium text-gray-700">Student ID</label>
                <input type="text" name="student_id" id="student_id" required class="mt-1 block w-full p-2 border text-sm">
            </div>
            <div>
                <label for="grade_level" class="block text-sm font-medium text-gray-700">Grade/Class</label>
                <input type="text" name="grade_level" id="grade_level" required class="mt-1 block w-full p-2 border text-sm" value="SS2 A">
            </div>
            <div>
                <label for="term" class="block text-sm font-medium text-gray-700">Academic Term</label>
                <select name="term" id="term" required class="mt-1 block w-full p-2 border text-sm">
                    <option value="First">First Term</option>
                    <option value="Second">Second Term</option>
                    <option value="Third" selected>Third Term</option>
                </select>
            </div>
            <div class="col-span-2 sm:col-span-4 border-t pt-4">
                <label for="student_photo" class="block text-sm font-medium text-gray-700">Upload Student Photo</label>
                <input type="file" name="student_photo" id="student_photo" accept="image/*" class="mt-1 block w-full text-xs text-gray-500">
            </div>
        </div>
        <div class="space-y-3">
            <h3 class="text-base sm:text-lg font-semibold text-gray-800 pt-4 border-t mt-4">Subject Scores</h3>
            {rows}
        </div>
        <div class="pt-2">
            <button type="submit" class="py-2 px-4 sm:py-3 sm:px-6 text-sm font-medium rounded-md text-white bg-indigo-600 hover:bg-indigo-700 w-full sm:w-auto">Save &amp; Generate Report</button>
        </div>
    </form>
</div>"#
    )
}

/// "2024-07-19" -> "July 19, 2024". Anything unparseable is shown as stored.
pub fn format_generated_date(raw: &str) -> String {
    match chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(d) => d.format("%B %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

fn render_subject_row(out: &mut String, item: &SubjectResult) {
    let grade_class = if item.grade.is_failing() {
        "text-red-600"
    } else {
        "text-indigo-600"
    };
    let ca = format_score(item.ca);
    let test = format_score(item.test);
    let exam = format_score(item.exam);
    let _ = write!(
        out,
        r#"<tr class="hover:bg-gray-50">
    <td class="px-3 py-2 whitespace-nowrap font-medium text-gray-900">{subject}
        <div class="sm:hidden text-[10px] text-gray-500 font-normal mt-1 leading-none">CA: {ca}, Test: {test}, Exam: {exam}</div>
    </td>
    <td class="hidden sm:table-cell px-2 py-2 text-center">{ca}</td>
    <td class="hidden sm:table-cell px-2 py-2 text-center">{test}</td>
    <td class="hidden sm:table-cell px-2 py-2 text-center">{exam}</td>
    <td class="px-2 py-2 text-center font-bold">{total}</td>
    <td class="px-2 py-2 text-center font-bold {grade_class}">{percentage}</td>
    <td class="px-2 py-2 text-center font-extrabold {grade_class}">{grade}</td>
</tr>
"#,
        subject = escape(&item.subject),
        total = format_score(item.total),
        percentage = escape(&item.percentage),
        grade = item.grade.as_str(),
    );
}

/// The printable report block.
pub fn render_report(card: &ReportCard, school_name: &str) -> String {
    let student = &card.student;
    let eval = &card.evaluation;
    let photo_src = match student.photo_base64.as_deref() {
        Some(b64) => format!("data:image/png;base64,{}", escape(b64)),
        None => PHOTO_PLACEHOLDER.to_string(),
    };

    let mut rows = String::new();
    for item in &eval.subjects {
        render_subject_row(&mut rows, item);
    }

    format!(
        r#"<div id="report-content" class="bg-white shadow-xl rounded-lg overflow-hidden my-6 p-4 md:p-6">
    <div class="text-center py-4 px-4 sm:px-6 bg-gray-50 border-b-2 border-gray-300">
        <h1 class="text-xl sm:text-2xl md:text-3xl font-extrabold text-indigo-700 uppercase tracking-wider">{school}</h1>
        <p class="text-gray-600 text-xs sm:text-sm">Official Academic Report - {term} Term</p>
    </div>
    <div class="p-4 sm:p-6 border-b border-gray-200 bg-white">
        <div class="flex flex-col sm:flex-row items-center sm:items-start">
            <div class="w-20 h-20 bg-gray-200 rounded-lg mb-4 sm:mb-0 sm:mr-6 flex-shrink-0 overflow-hidden">
                <img src="{photo_src}" alt="Student Photo" class="object-cover w-full h-full rounded-lg">
            </div>
            <div class="flex-grow grid grid-cols-1 sm:grid-cols-2 gap-y-2 gap-x-6 text-sm w-full">
                <div><span class="font-semibold text-gray-600 text-xs">Student Name:</span> <span class="font-bold text-gray-900 block">{name}</span></div>
                <div><span class="font-semibold text-gray-600 text-xs">Student ID:</span> <span class="font-bold text-gray-900 block">{student_id}</span></div>
                <div><span class="font-semibold text-gray-600 text-xs">Class/Grade:</span> <span class="font-bold text-gray-900 block">{grade_level}</span></div>
                <div><span class="font-semibold text-gray-600 text-xs">Date Generated:</span> <span class="font-bold text-gray-900 block">{date}</span></div>
            </div>
        </div>
    </div>
    <div class="p-4 sm:p-6 border-b border-gray-200 bg-gray-50 grid grid-cols-3 gap-2 sm:gap-4">
        <div class="text-center p-2 sm:p-3 rounded-lg shadow-sm bg-white">
            <p class="text-xs font-medium text-gray-500 uppercase">Total Subjects</p>
            <p class="text-xl sm:text-2xl font-extrabold text-indigo-700" data-field="total-subjects">{total_subjects}</p>
        </div>
        <div class="text-center p-2 sm:p-3 rounded-lg shadow-sm bg-white">
            <p class="text-xs font-medium text-gray-500 uppercase">Overall Avg (%)</p>
            <p class="text-xl sm:text-2xl font-extrabold text-indigo-700" data-field="overall-percentage">{overall}%</p>
        </div>
        <div class="text-center p-2 sm:p-3 rounded-lg shadow-sm bg-white">
            <p class="text-xs font-medium text-gray-500 uppercase">Status</p>
            <p class="text-xl sm:text-2xl font-extrabold {status_color}" data-field="status">{status}</p>
        </div>
    </div>
    <div class="p-4 sm:p-6 overflow-x-auto">
        <h2 class="text-base sm:text-lg font-semibold text-gray-800 mb-3">Subject Performance Details</h2>
        <table class="min-w-full divide-y divide-gray-200 text-sm">
            <thead class="bg-gray-50">
                <tr>
                    <th class="px-3 py-2 text-left font-bold text-gray-600 uppercase">Subject</th>
                    <th class="hidden sm:table-cell px-2 py-2 text-center font-bold text-gray-600 uppercase">CA (30)</th>
                    <th class="hidden sm:table-cell px-2 py-2 text-center font-bold text-gray-600 uppercase">Test (20)</th>
                    <th class="hidden sm:table-cell px-2 py-2 text-center font-bold text-gray-600 uppercase">Exam (50)</th>
                    <th class="px-2 py-2 text-center font-bold text-gray-600 uppercase">Total (100)</th>
                    <th class="px-2 py-2 text-center font-bold text-gray-600 uppercase">Percent (%)</th>
                    <th class="px-2 py-2 text-center font-bold text-gray-600 uppercase">Grade</th>
                </tr>
            </thead>
            <tbody class="bg-white divide-y divide-gray-200">
{rows}            </tbody>
        </table>
    </div>
    <div class="p-4 sm:p-6 bg-gray-50 border-t-2 border-gray-300">
        <h3 class="text-sm font-semibold text-gray-700 mb-2">Grading Scale Legend:</h3>
        <div class="grid grid-cols-3 sm:grid-cols-5 gap-2 text-xs">
            <span>A: 90% - 100%</span><span>B: 80% - 89%</span><span>C: 70% - 79%</span><span>D: 60% - 69%</span><span>F: Below 60%</span>
        </div>
    </div>
    <div class="text-center py-2 text-gray-500 text-xs italic">This report is computer generated and does not require a signature.</div>
</div>"#,
        school = escape(school_name),
        term = escape(&student.term),
        name = escape(&student.name),
        student_id = escape(&student.student_id),
        grade_level = escape(&student.grade_level),
        date = escape(&format_generated_date(&student.date_generated)),
        total_subjects = eval.total_subjects,
        overall = escape(&eval.overall_percentage),
        status_color = eval.status_color,
        status = eval.status.label(),
    )
}

fn print_button() -> &'static str {
    r#"<div class="flex justify-center no-print mt-6">
    <button onclick="window.print()" class="py-2 px-6 sm:py-3 sm:px-8 shadow-lg text-sm font-medium rounded-full text-white bg-green-600 hover:bg-green-700">Download PDF</button>
</div>"#
}

/// Inputs for the data-entry page.
#[derive(Debug, Clone, Copy)]
pub struct EntryPage<'a> {
    pub school_name: &'a str,
    pub subjects: &'a [String],
    pub flash: Option<&'a Alert>,
    pub store_error: bool,
    pub report: Option<&'a ReportCard>,
}

/// Data-entry page: flash message, store alert, the form, then the latest
/// report. With the store down the form still renders but no report does.
pub fn render_entry_page(page: EntryPage<'_>) -> String {
    let mut body = String::new();
    body.push_str(
        r#"<div class="container mx-auto p-4 md:p-8">
<h1 class="text-2xl sm:text-3xl font-bold text-gray-800 mb-6 text-center no-print">Academic Data Entry Portal</h1>
"#,
    );
    if let Some(flash) = page.flash {
        body.push_str(&flash.render());
    }
    if page.store_error {
        body.push_str(&render_store_error());
    }
    body.push_str(&render_score_form(page.subjects));
    if !page.store_error {
        match page.report {
            Some(card) => {
                body.push_str(&render_report(card, page.school_name));
                body.push_str(print_button());
            }
            None => body.push_str(&render_empty_state()),
        }
    }
    body.push_str("</div>");
    layout("Academic Data Entry Portal", "bg-gray-100", &body)
}

/// Report-only page for printing the latest report.
pub fn render_report_page(report: Option<&ReportCard>, school_name: &str, store_error: bool) -> String {
    let mut body = String::from(r#"<div class="container mx-auto p-4 md:p-8">"#);
    if store_error {
        body.push_str(&render_store_error());
    } else if let Some(card) = report {
        body.push_str(&render_report(card, school_name));
        body.push_str(print_button());
    } else {
        body.push_str(&render_empty_state());
    }
    body.push_str("</div>");
    layout("Student Report", "bg-gray-100", &body)
}

pub fn render_not_found(view: &str) -> String {
    let body = format!(
        r#"<div class="container mx-auto p-8 text-center">
    <h1 class="text-2xl font-bold text-gray-800 mb-4">Page not found</h1>
    <p class="text-gray-600">There is no page named <code>{}</code>.</p>
    <p class="mt-4"><a href="/login" class="text-blue-600">Go to sign in</a></p>
</div>"#,
        escape(view)
    );
    layout("Page not found", "bg-gray-100", &body)
}
