use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// A report as submitted, before the store assigns identity and timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewReport {
    pub name: String,
    pub student_id: String,
    pub grade_level: String,
    pub term: String,
    pub date_generated: String,
    pub results_json: String,
    pub photo_base64: Option<String>,
}

/// One row of the `reports` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReport {
    pub id: i64,
    pub name: String,
    pub student_id: String,
    pub grade_level: Option<String>,
    pub term: Option<String>,
    pub date_generated: Option<String>,
    pub results_json: Option<String>,
    pub photo_base64: Option<String>,
    pub timestamp: i64,
}

impl StoredReport {
    fn from_new(id: i64, report: &NewReport, timestamp: i64) -> Self {
        StoredReport {
            id,
            name: report.name.clone(),
            student_id: report.student_id.clone(),
            grade_level: Some(report.grade_level.clone()),
            term: Some(report.term.clone()),
            date_generated: Some(report.date_generated.clone()),
            results_json: Some(report.results_json.clone()),
            photo_base64: report.photo_base64.clone(),
            timestamp,
        }
    }
}

/// Append-only report storage. Implementations must be usable from
/// blocking worker threads.
pub trait ReportStore: Send + Sync {
    /// Appends one report with a server-assigned timestamp and returns its id.
    fn insert(&self, report: &NewReport) -> anyhow::Result<i64>;

    /// The report with the greatest timestamp (ties: greatest id).
    fn latest(&self) -> anyhow::Result<Option<StoredReport>>;

    /// Short label for logs and the health endpoint.
    fn describe(&self) -> String;
}

pub fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Opens the database file, creating the `reports` table if it is absent.
/// Existing rows are never touched.
pub fn connect(db_path: &Path) -> anyhow::Result<Connection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(db_path)?;
    ensure_schema(&conn)?;
    Ok(conn)
}

pub fn ensure_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS reports(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            student_id TEXT NOT NULL,
            grade_level TEXT,
            term TEXT,
            date_generated TEXT,
            results_json TEXT,
            photo_base64 TEXT,
            timestamp INTEGER
        )",
        [],
    )?;

    // Tables created before photos were stored lack the column.
    ensure_reports_photo(conn)?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_reports_timestamp ON reports(timestamp, id)",
        [],
    )?;
    Ok(())
}

pub fn insert_at(conn: &Connection, report: &NewReport, timestamp: i64) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO reports(name, student_id, grade_level, term, date_generated, results_json, photo_base64, timestamp)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
        (
            &report.name,
            &report.student_id,
            &report.grade_level,
            &report.term,
            &report.date_generated,
            &report.results_json,
            &report.photo_base64,
            timestamp,
        ),
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn latest(conn: &Connection) -> anyhow::Result<Option<StoredReport>> {
    let row = conn
        .query_row(
            "SELECT id, name, student_id, grade_level, term, date_generated, results_json, photo_base64, COALESCE(timestamp, 0)
             FROM reports
             ORDER BY timestamp DESC, id DESC
             LIMIT 1",
            [],
            |r| {
                Ok(StoredReport {
                    id: r.get(0)?,
                    name: r.get(1)?,
                    student_id: r.get(2)?,
                    grade_level: r.get(3)?,
                    term: r.get(4)?,
                    date_generated: r.get(5)?,
                    results_json: r.get(6)?,
                    photo_base64: r.get(7)?,
                    timestamp: r.get(8)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

fn ensure_reports_photo(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "reports", "photo_base64")? {
        return Ok(());
    }
    conn.execute("ALTER TABLE reports ADD COLUMN photo_base64 TEXT", [])?;
    Ok(())
}

pub fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// SQLite-backed store. Every call opens its own connection and drops it
/// when done.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn connect(&self) -> anyhow::Result<Connection> {
        connect(&self.path)
    }

    pub fn insert_at(&self, report: &NewReport, timestamp: i64) -> anyhow::Result<i64> {
        let conn = self.connect()?;
        let id = insert_at(&conn, report, timestamp)?;
        info!(id, student_id = %report.student_id, timestamp, "report inserted");
        Ok(id)
    }
}

impl ReportStore for SqliteStore {
    fn insert(&self, report: &NewReport) -> anyhow::Result<i64> {
        self.insert_at(report, now_timestamp())
    }

    fn latest(&self) -> anyhow::Result<Option<StoredReport>> {
        let conn = self.connect()?;
        let row = latest(&conn)?;
        debug!(found = row.is_some(), "latest report fetched");
        Ok(row)
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}

/// Process-local store with the same ordering rules as `SqliteStore`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<StoredReport>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_at(&self, report: &NewReport, timestamp: i64) -> anyhow::Result<i64> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        let id = rows.last().map(|r| r.id + 1).unwrap_or(1);
        rows.push(StoredReport::from_new(id, report, timestamp));
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReportStore for MemoryStore {
    fn insert(&self, report: &NewReport) -> anyhow::Result<i64> {
        self.insert_at(report, now_timestamp())
    }

    fn latest(&self) -> anyhow::Result<Option<StoredReport>> {
        let rows = self
            .rows
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        Ok(rows.iter().max_by_key(|r| (r.timestamp, r.id)).cloned())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
