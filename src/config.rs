use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_SUBJECTS: [&str; 6] = [
    "Mathematics",
    "Physics",
    "English Language",
    "Chemistry",
    "Biology",
    "Economics",
];

pub const DEFAULT_MAX_PHOTO_BYTES: usize = 2 * 1024 * 1024;

/// Command-line flags; every flag also reads from the environment.
#[derive(Debug, Parser)]
#[command(name = "reportd", version, about = "School report entry and printing service")]
pub struct Cli {
    /// Address the HTTP server listens on.
    #[arg(long, env = "REPORTD_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// SQLite database file.
    #[arg(long, env = "REPORTD_DB_PATH", default_value = "school_reports.sqlite3")]
    pub db_path: PathBuf,

    /// Keep reports in process memory instead of SQLite.
    #[arg(long, env = "REPORTD_IN_MEMORY", default_value_t = false)]
    pub in_memory: bool,

    /// School name printed on the report header.
    #[arg(
        long,
        env = "REPORTD_SCHOOL_NAME",
        default_value = "[Secondary School Name Placeholder]"
    )]
    pub school_name: String,

    /// Comma-separated subjects offered on the entry form.
    #[arg(long, env = "REPORTD_SUBJECTS", value_delimiter = ',')]
    pub subjects: Vec<String>,

    #[arg(long, env = "REPORTD_DEMO_USER", default_value = "user@example.com")]
    pub demo_user: String,

    #[arg(long, env = "REPORTD_DEMO_PASSWORD", default_value = "password123")]
    pub demo_password: String,

    /// Largest accepted student photo upload.
    #[arg(long, env = "REPORTD_MAX_PHOTO_BYTES", default_value_t = DEFAULT_MAX_PHOTO_BYTES)]
    pub max_photo_bytes: usize,

    /// Emit logs as JSON lines.
    #[arg(long, env = "REPORTD_LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite(PathBuf),
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoAccount {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub store: StoreBackend,
    pub school_name: String,
    pub subjects: Vec<String>,
    pub demo_account: DemoAccount,
    pub max_photo_bytes: usize,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            store: StoreBackend::Sqlite(PathBuf::from("school_reports.sqlite3")),
            school_name: "[Secondary School Name Placeholder]".to_string(),
            subjects: DEFAULT_SUBJECTS.iter().map(|s| s.to_string()).collect(),
            demo_account: DemoAccount {
                username: "user@example.com".to_string(),
                password: "password123".to_string(),
            },
            max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES,
            log_json: false,
        }
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let mut subjects: Vec<String> = cli
            .subjects
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if subjects.is_empty() {
            subjects = DEFAULT_SUBJECTS.iter().map(|s| s.to_string()).collect();
        }
        // Two subjects mapping to the same form key would shadow each other.
        let mut seen = std::collections::HashSet::new();
        subjects.retain(|s| seen.insert(subject_key(s)));

        Config {
            bind: cli.bind,
            store: if cli.in_memory {
                StoreBackend::Memory
            } else {
                StoreBackend::Sqlite(cli.db_path)
            },
            school_name: cli.school_name,
            subjects,
            demo_account: DemoAccount {
                username: cli.demo_user,
                password: cli.demo_password,
            },
            max_photo_bytes: cli.max_photo_bytes,
            log_json: cli.log_json,
        }
    }
}

/// Form field prefix for a subject: "English Language" -> "english_language".
pub fn subject_key(subject: &str) -> String {
    subject.trim().to_lowercase().replace(' ', "_")
}
