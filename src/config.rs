#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex, OnceLock},
    time::Duration,
};

use anyhow::{Context, Result};
use reqwest::Client;
use typed_builder::TypedBuilder;

use crate::{
    constants::{
        DEFAULT_API_BASE, DEFAULT_OUTPUT_RANGE, DEFAULT_STUDENTS_RANGE,
        DEFAULT_TOTAL_CLASSES_RANGE, DEFAULT_VALUE_INPUT_OPTION,
    },
    record::SheetLayout,
};

/// Where the student data lives and how to reach it.
#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
#[builder(doc)]
pub struct SheetsConfig {
    /// Spreadsheet id, if one is configured.
    #[builder(default, setter(strip_option))]
    spreadsheet_id:       Option<String>,
    /// Range holding one row per student.
    #[builder(default = DEFAULT_STUDENTS_RANGE.to_string())]
    students_range:       String,
    /// Range the situation and threshold columns are written to.
    #[builder(default = DEFAULT_OUTPUT_RANGE.to_string())]
    output_range:         String,
    /// Range whose first cell holds the total classes text.
    #[builder(default = DEFAULT_TOTAL_CLASSES_RANGE.to_string())]
    total_classes_range:  String,
    /// Authorized-user token file.
    #[builder(default = PathBuf::from("token.json"))]
    token_path:           PathBuf,
    /// Sheets API root URL.
    #[builder(default = DEFAULT_API_BASE.to_string())]
    api_base:             String,
    /// How Google should interpret written values.
    #[builder(default = DEFAULT_VALUE_INPUT_OPTION.to_string())]
    value_input_option:   String,
    /// Timeout applied to every HTTP request.
    #[builder(default = Duration::from_secs(30))]
    http_timeout:         Duration,
    /// Column positions within a student row.
    #[builder(default)]
    layout:               SheetLayout,
}

impl SheetsConfig {
    /// Reads the configuration from `SHEETS_*` environment variables, falling
    /// back to defaults for anything unset or blank.
    pub fn from_env() -> Self {
        Self {
            spreadsheet_id:      read_var("SHEETS_SPREADSHEET_ID"),
            students_range:      read_var("SHEETS_STUDENTS_RANGE")
                .unwrap_or_else(|| DEFAULT_STUDENTS_RANGE.to_string()),
            output_range:        read_var("SHEETS_OUTPUT_RANGE")
                .unwrap_or_else(|| DEFAULT_OUTPUT_RANGE.to_string()),
            total_classes_range: read_var("SHEETS_TOTAL_CLASSES_RANGE")
                .unwrap_or_else(|| DEFAULT_TOTAL_CLASSES_RANGE.to_string()),
            token_path:          read_var("SHEETS_TOKEN_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("token.json")),
            api_base:            read_var("SHEETS_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            value_input_option:  read_var("SHEETS_VALUE_INPUT_OPTION")
                .unwrap_or_else(|| DEFAULT_VALUE_INPUT_OPTION.to_string()),
            http_timeout:        read_timeout_secs("SHEETS_HTTP_TIMEOUT_SECS", 30),
            layout:              SheetLayout::default(),
        }
    }

    /// Returns a copy pointing at a different spreadsheet.
    pub fn with_spreadsheet_id(mut self, id: impl Into<String>) -> Self {
        self.spreadsheet_id = Some(id.into());
        self
    }

    /// Returns the spreadsheet id, or an error explaining how to set one.
    pub fn spreadsheet_id(&self) -> Result<&str> {
        self.spreadsheet_id
            .as_deref()
            .context("No spreadsheet configured; set SHEETS_SPREADSHEET_ID or pass --spreadsheet")
    }

    /// Returns the students range.
    pub fn students_range(&self) -> &str {
        &self.students_range
    }

    /// Returns the output range.
    pub fn output_range(&self) -> &str {
        &self.output_range
    }

    /// Returns the total classes range.
    pub fn total_classes_range(&self) -> &str {
        &self.total_classes_range
    }

    /// Returns the token file path.
    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Returns the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Returns the value input option used for writes.
    pub fn value_input_option(&self) -> &str {
        &self.value_input_option
    }

    /// Returns the HTTP timeout.
    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }

    /// Returns the student row layout.
    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    /// Builds the HTTP client shared by every request in a run.
    pub fn http_client(&self) -> Result<Client> {
        Client::builder()
            // Avoid macOS dynamic store lookups that fail in sandboxed environments.
            .no_proxy()
            .timeout(self.http_timeout())
            .build()
            .context("Failed to construct shared HTTP client")
    }
}

/// Global storage for the lazily constructed configuration.
static CONFIG_SLOT: OnceLock<Mutex<Option<Arc<SheetsConfig>>>> = OnceLock::new();

/// Returns the mutex guarding the global configuration slot.
fn slot() -> &'static Mutex<Option<Arc<SheetsConfig>>> {
    CONFIG_SLOT.get_or_init(|| Mutex::new(None))
}

/// Returns the process-wide configuration, reading the environment on first
/// use.
pub fn get() -> Arc<SheetsConfig> {
    let mut guard = slot().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    Arc::clone(guard.get_or_insert_with(|| Arc::new(SheetsConfig::from_env())))
}

/// Replaces the process-wide configuration, e.g. after applying CLI
/// overrides.
pub fn set(config: SheetsConfig) {
    let mut guard = slot().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = Some(Arc::new(config));
}

/// Reads a trimmed, non-empty environment variable.
fn read_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Parses an environment variable into a `Duration`, falling back to
/// `default_secs` when parsing fails or the variable is missing.
fn read_timeout_secs(env: &str, default_secs: u64) -> Duration {
    std::env::var(env)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default_secs))
}
