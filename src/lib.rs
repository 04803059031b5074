//! # school-status
//!
//! Works out each student's academic situation (approved, failed by grade,
//! failed by absence, or sent to the final exam) from the attendance and
//! exam grades kept in a Google Sheets spreadsheet, and writes it back.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Evaluating whole sheets of students
pub mod batch;
/// Environment-driven configuration
pub mod config;
/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// Typed records and parsing them from cells
pub mod record;
/// Table and JSON output
pub mod report;
/// Google Sheets credentials and value-range calls
pub mod sheets;
/// The status rules
pub mod status;

use anyhow::{Context, Result};
use batch::{RowErrorPolicy, RowOutcome, build_payload, evaluate_rows, range_start_row};
use config::SheetsConfig;
use record::CourseConfig;
use sheets::{SheetsClient, TokenStore, UpdateValuesResponse};

pub use status::{InvalidInputError, Situation, StatusResult, school_status};

/// Authenticates and returns a client for the configured spreadsheet.
pub async fn connect(config: &SheetsConfig) -> Result<SheetsClient> {
    let spreadsheet_id = config.spreadsheet_id()?;
    let http = config.http_client()?;
    let store = TokenStore::new(config.token_path());
    tracing::debug!(
        "Using token {} with a {}s timeout",
        store.path().display(),
        config.http_timeout().as_secs()
    );
    let token = store
        .access_token(&http)
        .await
        .with_context(|| {
            format!(
                "Could not obtain a Google access token from {}",
                store.path().display()
            )
        })?;

    SheetsClient::new(http, config.api_base(), spreadsheet_id, token)
        .context("Could not create Sheets client")
}

/// Reads the total classes cell and the student rows, and evaluates every
/// row.
pub async fn load_outcomes(
    client: &SheetsClient,
    config: &SheetsConfig,
) -> Result<(CourseConfig, Vec<RowOutcome>)> {
    let header = client
        .get_values(config.total_classes_range())
        .await
        .with_context(|| format!("Could not read `{}`", config.total_classes_range()))?;
    let text = header
        .first()
        .and_then(|row| row.first())
        .with_context(|| format!("`{}` is empty", config.total_classes_range()))?;
    let course = CourseConfig::from_text(text)
        .with_context(|| format!("Could not read the total classes from `{text}`"))?;
    tracing::info!(
        "Total classes: {} (at most {} absences)",
        course.total_classes(),
        course.max_absences()
    );

    let rows = client
        .get_values(config.students_range())
        .await
        .with_context(|| format!("Could not read `{}`", config.students_range()))?;
    tracing::info!("Read {} student row(s) from {}", rows.len(), config.students_range());

    let first_row = range_start_row(config.students_range()).unwrap_or(1);
    let outcomes = evaluate_rows(&rows, &course, config.layout(), first_row);

    for outcome in &outcomes {
        if let Err(e) = &outcome.result {
            tracing::warn!("Row {} could not be evaluated: {e}", outcome.row);
        }
    }

    Ok((course, outcomes))
}

/// Writes the situation and threshold of every outcome to the output range.
pub async fn write_outcomes(
    client: &SheetsClient,
    config: &SheetsConfig,
    outcomes: &[RowOutcome],
    policy: RowErrorPolicy,
) -> Result<UpdateValuesResponse> {
    let payload = build_payload(outcomes, policy)?;
    let written = client
        .update_values(config.output_range(), &payload, config.value_input_option())
        .await
        .with_context(|| format!("Could not write `{}`", config.output_range()))?;

    tracing::info!(
        "Updated {} cell(s) in {} of {}",
        written.updated_cells,
        written.updated_range,
        client.spreadsheet_id()
    );
    Ok(written)
}
