#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Terminal and JSON rendering of evaluated rows.

use anyhow::{Context, Result};
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};

use crate::batch::{BatchSummary, RowOutcome};

#[derive(Tabled, Clone, Debug)]
/// A row of the status table
pub struct StatusRow {
    #[tabled(rename = "Row")]
    /// * `row`: sheet row number
    row:        u32,
    #[tabled(rename = "Student")]
    /// * `student`: student name, or `-`
    student:    String,
    #[tabled(rename = "Absences")]
    /// * `absences`: classes missed, or `-` when the row failed
    absences:   String,
    #[tabled(rename = "Average")]
    /// * `average`: average grade to two decimals
    average:    String,
    #[tabled(rename = "Situation")]
    /// * `situation`: sheet label, or the error for failed rows
    situation:  String,
    #[tabled(rename = "Final exam")]
    /// * `final_exam`: score needed on the final exam, if any
    final_exam: String,
}

impl From<&RowOutcome> for StatusRow {
    fn from(outcome: &RowOutcome) -> Self {
        let student = outcome.student.clone().unwrap_or_else(|| "-".into());
        match &outcome.result {
            Ok(eval) => Self {
                row: outcome.row,
                student,
                absences: eval.record.absences().to_string(),
                average: format!("{:.2}", eval.average_grade),
                situation: eval.status.situation().to_string(),
                final_exam: eval
                    .status
                    .threshold()
                    .map(|t| format!(">= {t}"))
                    .unwrap_or_default(),
            },
            Err(e) => Self {
                row: outcome.row,
                student,
                absences: "-".into(),
                average: "-".into(),
                situation: format!("error: {e}"),
                final_exam: String::new(),
            },
        }
    }
}

/// Renders `outcomes` as a table with a summary footer.
pub fn render_table(title: &str, outcomes: &[RowOutcome]) -> String {
    let rows: Vec<StatusRow> = outcomes.iter().map(StatusRow::from).collect();
    let summary = BatchSummary::from_outcomes(outcomes);

    Table::new(&rows)
        .with(Panel::header(title))
        .with(Panel::footer(summary.to_string()))
        .with(Modify::new(Rows::new(1..)).with(Width::wrap(32).keep_words(true)))
        .with(
            Modify::new(Rows::first())
                .with(Alignment::center())
                .with(Alignment::center_vertical()),
        )
        .with(
            Modify::new(Rows::last())
                .with(Alignment::center())
                .with(Alignment::center_vertical()),
        )
        .with(Style::modern())
        .to_string()
}

/// JSON view of a row outcome.
#[derive(Serialize)]
struct JsonOutcome<'a> {
    /// sheet row number
    row:        u32,
    /// student name
    student:    Option<&'a str>,
    /// evaluation details, for evaluated rows
    #[serde(flatten)]
    evaluation: Option<&'a crate::batch::Evaluation>,
    /// error message, for failed rows
    #[serde(skip_serializing_if = "Option::is_none")]
    error:      Option<String>,
}

/// JSON document printed by `--json`.
#[derive(Serialize)]
struct JsonReport<'a> {
    /// per-row outcomes
    students: Vec<JsonOutcome<'a>>,
    /// situation counts
    summary:  BatchSummary,
}

/// Renders `outcomes` as pretty-printed JSON.
pub fn render_json(outcomes: &[RowOutcome]) -> Result<String> {
    let report = JsonReport {
        students: outcomes
            .iter()
            .map(|o| JsonOutcome {
                row:        o.row,
                student:    o.student.as_deref(),
                evaluation: o.result.as_ref().ok(),
                error:      o.result.as_ref().err().map(ToString::to_string),
            })
            .collect(),
        summary:  BatchSummary::from_outcomes(outcomes),
    };

    serde_json::to_string_pretty(&report).context("Failed to serialize status report")
}
