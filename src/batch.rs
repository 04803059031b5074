#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Evaluates every student row of a sheet and turns the outcomes into the
//! rows written back.

use std::{fmt, str::FromStr};

use anyhow::{Result, bail};
use itertools::Itertools;
use serde::Serialize;

use crate::{
    constants::THRESHOLD_PREFIX,
    record::{CourseConfig, RowError, SheetLayout, StudentRecord, StudentRow},
    sheets::CellValue,
    status::{Situation, StatusResult},
};

/// What to do with rows that could not be evaluated when writing back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowErrorPolicy {
    /// Refuse to write anything.
    #[default]
    Abort,
    /// Write empty cells for the failed rows and keep going.
    Blank,
}

impl FromStr for RowErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(RowErrorPolicy::Abort),
            "blank" => Ok(RowErrorPolicy::Blank),
            other => Err(format!("unknown row error policy `{other}`, expected abort or blank")),
        }
    }
}

impl fmt::Display for RowErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowErrorPolicy::Abort => f.write_str("abort"),
            RowErrorPolicy::Blank => f.write_str("blank"),
        }
    }
}

/// An evaluated student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// the parsed record
    pub record:        StudentRecord,
    /// mean of the exams
    pub average_grade: f64,
    /// the status computed for the record
    pub status:        StatusResult,
}

/// Result of evaluating one row of the students range.
#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    /// 1-based row number in the sheet
    pub row:     u32,
    /// student name, when available
    pub student: Option<String>,
    /// the evaluation, or why it failed
    pub result:  Result<Evaluation, RowError>,
}

impl RowOutcome {
    /// The cells written back for this row, or `None` when it failed.
    pub fn cells(&self) -> Option<Vec<CellValue>> {
        self.result.as_ref().ok().map(|eval| status_cells(&eval.status))
    }
}

/// The `[situation, threshold]` pair written for a status.
pub fn status_cells(status: &StatusResult) -> Vec<CellValue> {
    let threshold = match status.threshold() {
        Some(min) => CellValue::from(format!("{THRESHOLD_PREFIX}{min}")),
        None => CellValue::Number(0),
    };
    vec![CellValue::from(status.situation().label()), threshold]
}

/// Evaluates each row in order.
///
/// * `first_row`: sheet row number of `rows[0]`, used in reports
///
/// A failing row is recorded and never stops the rows after it.
pub fn evaluate_rows(
    rows: &[Vec<String>],
    course: &CourseConfig,
    layout: &SheetLayout,
    first_row: u32,
) -> Vec<RowOutcome> {
    rows.iter()
        .enumerate()
        .map(|(i, cells)| {
            let row = first_row.saturating_add(u32::try_from(i).unwrap_or(u32::MAX));
            match StudentRow::parse(cells, layout) {
                Ok(parsed) => RowOutcome {
                    row,
                    student: parsed.name,
                    result: evaluate(parsed.record, course),
                },
                Err(e) => RowOutcome {
                    row,
                    student: layout
                        .name
                        .and_then(|n| cells.get(n))
                        .map(|n| n.trim().to_string())
                        .filter(|n| !n.is_empty()),
                    result: Err(e),
                },
            }
        })
        .collect()
}

/// Runs the status rules for a parsed record.
fn evaluate(record: StudentRecord, course: &CourseConfig) -> Result<Evaluation, RowError> {
    let status = record.status(course)?;
    Ok(Evaluation {
        average_grade: record.average_grade(),
        record,
        status,
    })
}

/// Builds the rows to write, one per outcome and in the same order.
pub fn build_payload(
    outcomes: &[RowOutcome],
    policy: RowErrorPolicy,
) -> Result<Vec<Vec<CellValue>>> {
    let failed = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().err().map(|e| (o.row, e)))
        .collect_vec();

    if policy == RowErrorPolicy::Abort && !failed.is_empty() {
        let details = failed
            .iter()
            .map(|(row, e)| format!("row {row}: {e}"))
            .join("\n\t");
        bail!(
            "{} student row(s) could not be evaluated; nothing was written.\n\t{details}",
            failed.len()
        );
    }

    Ok(outcomes
        .iter()
        .map(|o| {
            o.cells()
                .unwrap_or_else(|| vec![CellValue::from(""), CellValue::from("")])
        })
        .collect())
}

/// Counts of each situation across a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// approved students
    pub approved:            usize,
    /// students sent to the final exam
    pub final_exam_eligible: usize,
    /// students failed by grade
    pub failed_by_grade:     usize,
    /// students failed by absence
    pub failed_by_absence:   usize,
    /// rows that could not be evaluated
    pub errors:              usize,
}

impl BatchSummary {
    /// Tallies `outcomes`.
    pub fn from_outcomes(outcomes: &[RowOutcome]) -> Self {
        let counts = outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .counts_by(|eval| eval.status.situation());
        let count = |s: Situation| counts.get(&s).copied().unwrap_or_default();

        Self {
            approved:            count(Situation::Approved),
            final_exam_eligible: count(Situation::FinalExamEligible),
            failed_by_grade:     count(Situation::FailedByGrade),
            failed_by_absence:   count(Situation::FailedByAbsence),
            errors:              outcomes.iter().filter(|o| o.result.is_err()).count(),
        }
    }

    /// Number of students whose situation is `situation`.
    pub fn count(&self, situation: Situation) -> usize {
        match situation {
            Situation::Approved => self.approved,
            Situation::FinalExamEligible => self.final_exam_eligible,
            Situation::FailedByGrade => self.failed_by_grade,
            Situation::FailedByAbsence => self.failed_by_absence,
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = Situation::ALL
            .iter()
            .map(|s| format!("{s}: {}", self.count(*s)))
            .join(", ");
        write!(f, "{parts}, errors: {}", self.errors)
    }
}

/// Row number of the first cell of an A1 range such as `Sheet!A4:F27`.
///
/// Returns `None` for whole-column ranges like `A:F`.
pub fn range_start_row(range: &str) -> Option<u32> {
    let cells = range.rsplit_once('!').map_or(range, |(_, cells)| cells);
    let start = cells.split(':').next()?;
    start
        .trim_start_matches(|c: char| c.is_ascii_alphabetic() || c == '$')
        .parse()
        .ok()
}
