#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Typed student and course records, and parsing them out of spreadsheet
//! cells.

use std::num::{ParseFloatError, ParseIntError};

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::status::{GRADE_RANGE, InvalidInputError, StatusResult, school_status};

/// Number of exams averaged into a student's grade.
pub const EXAM_COUNT: usize = 3;

/// Errors raised while turning spreadsheet text into numbers.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The row ended before the expected column.
    #[error("Missing `{column}` cell (column {index}).")]
    MissingCell {
        /// name of the expected value
        column: &'static str,
        /// 0-based index into the row
        index:  usize,
    },
    /// The absences cell is not a whole number.
    #[error("Could not parse `{column}` value `{value}` as a whole number: {source}")]
    InvalidInteger {
        /// name of the expected value
        column: &'static str,
        /// raw cell text
        value:  String,
        /// underlying parse failure
        #[source]
        source: ParseIntError,
    },
    /// An exam cell is not a number.
    #[error("Could not parse `{column}` value `{value}` as a number: {source}")]
    InvalidNumber {
        /// name of the expected value
        column: &'static str,
        /// raw cell text
        value:  String,
        /// underlying parse failure
        #[source]
        source: ParseFloatError,
    },
    /// The total classes text holds no digits.
    #[error("Could not find a number of classes in `{0}`.")]
    NoInteger(String),
}

/// Why a single student row could not be evaluated.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RowError {
    /// The row's cells could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The parsed values are out of range.
    #[error(transparent)]
    Invalid(#[from] InvalidInputError),
}

/// Attendance and grades for one student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    /// classes missed
    absences: i64,
    /// exam scores, in sheet order
    exams:    [f64; EXAM_COUNT],
}

impl StudentRecord {
    /// Creates a record, checking that absences are not negative and every
    /// exam score lies in `[0, 100]`.
    pub fn new(absences: i64, exams: [f64; EXAM_COUNT]) -> Result<Self, InvalidInputError> {
        if absences < 0 {
            return Err(InvalidInputError::NegativeAbsences(absences));
        }
        if let Some((i, &score)) = exams
            .iter()
            .enumerate()
            .find(|(_, s)| !s.is_finite() || !GRADE_RANGE.contains(*s))
        {
            return Err(InvalidInputError::ExamScoreOutOfRange { exam: i + 1, score });
        }

        Ok(Self { absences, exams })
    }

    /// Returns the number of classes missed.
    pub fn absences(&self) -> i64 {
        self.absences
    }

    /// Returns the exam scores.
    pub fn exams(&self) -> &[f64; EXAM_COUNT] {
        &self.exams
    }

    /// Mean of the exam scores.
    pub fn average_grade(&self) -> f64 {
        self.exams.iter().sum::<f64>() / EXAM_COUNT as f64
    }

    /// Runs the status rules for this student.
    pub fn status(&self, course: &CourseConfig) -> Result<StatusResult, InvalidInputError> {
        school_status(self.absences, self.average_grade(), course.total_classes())
    }
}

/// Per-course settings the status rules depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CourseConfig {
    /// classes held in the term
    total_classes: i64,
}

impl CourseConfig {
    /// Creates a course config; `total_classes` must be positive.
    pub fn new(total_classes: i64) -> Result<Self, InvalidInputError> {
        if total_classes <= 0 {
            return Err(InvalidInputError::NonPositiveTotalClasses(total_classes));
        }
        Ok(Self { total_classes })
    }

    /// Reads the number of classes out of a free-text cell such as
    /// `Total de aulas no semestre: 60`, using the first integer found.
    pub fn from_text(text: &str) -> Result<Self, RowError> {
        let total = first_integer(text).ok_or_else(|| ParseError::NoInteger(text.to_string()))?;
        Ok(Self::new(total)?)
    }

    /// Returns the number of classes held.
    pub fn total_classes(&self) -> i64 {
        self.total_classes
    }

    /// Most absences a student may have without failing.
    pub fn max_absences(&self) -> i64 {
        (self.total_classes as f64 * crate::status::ABSENCE_LIMIT_RATIO).floor() as i64
    }
}

/// Returns the first run of ASCII digits in `text`, if there is one that fits
/// in an `i64`.
pub fn first_integer(text: &str) -> Option<i64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits = &text[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

/// Column positions of the student fields within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder, Serialize, Deserialize)]
#[builder(doc)]
pub struct SheetLayout {
    /// column holding the student's name, if any
    #[builder(default = Some(1))]
    pub name:     Option<usize>,
    /// column holding the absences count
    #[builder(default = 2)]
    pub absences: usize,
    /// columns holding the exam scores, in order
    #[builder(default = [3, 4, 5])]
    pub exams:    [usize; EXAM_COUNT],
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A student row parsed from the sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRow {
    /// student name, when the layout has one and the cell is not blank
    pub name:   Option<String>,
    /// the parsed record
    pub record: StudentRecord,
}

/// Names used for the exam columns in error messages.
const EXAM_COLUMNS: [&str; EXAM_COUNT] = ["exam 1", "exam 2", "exam 3"];

/// Fetches the trimmed cell at `index`, treating a blank cell as missing.
fn cell<'a>(
    cells: &'a [String],
    index: usize,
    column: &'static str,
) -> Result<&'a str, ParseError> {
    cells
        .get(index)
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .ok_or(ParseError::MissingCell { column, index })
}

impl StudentRow {
    /// Parses one row of cells according to `layout`.
    pub fn parse(cells: &[String], layout: &SheetLayout) -> Result<Self, RowError> {
        let name = layout
            .name
            .and_then(|i| cells.get(i))
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let raw = cell(cells, layout.absences, "absences")?;
        let absences = raw
            .parse::<i64>()
            .map_err(|source| ParseError::InvalidInteger {
                column: "absences",
                value: raw.to_string(),
                source,
            })?;

        let mut exams = [0.0; EXAM_COUNT];
        for ((slot, &index), column) in exams.iter_mut().zip(&layout.exams).zip(EXAM_COLUMNS) {
            let raw = cell(cells, index, column)?;
            *slot = raw
                .parse::<f64>()
                .map_err(|source| ParseError::InvalidNumber {
                    column,
                    value: raw.to_string(),
                    source,
                })?;
        }

        Ok(Self {
            name,
            record: StudentRecord::new(absences, exams)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn first_integer_skips_leading_text() {
        assert_eq!(first_integer("Total de aulas no semestre: 60"), Some(60));
        assert_eq!(first_integer("60 aulas, 4 bimestres"), Some(60));
        assert_eq!(first_integer("sem aulas"), None);
    }

    #[test]
    fn max_absences_rounds_down() {
        assert_eq!(CourseConfig::new(60).unwrap().max_absences(), 15);
        assert_eq!(CourseConfig::new(10).unwrap().max_absences(), 2);
    }

    #[test]
    fn parses_default_layout() {
        let parsed = StudentRow::parse(
            &row(&["101", " Ana ", "4", "70", "80.5", " 90 "]),
            &SheetLayout::default(),
        )
        .expect("valid row");

        assert_eq!(parsed.name.as_deref(), Some("Ana"));
        assert_eq!(parsed.record.absences(), 4);
        assert_eq!(parsed.record.exams(), &[70.0, 80.5, 90.0]);
    }

    #[test]
    fn blank_cell_is_missing() {
        let err = StudentRow::parse(&row(&["1", "Bia", "2", "50", "", "60"]), &SheetLayout::default())
            .unwrap_err();
        assert_eq!(
            err,
            RowError::Parse(ParseError::MissingCell {
                column: "exam 2",
                index:  4,
            })
        );
    }

    #[test]
    fn total_classes_text_errors() {
        assert_eq!(
            CourseConfig::from_text("Total de aulas no semestre: 0"),
            Err(RowError::Invalid(InvalidInputError::NonPositiveTotalClasses(0)))
        );
        assert_eq!(
            CourseConfig::from_text("Total de aulas no semestre: a definir"),
            Err(RowError::Parse(ParseError::NoInteger(
                "Total de aulas no semestre: a definir".to_string()
            )))
        );
        assert_eq!(
            CourseConfig::from_text("Total de aulas no semestre: 60").map(|c| c.total_classes()),
            Ok(60)
        );
    }

    #[test]
    fn decimal_comma_is_rejected() {
        let err = StudentRow::parse(&row(&["1", "Caio", "2", "7,5", "80", "90"]), &SheetLayout::default())
            .unwrap_err();
        assert!(
            matches!(
                &err,
                RowError::Parse(ParseError::InvalidNumber { column: "exam 1", value, .. }) if value == "7,5"
            ),
            "{err:?}"
        );
    }
}
