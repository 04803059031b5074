#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Academic status rules.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Share of the total classes a student may miss before failing by absence.
pub const ABSENCE_LIMIT_RATIO: f64 = 0.25;

/// Averages below this fail outright.
pub const FINAL_EXAM_MIN_AVERAGE: f64 = 50.0;

/// Averages at or above this pass without a final exam.
pub const APPROVAL_MIN_AVERAGE: f64 = 70.0;

/// Lowest and highest grade an exam or an average can take.
pub const GRADE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=100.0;

/// Inputs that fall outside the domain the status rules are defined on.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum InvalidInputError {
    /// Absences cannot be negative.
    #[error("Absences must be zero or more, got {0}.")]
    NegativeAbsences(i64),
    /// A course needs at least one class.
    #[error("Total classes must be greater than zero, got {0}.")]
    NonPositiveTotalClasses(i64),
    /// The average grade is NaN, infinite, or outside `[0, 100]`.
    #[error("Average grade must be between 0 and 100, got {0}.")]
    AverageOutOfRange(f64),
    /// One of the exam scores is NaN, infinite, or outside `[0, 100]`.
    #[error("Exam {exam} must be scored between 0 and 100, got {score}.")]
    ExamScoreOutOfRange {
        /// 1-based exam number
        exam:  usize,
        /// the offending score
        score: f64,
    },
}

/// The categorical academic outcome for a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Situation {
    /// Passed without a final exam.
    Approved,
    /// Missed more than a quarter of the classes.
    FailedByAbsence,
    /// Average below the final exam cutoff.
    FailedByGrade,
    /// May sit the final exam; see [`StatusResult::threshold`].
    FinalExamEligible,
}

impl Situation {
    /// Every situation, in the order reports list them.
    pub const ALL: [Situation; 4] = [
        Situation::Approved,
        Situation::FinalExamEligible,
        Situation::FailedByGrade,
        Situation::FailedByAbsence,
    ];

    /// Label written into the spreadsheet's situation column.
    pub fn label(&self) -> &'static str {
        match self {
            Situation::Approved => "Aprovado",
            Situation::FailedByAbsence => "Reprovado por Falta",
            Situation::FailedByGrade => "Reprovado por Nota",
            Situation::FinalExamEligible => "Exame Final",
        }
    }
}

impl Display for Situation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of [`school_status`].
///
/// A threshold is only ever present for [`Situation::FinalExamEligible`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusResult {
    /// the student's situation
    situation: Situation,
    /// score needed on the final exam to pass
    #[serde(skip_serializing_if = "Option::is_none")]
    threshold: Option<u32>,
}

impl StatusResult {
    /// A result that carries no threshold.
    fn settled(situation: Situation) -> Self {
        Self {
            situation,
            threshold: None,
        }
    }

    /// A final exam result requiring `threshold` on the exam.
    fn final_exam(threshold: u32) -> Self {
        Self {
            situation: Situation::FinalExamEligible,
            threshold: Some(threshold),
        }
    }

    /// Returns the situation.
    pub fn situation(&self) -> Situation {
        self.situation
    }

    /// Returns the minimum final exam score, if the student is eligible for
    /// one.
    pub fn threshold(&self) -> Option<u32> {
        self.threshold
    }
}

/// Computes a student's academic status.
///
/// * `absences`: classes missed by the student
/// * `average_grade`: mean of the student's exam scores
/// * `total_classes`: classes held in the term
///
/// Rules are checked in order and the first match wins: more than a quarter
/// of the classes missed, then an average below 50, then an average below 70
/// (final exam, needing `ceil(100 - average)`), otherwise approved.
pub fn school_status(
    absences: i64,
    average_grade: f64,
    total_classes: i64,
) -> Result<StatusResult, InvalidInputError> {
    if absences < 0 {
        return Err(InvalidInputError::NegativeAbsences(absences));
    }
    if total_classes <= 0 {
        return Err(InvalidInputError::NonPositiveTotalClasses(total_classes));
    }
    if !average_grade.is_finite() || !GRADE_RANGE.contains(&average_grade) {
        return Err(InvalidInputError::AverageOutOfRange(average_grade));
    }

    let result = if absences as f64 > total_classes as f64 * ABSENCE_LIMIT_RATIO {
        StatusResult::settled(Situation::FailedByAbsence)
    } else if average_grade < FINAL_EXAM_MIN_AVERAGE {
        StatusResult::settled(Situation::FailedByGrade)
    } else if average_grade < APPROVAL_MIN_AVERAGE {
        // (30, 50] before rounding up, so the cast cannot truncate
        StatusResult::final_exam((100.0 - average_grade).ceil() as u32)
    } else {
        StatusResult::settled(Situation::Approved)
    };

    Ok(result)
}
