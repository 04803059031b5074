#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Sheets API v4 root.
pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4";

/// One row per student: enrollment, name, absences, then the three exams.
pub const DEFAULT_STUDENTS_RANGE: &str = "engenharia_de_software!A4:F27";

/// Situation and final exam threshold columns next to the student rows.
pub const DEFAULT_OUTPUT_RANGE: &str = "engenharia_de_software!G4:H27";

/// Header row whose first cell reads `Total de aulas no semestre: N`.
///
/// Named on the same sheet as the student rows. A bare `A2:H2` would resolve
/// to whichever sheet comes first in the spreadsheet, which only matches the
/// student rows when the class sheet is the first tab.
pub const DEFAULT_TOTAL_CLASSES_RANGE: &str = "engenharia_de_software!A2:H2";

/// Lets the sheet parse written values as if typed by a user.
pub const DEFAULT_VALUE_INPUT_OPTION: &str = "USER_ENTERED";

/// OAuth scope needed to read and write spreadsheet values.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Prefix of the threshold cell for students sent to the final exam; `naf` is
/// the final exam grade.
pub const THRESHOLD_PREFIX: &str = "naf >= ";
