use school_status::{
    InvalidInputError, Situation, school_status,
    record::{CourseConfig, StudentRecord},
};

/// Averages from 0 to 100 in steps of 0.25.
fn averages() -> impl Iterator<Item = f64> {
    (0..=400).map(|i| i as f64 / 4.0)
}

fn status_of(total_classes: i64, absences: i64, exams: [f64; 3]) -> (Situation, Option<u32>) {
    let course = CourseConfig::new(total_classes).expect("course");
    let result = StudentRecord::new(absences, exams)
        .expect("record")
        .status(&course)
        .expect("status");
    (result.situation(), result.threshold())
}

#[test]
fn too_many_absences_fail_regardless_of_grade() {
    for total in [1, 4, 10, 60, 61, 200] {
        let limit = total as f64 * 0.25;
        for absences in (limit.floor() as i64 + 1)..=total {
            for average in averages() {
                let result = school_status(absences, average, total).expect("valid input");
                assert_eq!(result.situation(), Situation::FailedByAbsence);
                assert_eq!(result.threshold(), None);
            }
        }
    }
}

#[test]
fn grade_bands_within_absence_limit() {
    for average in averages() {
        let result = school_status(15, average, 60).expect("valid input");
        let expected = if average < 50.0 {
            Situation::FailedByGrade
        } else if average < 70.0 {
            Situation::FinalExamEligible
        } else {
            Situation::Approved
        };
        assert_eq!(result.situation(), expected, "average {average}");
    }
}

#[test]
fn final_exam_threshold_is_ceiling_of_remainder() {
    for average in averages().filter(|a| (50.0..70.0).contains(a)) {
        let threshold = school_status(0, average, 60)
            .expect("valid input")
            .threshold()
            .expect("threshold");
        assert_eq!(threshold as f64, (100.0 - average).ceil());
        assert!((31..=50).contains(&threshold), "threshold {threshold} for {average}");
    }
}

#[test]
fn band_boundaries_are_inclusive_below() {
    assert_eq!(
        school_status(0, 50.0, 60).unwrap().situation(),
        Situation::FinalExamEligible
    );
    assert_eq!(school_status(0, 50.0, 60).unwrap().threshold(), Some(50));
    assert_eq!(
        school_status(0, 70.0, 60).unwrap().situation(),
        Situation::Approved
    );
    assert_eq!(
        school_status(0, 49.999, 60).unwrap().situation(),
        Situation::FailedByGrade
    );
}

#[test]
fn absences_at_exactly_a_quarter_are_allowed() {
    for total in [4, 20, 60, 100] {
        let quarter = total / 4;
        assert_ne!(
            school_status(quarter, 80.0, total).unwrap().situation(),
            Situation::FailedByAbsence
        );
    }
}

#[test]
fn sheet_scenarios() {
    // the absence rule is checked first, so 20 of 60 fails whatever the grades
    assert_eq!(
        status_of(60, 20, [90.0, 90.0, 90.0]),
        (Situation::FailedByAbsence, None)
    );
    assert_eq!(
        status_of(60, 20, [40.0, 60.0, 50.0]),
        (Situation::FailedByAbsence, None)
    );

    assert_eq!(
        status_of(60, 15, [40.0, 60.0, 50.0]),
        (Situation::FinalExamEligible, Some(50))
    );
    assert_eq!(
        status_of(60, 15, [90.0, 80.0, 85.0]),
        (Situation::Approved, None)
    );
    assert_eq!(
        status_of(60, 12, [30.0, 20.0, 10.0]),
        (Situation::FailedByGrade, None)
    );
}

#[test]
fn out_of_domain_inputs_are_errors() {
    assert_eq!(
        school_status(0, -0.5, 60),
        Err(InvalidInputError::AverageOutOfRange(-0.5))
    );
    assert_eq!(
        school_status(0, 100.01, 60),
        Err(InvalidInputError::AverageOutOfRange(100.01))
    );
    assert_eq!(
        school_status(3, 80.0, -5),
        Err(InvalidInputError::NonPositiveTotalClasses(-5))
    );
    assert_eq!(
        StudentRecord::new(2, [50.0, 101.0, 50.0]),
        Err(InvalidInputError::ExamScoreOutOfRange {
            exam:  2,
            score: 101.0,
        })
    );
    assert_eq!(CourseConfig::new(0), Err(InvalidInputError::NonPositiveTotalClasses(0)));
}
