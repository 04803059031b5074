use school_status::{
    Situation,
    batch::{BatchSummary, RowErrorPolicy, build_payload, evaluate_rows},
    record::{CourseConfig, ParseError, RowError, SheetLayout},
    report::{render_json, render_table},
    sheets::CellValue,
};

fn rows(raw: &[&[&str]]) -> Vec<Vec<String>> {
    raw.iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect()
}

fn sample() -> Vec<Vec<String>> {
    rows(&[
        &["1", "Ana", "10", "40", "60", "50"],
        &["2", "Bruno", "16", "90", "80", "85"],
        &["3", "Carla", "x", "70", "70", "70"],
        &["4", "Davi", "0", "90", "80", "85"],
        &["5", "Elisa", "3", "30", "20", "10"],
        &["6", "Fabio", "1", "70"],
    ])
}

fn course() -> CourseConfig {
    CourseConfig::from_text("Total de aulas no semestre: 60").expect("course")
}

#[test]
fn outcomes_keep_row_order_and_numbers() {
    let outcomes = evaluate_rows(&sample(), &course(), &SheetLayout::default(), 4);

    assert_eq!(outcomes.len(), 6);
    assert_eq!(outcomes.iter().map(|o| o.row).collect::<Vec<_>>(), vec![4, 5, 6, 7, 8, 9]);
    assert_eq!(outcomes[2].student.as_deref(), Some("Carla"));

    let situations: Vec<Option<Situation>> = outcomes
        .iter()
        .map(|o| o.result.as_ref().ok().map(|e| e.status.situation()))
        .collect();
    assert_eq!(
        situations,
        vec![
            Some(Situation::FinalExamEligible),
            Some(Situation::FailedByAbsence),
            None,
            Some(Situation::Approved),
            Some(Situation::FailedByGrade),
            None,
        ]
    );

    assert!(matches!(
        outcomes[2].result,
        Err(RowError::Parse(ParseError::InvalidInteger { column: "absences", .. }))
    ));
    assert!(matches!(
        outcomes[5].result,
        Err(RowError::Parse(ParseError::MissingCell { index: 4, .. }))
    ));
}

#[test]
fn abort_policy_refuses_to_write_and_names_rows() {
    let outcomes = evaluate_rows(&sample(), &course(), &SheetLayout::default(), 4);
    let err = build_payload(&outcomes, RowErrorPolicy::Abort).unwrap_err();
    let message = err.to_string();

    assert!(message.contains("2 student row(s)"), "{message}");
    assert!(message.contains("row 6"), "{message}");
    assert!(message.contains("row 9"), "{message}");
}

#[test]
fn blank_policy_keeps_rows_aligned() {
    let outcomes = evaluate_rows(&sample(), &course(), &SheetLayout::default(), 4);
    let payload = build_payload(&outcomes, RowErrorPolicy::Blank).expect("payload");

    let blank = vec![CellValue::from(""), CellValue::from("")];
    assert_eq!(
        payload,
        vec![
            vec![CellValue::from("Exame Final"), CellValue::from("naf >= 50")],
            vec![CellValue::from("Reprovado por Falta"), CellValue::Number(0)],
            blank.clone(),
            vec![CellValue::from("Aprovado"), CellValue::Number(0)],
            vec![CellValue::from("Reprovado por Nota"), CellValue::Number(0)],
            blank,
        ]
    );
}

#[test]
fn clean_batch_writes_under_abort() {
    let clean = rows(&[&["1", "Ana", "2", "100", "100", "100"]]);
    let outcomes = evaluate_rows(&clean, &course(), &SheetLayout::default(), 1);
    let payload = build_payload(&outcomes, RowErrorPolicy::Abort).expect("payload");

    assert_eq!(payload, vec![vec![CellValue::from("Aprovado"), CellValue::Number(0)]]);
}

#[test]
fn custom_layout_without_names() {
    let layout = SheetLayout::builder()
        .name(None)
        .absences(0)
        .exams([1, 2, 3])
        .build();
    let outcomes = evaluate_rows(&rows(&[&["4", "55", "60", "65"]]), &course(), &layout, 2);

    assert_eq!(outcomes[0].student, None);
    let eval = outcomes[0].result.as_ref().expect("evaluated");
    assert_eq!(eval.average_grade, 60.0);
    assert_eq!(eval.status.threshold(), Some(40));
}

#[test]
fn summary_and_reports() {
    let outcomes = evaluate_rows(&sample(), &course(), &SheetLayout::default(), 4);
    let summary = BatchSummary::from_outcomes(&outcomes);

    assert_eq!(
        summary,
        BatchSummary {
            approved:            1,
            final_exam_eligible: 1,
            failed_by_grade:     1,
            failed_by_absence:   1,
            errors:              2,
        }
    );

    let table = render_table("turma", &outcomes);
    assert!(table.contains("Exame Final"));
    assert!(table.contains("Carla"));
    assert!(table.contains("turma"));

    let json: serde_json::Value =
        serde_json::from_str(&render_json(&outcomes).expect("json")).expect("valid json");
    assert_eq!(json["students"][0]["status"]["situation"], "final_exam_eligible");
    assert_eq!(json["students"][0]["status"]["threshold"], 50);
    assert_eq!(json["students"][0]["average_grade"], 50.0);
    assert!(json["students"][2]["error"].is_string());
    assert_eq!(json["summary"]["errors"], 2);
}
