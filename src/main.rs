#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # school-status
//! ## Introduction
//!
//! Fills in the situation and final exam columns of a class spreadsheet.
//!
//! ## Setup
//!
//! Put the spreadsheet id in `SHEETS_SPREADSHEET_ID` (a `.env` file in the
//! working directory is read too) and an authorized-user `token.json` with
//! the `spreadsheets` scope next to it. Then `school-status preview` shows
//! what would be written and `school-status update` writes it.

use anyhow::{Context, Result};
use bpaf::*;
use colored::Colorize;
use dotenvy::dotenv;
use school_status::{
    batch::RowErrorPolicy,
    config::{self, SheetsConfig},
    connect, load_outcomes,
    record::{CourseConfig, EXAM_COUNT, StudentRecord},
    report::{render_json, render_table},
    status::Situation,
    write_outcomes,
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Compute the status of a single student
    Status {
        /// classes missed
        absences:      i64,
        /// classes held in the term
        total_classes: i64,
        /// the exam scores
        exams:         Vec<f64>,
        /// print JSON instead of text
        json:          bool,
    },
    /// Read the sheet and print the statuses without writing
    Preview {
        /// print JSON instead of a table
        json: bool,
    },
    /// Read the sheet and write the statuses back
    Update {
        /// what to do with rows that fail to evaluate
        on_error: RowErrorPolicy,
    },
}

/// Parsed command line.
#[derive(Debug, Clone)]
struct Opts {
    /// log at debug level
    verbose:     bool,
    /// spreadsheet id overriding the environment
    spreadsheet: Option<String>,
    /// the command to run
    cmd:         Cmd,
}

/// Parse the command line arguments and return the options
fn options() -> Opts {
    /// parses the JSON output switch
    fn json_switch() -> impl Parser<bool> {
        long("json").help("Print JSON instead of a table").switch()
    }

    let absences = long("absences")
        .short('a')
        .help("Classes the student missed")
        .argument::<i64>("N");
    let total_classes = long("total-classes")
        .short('t')
        .help("Classes held in the term")
        .argument::<i64>("N");
    let exams = positional::<f64>("EXAM")
        .help("Exam score between 0 and 100, three of them")
        .many()
        .guard(|e| e.len() == EXAM_COUNT, "exactly three exam scores are needed");
    let status = {
        let json = json_switch();
        construct!(Cmd::Status {
            absences,
            total_classes,
            json,
            exams,
        })
        .to_options()
        .command("status")
        .help("Compute the status of one student, without touching the sheet")
    };

    let preview = {
        let json = json_switch();
        construct!(Cmd::Preview { json })
            .to_options()
            .command("preview")
            .help("Read the sheet and print each student's status")
    };

    let on_error = long("on-error")
        .help("What to do with rows that cannot be evaluated: abort or blank")
        .argument::<RowErrorPolicy>("POLICY")
        .fallback(RowErrorPolicy::Abort)
        .display_fallback();
    let update = construct!(Cmd::Update { on_error })
        .to_options()
        .command("update")
        .help("Read the sheet and write each student's status back");

    let verbose = short('v')
        .long("verbose")
        .help("Log debug output")
        .switch();
    let spreadsheet = long("spreadsheet")
        .short('s')
        .help("Spreadsheet id, overrides SHEETS_SPREADSHEET_ID")
        .argument::<String>("ID")
        .optional();
    let cmd = construct!([status, preview, update]);

    construct!(Opts {
        verbose,
        spreadsheet,
        cmd
    })
    .to_options()
    .descr("Works out students' academic status from a class spreadsheet")
    .run()
}

/// Colors a situation label for the terminal.
fn paint(situation: Situation) -> String {
    match situation {
        Situation::Approved => situation.label().green().to_string(),
        Situation::FinalExamEligible => situation.label().yellow().to_string(),
        Situation::FailedByGrade | Situation::FailedByAbsence => {
            situation.label().red().to_string()
        }
    }
}

/// Runs the status rules for one student given on the command line.
fn single_status(absences: i64, total_classes: i64, exams: &[f64], json: bool) -> Result<()> {
    let exams: [f64; EXAM_COUNT] = exams
        .try_into()
        .context("exactly three exam scores are needed")?;
    let record = StudentRecord::new(absences, exams)?;
    let course = CourseConfig::new(total_classes)?;
    let status = record.status(&course)?;

    if json {
        let out = serde_json::json!({
            "absences": record.absences(),
            "total_classes": course.total_classes(),
            "average_grade": record.average_grade(),
            "status": status,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Average grade: {:.2}", record.average_grade());
    println!(
        "Absences: {} of at most {}",
        record.absences(),
        course.max_absences()
    );
    match status.threshold() {
        Some(min) => println!(
            "Situation: {} (needs {min} on the final exam)",
            paint(status.situation())
        ),
        None => println!("Situation: {}", paint(status.situation())),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let opts = options();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let level = if opts.verbose { Level::DEBUG } else { Level::INFO };
    let filter_layer = LevelFilter::from_level(level);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let mut settings = SheetsConfig::from_env();
    if let Some(id) = opts.spreadsheet {
        settings = settings.with_spreadsheet_id(id);
    }
    config::set(settings);
    let config = config::get();

    match opts.cmd {
        Cmd::Status {
            absences,
            total_classes,
            exams,
            json,
        } => single_status(absences, total_classes, &exams, json)?,
        Cmd::Preview { json } => {
            let client = connect(&config).await?;
            let (_, outcomes) = load_outcomes(&client, &config).await?;
            if json {
                println!("{}", render_json(&outcomes)?);
            } else {
                println!("{}", render_table(config.students_range(), &outcomes));
            }
        }
        Cmd::Update { on_error } => {
            let client = connect(&config).await?;
            let (_, outcomes) = load_outcomes(&client, &config).await?;
            eprintln!("{}", render_table(config.students_range(), &outcomes));
            write_outcomes(&client, &config, &outcomes, on_error).await?;
            eprintln!("{}", "Data updated!".green());
        }
    };

    Ok(())
}
