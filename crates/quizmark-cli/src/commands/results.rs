//! The `quizmark results` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizmark_core::statistics::ResultFilter;
use quizmark_report::markdown::format_points;
use quizmark_report::ResultsReport;

pub async fn execute(
    quiz_id: String,
    filter: ResultFilter,
    format: String,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (_, store) = super::open(config_path)?;
    let results = super::load_results(&store, &quiz_id).await?;
    let report = ResultsReport::build(&quiz_id, &results, filter);

    if let Some(path) = output {
        report.save_json(&path)?;
        println!(
            "Saved report with {} result(s) to {}",
            report.results.len(),
            path.display()
        );
        return Ok(());
    }

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "markdown" | "md" => print!("{}", report.to_markdown()),
        "text" => print_text(&report),
        other => anyhow::bail!("unknown format '{other}', expected text, json or markdown"),
    }
    Ok(())
}

fn print_text(report: &ResultsReport) {
    let Some(overview) = &report.overview else {
        println!("No results recorded yet.");
        return;
    };

    let mut table = Table::new();
    table.set_header(vec![
        "Student", "Email", "Class", "Score", "%", "Grade", "Finished", "Attempt",
    ]);
    for r in &report.results {
        table.add_row(vec![
            Cell::new(&r.student.name),
            Cell::new(&r.student.email),
            Cell::new(&r.student.class_name),
            Cell::new(format!("{} / {}", format_points(r.score), r.max_points)),
            Cell::new(format!("{:.2}", r.percentage)),
            Cell::new(r.grade),
            Cell::new(r.timestamp.format("%Y-%m-%d %H:%M")),
            Cell::new(r.attempt_id),
        ]);
    }
    println!("{table}");

    println!(
        "\n{} attempt(s) by {} student(s). Average {:.2}%, best {:.2}%, average grade {:.2}.",
        overview.attempts,
        overview.distinct_students,
        overview.average_percentage,
        overview.best_percentage,
        overview.average_grade
    );
    let distribution = report
        .grade_distribution
        .iter()
        .rev()
        .map(|(grade, count)| format!("{grade}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");
    println!("Grades: {distribution}");
}
