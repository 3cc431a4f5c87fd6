//! CSV export of attempt results.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::SecondsFormat;

use quizmark_core::model::AttemptResult;

use crate::markdown::format_points;

/// Column header of the export.
pub const CSV_HEADER: [&str; 8] = [
    "name",
    "email",
    "class",
    "score",
    "max_points",
    "percentage",
    "grade",
    "timestamp",
];

/// Quote a field per RFC 4180 when it needs it.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_row<S: AsRef<str>>(out: &mut String, fields: &[S]) {
    let row: Vec<String> = fields.iter().map(|f| escape_field(f.as_ref())).collect();
    out.push_str(&row.join(","));
    out.push_str("\r\n");
}

/// Render results as CSV, one row per attempt, header first.
pub fn results_to_csv<'a, I>(results: I) -> String
where
    I: IntoIterator<Item = &'a AttemptResult>,
{
    let mut out = String::new();
    push_row(&mut out, &CSV_HEADER);
    for result in results {
        push_row(
            &mut out,
            &[
                result.student.name.clone(),
                result.student.email.clone(),
                result.student.class_name.clone(),
                format_points(result.score),
                result.max_points.to_string(),
                format!("{:.2}", result.percentage),
                result.grade.to_string(),
                result.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            ],
        );
    }
    out
}

/// Write the CSV export to a file, creating parent directories.
pub fn write_csv_report<'a, I>(results: I, path: &Path) -> Result<()>
where
    I: IntoIterator<Item = &'a AttemptResult>,
{
    let csv = results_to_csv(results);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, csv)
        .with_context(|| format!("failed to write CSV to {}", path.display()))?;
    Ok(())
}
