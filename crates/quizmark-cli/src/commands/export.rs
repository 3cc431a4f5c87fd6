//! The `quizmark export` command.

use std::path::PathBuf;

use anyhow::Result;

use quizmark_core::statistics::ResultFilter;
use quizmark_report::write_csv_report;

pub async fn execute(
    quiz_id: String,
    output: PathBuf,
    filter: ResultFilter,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (_, store) = super::open(config_path)?;
    let results = super::load_results(&store, &quiz_id).await?;

    let selected = filter.apply(&results);
    write_csv_report(selected.iter().copied(), &output)?;

    tracing::info!(quiz = %quiz_id, rows = selected.len(), path = %output.display(), "results exported");
    println!("Exported {} result(s) to {}", selected.len(), output.display());
    Ok(())
}
