//! The `quizmark show` command.

use std::path::PathBuf;

use anyhow::Result;
use uuid::Uuid;

use quizmark_report::attempt_review;

pub async fn execute(quiz_id: String, attempt: Uuid, config_path: Option<PathBuf>) -> Result<()> {
    let (_, store) = super::open(config_path)?;
    let results = super::load_results(&store, &quiz_id).await?;

    let result = results
        .iter()
        .find(|r| r.attempt_id == attempt)
        .ok_or_else(|| anyhow::anyhow!("no attempt {attempt} recorded for quiz '{quiz_id}'"))?;

    println!(
        "{} <{}>, {}",
        result.student.name,
        result.student.email,
        result.timestamp.format("%Y-%m-%d %H:%M UTC")
    );
    println!();
    print!("{}", attempt_review(result, true));
    Ok(())
}
