//! The `quizmark list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizmark_core::traits::QuizRepository;

pub async fn execute(students: bool, config_path: Option<PathBuf>) -> Result<()> {
    let (_, store) = super::open(config_path)?;
    let quizzes = store.quizzes.list_quizzes(students).await?;

    if quizzes.is_empty() {
        println!("No quizzes found. Run `quizmark init` to create a sample quiz.");
        return Ok(());
    }

    let active = store.quizzes.active_quiz().await?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Questions", "Visible", "Active"]);
    for quiz in &quizzes {
        let is_active = active.as_deref() == Some(quiz.id.as_str());
        table.add_row(vec![
            Cell::new(&quiz.id),
            Cell::new(&quiz.name),
            Cell::new(quiz.question_count),
            Cell::new(if quiz.visible { "yes" } else { "no" }),
            Cell::new(if is_active { "*" } else { "" }),
        ]);
    }

    println!("{table}");
    Ok(())
}
