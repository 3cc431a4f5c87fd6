//! The `quizmark import` command: add an authored quiz file to the store.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizmark_core::parser::{parse_quiz, quiz_id_from_name, validate_quiz};
use quizmark_core::traits::QuizRepository;

pub async fn execute(
    file: PathBuf,
    name: Option<String>,
    replace: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (_, store) = super::open(config_path)?;

    let mut quiz = parse_quiz(&file)?;
    if let Some(name) = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
        quiz.name = name;
    }
    quiz.id = quiz_id_from_name(&quiz.name);
    if quiz.id.is_empty() {
        anyhow::bail!("quiz name is empty, pass --name");
    }

    if !replace && store.quizzes.load_quiz(&quiz.id).await?.is_some() {
        anyhow::bail!(
            "quiz '{}' already exists, pass --replace to overwrite it",
            quiz.id
        );
    }

    for issue in validate_quiz(&quiz) {
        println!("  {issue}");
    }

    store
        .quizzes
        .save_quiz(&quiz)
        .await
        .with_context(|| format!("quiz '{}' was not saved", quiz.id))?;

    println!(
        "Imported {} as '{}' ({} questions, {} points).",
        quiz.name,
        quiz.id,
        quiz.questions.len(),
        quiz.max_points()
    );
    let settings = store.quizzes.load_quiz_settings(&quiz.id).await?;
    if !settings.visible_to_students {
        println!(
            "Students cannot see it yet. Run: quizmark settings --quiz-id {} --visible true",
            quiz.id
        );
    }
    Ok(())
}
