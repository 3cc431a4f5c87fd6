//! The `quizmark validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizmark_core::parser::{load_quiz_directory, parse_quiz, validate_quiz, Severity};

pub fn execute(quiz_path: PathBuf) -> Result<()> {
    let quizzes = if quiz_path.is_dir() {
        load_quiz_directory(&quiz_path)?
    } else {
        vec![parse_quiz(&quiz_path)?]
    };

    let mut errors = 0;
    let mut warnings = 0;

    for quiz in &quizzes {
        println!(
            "Quiz: {} ({} questions, {} points)",
            quiz.name,
            quiz.questions.len(),
            quiz.max_points()
        );

        for issue in validate_quiz(quiz) {
            let prefix = issue
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            match issue.severity {
                Severity::Error => {
                    errors += 1;
                    println!("{prefix} ERROR: {}", issue.message);
                }
                Severity::Warning => {
                    warnings += 1;
                    println!("{prefix} WARNING: {}", issue.message);
                }
            }
        }
    }

    if errors == 0 && warnings == 0 {
        println!("All quizzes valid.");
    } else {
        println!("\n{errors} error(s), {warnings} warning(s) found.");
    }

    if errors > 0 {
        anyhow::bail!("{errors} quiz error(s) must be fixed");
    }
    Ok(())
}
