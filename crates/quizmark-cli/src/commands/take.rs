//! The `quizmark take` command: an interactive attempt over stdin.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use quizmark_core::engine::{EngineConfig, QuizEngine};
use quizmark_core::model::{Question, QuestionKind, Student, SubmittedAnswer};
use quizmark_core::traits::{QuizRepository, ResultStore};
use quizmark_core::{EngineError, SubmitOutcome};
use quizmark_report::markdown::{attempt_review, format_points};

pub async fn execute(
    quiz_id: Option<String>,
    name: String,
    email: String,
    class: String,
    preview: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (config, store) = super::open(config_path)?;

    let quiz_id = match quiz_id {
        Some(id) => id,
        None => match store.quizzes.active_quiz().await? {
            Some(id) => id,
            None => config.active_quiz.clone().context(
                "no quiz selected: pass --quiz-id or activate one with `quizmark settings --activate`",
            )?,
        },
    };

    let student = Student::new(name.trim(), email.trim(), class.trim());
    if student.name.is_empty() {
        anyhow::bail!("a student name is required");
    }
    if student.email.is_empty() {
        anyhow::bail!("a student email is required");
    }

    let settings = store.quizzes.load_quiz_settings(&quiz_id).await?;
    if !settings.allow_retake {
        let key = student.key();
        let taken = store
            .results
            .load_results(&quiz_id)
            .await?
            .iter()
            .any(|r| r.student.key() == key);
        if taken {
            anyhow::bail!("{} has already taken quiz '{quiz_id}'", student.email);
        }
    }

    let quizzes: Arc<dyn QuizRepository> = store.quizzes.clone();
    let results: Arc<dyn ResultStore> = store.results.clone();
    let engine = QuizEngine::new(
        quizzes,
        results,
        EngineConfig {
            include_hidden: preview,
        },
    );

    let attempt_id = engine.begin(&quiz_id, student).await?;
    let session = engine.session(attempt_id).await?;
    let show_correct = session.settings().show_correct_answers;
    let total = session.position().1;

    let mut input = io::stdin().lock().lines();
    let mut number = 1;

    while let Some(question) = engine.current_question(attempt_id).await? {
        print_question(&question, number, total);

        let answer = loop {
            print!("> ");
            io::stdout().flush()?;
            let line = match input.next() {
                Some(line) => line.context("failed to read answer")?,
                None => anyhow::bail!("input ended before the quiz was finished"),
            };
            match read_answer(&question, &line) {
                Ok(answer) => break answer,
                Err(message) => println!("{message}"),
            }
        };

        match engine.submit(attempt_id, answer).await {
            Ok(SubmitOutcome::Answered(_)) => number += 1,
            Ok(SubmitOutcome::Completed(result)) => {
                println!();
                println!(
                    "Score: {} / {} ({:.2}%), grade {}",
                    format_points(result.score),
                    result.max_points,
                    result.percentage,
                    result.grade
                );
                println!();
                println!("{}", attempt_review(&result, show_correct));
                println!("Attempt {} recorded.", result.attempt_id);
                return Ok(());
            }
            Err(e) if e.is_input_rejection() => println!("{e}"),
            Err(e @ EngineError::Persist { .. }) => {
                if let Some(result) = e.unsaved_result() {
                    println!("{}", attempt_review(result, show_correct));
                    println!("The result above could not be saved.");
                }
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

fn print_question(question: &Question, number: usize, total: usize) {
    println!();
    let unit = if question.points == 1 { "point" } else { "points" };
    println!(
        "Question {number}/{total} ({} {unit}): {}",
        question.points, question.text
    );
    if let Some(image) = &question.image {
        println!("  [image: {image}]");
    }
    for (i, option) in question.options().iter().enumerate() {
        println!("  {}. {option}", i + 1);
    }
    match question.kind() {
        QuestionKind::Single => println!("Choose one option (number or text)."),
        QuestionKind::Multiple => println!("Choose all that apply, separated by commas."),
        QuestionKind::Text => println!("Type your answer."),
    }
}

/// Turn one line of input into a submission for `question`.
///
/// Options are picked by their 1-based number or their exact text. Blank and
/// empty inputs are passed through so the session can reject them.
fn read_answer(question: &Question, line: &str) -> Result<SubmittedAnswer, String> {
    match question.kind() {
        QuestionKind::Single => {
            let choice = line.trim();
            if choice.is_empty() {
                return Ok(SubmittedAnswer::Single(String::new()));
            }
            pick_option(question.options(), choice).map(SubmittedAnswer::Single)
        }
        QuestionKind::Multiple => {
            let picked = line
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|choice| pick_option(question.options(), choice))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(SubmittedAnswer::selection(picked))
        }
        QuestionKind::Text => Ok(SubmittedAnswer::Text(line.to_string())),
    }
}

fn pick_option(options: &[String], choice: &str) -> Result<String, String> {
    if let Ok(n) = choice.parse::<usize>() {
        if (1..=options.len()).contains(&n) {
            return Ok(options[n - 1].clone());
        }
    }
    options
        .iter()
        .find(|o| o.as_str() == choice)
        .cloned()
        .ok_or_else(|| format!("unknown option: {choice}"))
}
