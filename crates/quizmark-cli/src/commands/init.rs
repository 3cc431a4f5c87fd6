//! The `quizmark init` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use quizmark_core::model::QuizSettings;
use quizmark_core::traits::QuizRepository;
use quizmark_store::{load_config_from, open_store, QuizmarkConfig};

const SAMPLE_QUIZ_ID: &str = "sample_quiz";

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    // Create quizmark.toml
    let config_file = config_path.unwrap_or_else(|| PathBuf::from("quizmark.toml"));
    if config_file.exists() {
        println!("{} already exists, skipping.", config_file.display());
    } else {
        let starter = QuizmarkConfig {
            active_quiz: Some(SAMPLE_QUIZ_ID.to_string()),
            ..QuizmarkConfig::default()
        };
        std::fs::write(&config_file, starter.to_toml()?)
            .with_context(|| format!("failed to write {}", config_file.display()))?;
        println!("Created {}", config_file.display());
    }

    let config = load_config_from(Some(&config_file))?;
    let store = open_store(&config);

    // Create the sample quiz
    let quiz_path = config
        .quizzes_path()
        .join(format!("{SAMPLE_QUIZ_ID}.json"));
    if quiz_path.exists() {
        println!("{} already exists, skipping.", quiz_path.display());
    } else {
        write_sample_quiz(&quiz_path)?;
        println!("Created {}", quiz_path.display());
    }

    // Publish it to students
    let settings_path = config.settings_path();
    if settings_path.exists() {
        println!("{} already exists, skipping.", settings_path.display());
    } else {
        let settings = QuizSettings {
            visible_to_students: true,
            ..config.default_settings
        };
        store
            .quizzes
            .save_quiz_settings(SAMPLE_QUIZ_ID, &settings)
            .await?;
        store.quizzes.set_active_quiz(Some(SAMPLE_QUIZ_ID)).await?;
        println!("Created {}", settings_path.display());
    }

    println!("\nNext steps:");
    println!("  1. Run: quizmark validate --quiz {}", quiz_path.display());
    println!("  2. Run: quizmark take --name \"Your Name\" --email you@example.com");
    println!("  3. Run: quizmark results --quiz-id {SAMPLE_QUIZ_ID}");

    Ok(())
}

fn write_sample_quiz(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, SAMPLE_QUIZ)
        .with_context(|| format!("failed to write {}", path.display()))
}

const SAMPLE_QUIZ: &str = r#"[
  {
    "quiz_name": "Sample Quiz",
    "question": "What is the capital of Hungary?",
    "type": "single",
    "options": ["Vienna", "Budapest", "Prague", "Bratislava"],
    "answer": "Budapest",
    "points": 2
  },
  {
    "question": "Which rivers flow through Hungary?",
    "type": "multiple",
    "options": ["Danube", "Tisza", "Rhine", "Seine"],
    "answer": ["Danube", "Tisza"],
    "points": 3
  },
  {
    "question": "How much is 29/5?",
    "type": "text",
    "answer": ["5.8"],
    "match_type": "number",
    "points": 1
  },
  {
    "question": "Name the largest lake in Central Europe.",
    "type": "text",
    "answer": ["Balaton"],
    "match_type": "contains",
    "points": 2
  }
]
"#;
