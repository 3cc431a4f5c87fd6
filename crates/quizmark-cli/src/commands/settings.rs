//! The `quizmark settings` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizmark_core::model::QuizSettings;
use quizmark_core::traits::QuizRepository;

/// Requested changes; `None` leaves a setting as it is.
#[derive(Debug, Default)]
pub struct SettingsChanges {
    pub visible: Option<bool>,
    pub allow_retake: Option<bool>,
    pub show_correct: Option<bool>,
    pub shuffle: Option<bool>,
    pub questions_to_show: Option<usize>,
    pub activate: bool,
}

impl SettingsChanges {
    fn is_empty(&self) -> bool {
        self.visible.is_none()
            && self.allow_retake.is_none()
            && self.show_correct.is_none()
            && self.shuffle.is_none()
            && self.questions_to_show.is_none()
    }

    fn apply(&self, settings: &mut QuizSettings) {
        if let Some(v) = self.visible {
            settings.visible_to_students = v;
        }
        if let Some(v) = self.allow_retake {
            settings.allow_retake = v;
        }
        if let Some(v) = self.show_correct {
            settings.show_correct_answers = v;
        }
        if let Some(v) = self.shuffle {
            settings.shuffle_questions = v;
            settings.shuffle_options = v;
        }
        if let Some(n) = self.questions_to_show {
            settings.questions_to_show = n;
        }
    }
}

pub async fn execute(
    quiz_id: String,
    changes: SettingsChanges,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (_, store) = super::open(config_path)?;
    super::require_quiz(&store, &quiz_id).await?;

    let mut settings = store.quizzes.load_quiz_settings(&quiz_id).await?;
    if !changes.is_empty() {
        changes.apply(&mut settings);
        store
            .quizzes
            .save_quiz_settings(&quiz_id, &settings)
            .await?;
        println!("Updated settings for {quiz_id}.");
    }
    if changes.activate {
        store.quizzes.set_active_quiz(Some(&quiz_id)).await?;
        println!("{quiz_id} is now the active quiz.");
    }

    let yes_no = |b: bool| if b { "yes" } else { "no" };
    let mut table = Table::new();
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec![
        Cell::new("Visible to students"),
        Cell::new(yes_no(settings.visible_to_students)),
    ]);
    table.add_row(vec![
        Cell::new("Allow retake"),
        Cell::new(yes_no(settings.allow_retake)),
    ]);
    table.add_row(vec![
        Cell::new("Show correct answers"),
        Cell::new(yes_no(settings.show_correct_answers)),
    ]);
    table.add_row(vec![
        Cell::new("Shuffle questions"),
        Cell::new(yes_no(settings.shuffle_questions)),
    ]);
    table.add_row(vec![
        Cell::new("Shuffle options"),
        Cell::new(yes_no(settings.shuffle_options)),
    ]);
    let draw = match settings.questions_to_show {
        0 => "all".to_string(),
        n => n.to_string(),
    };
    table.add_row(vec![Cell::new("Questions per attempt"), Cell::new(draw)]);

    println!("{table}");
    Ok(())
}
