//! Collaborator traits for quiz storage and result persistence.
//!
//! The engine only talks to these traits. `quizmark-store` implements them
//! over the filesystem, and [`crate::memory`] provides in-memory versions for
//! tests and embedding.

use async_trait::async_trait;

use crate::model::{AttemptResult, Quiz, QuizSettings, QuizSummary};

// ---------------------------------------------------------------------------
// Quiz repository
// ---------------------------------------------------------------------------

/// Source of quiz definitions and their settings.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Load a quiz by id.
    ///
    /// Returns `Ok(None)` when no such quiz exists and `Err` when it exists
    /// but cannot be read or parsed.
    async fn load_quiz(&self, quiz_id: &str) -> anyhow::Result<Option<Quiz>>;

    /// Settings for a quiz, falling back to defaults when none are stored.
    async fn load_quiz_settings(&self, quiz_id: &str) -> anyhow::Result<QuizSettings>;

    /// Create or replace a quiz.
    async fn save_quiz(&self, quiz: &Quiz) -> anyhow::Result<()>;

    /// Create or replace the settings of a quiz.
    async fn save_quiz_settings(&self, quiz_id: &str, settings: &QuizSettings)
        -> anyhow::Result<()>;

    /// Summaries of the stored quizzes, sorted by id.
    ///
    /// With `for_students` set, only quizzes visible to students are listed.
    async fn list_quizzes(&self, for_students: bool) -> anyhow::Result<Vec<QuizSummary>>;
}

// ---------------------------------------------------------------------------
// Result store
// ---------------------------------------------------------------------------

/// Append-only log of completed attempts.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Durably append one result.
    ///
    /// Concurrent appends for the same quiz must not lose or interleave
    /// records.
    async fn append_result(&self, result: &AttemptResult) -> anyhow::Result<()>;

    /// All results recorded for a quiz, oldest first.
    async fn load_results(&self, quiz_id: &str) -> anyhow::Result<Vec<AttemptResult>>;
}
