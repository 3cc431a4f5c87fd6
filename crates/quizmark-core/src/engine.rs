//! Attempt orchestrator.
//!
//! Owns the live sessions keyed by attempt id, loads quizzes through the
//! [`QuizRepository`], and hands finished attempts to the [`ResultStore`].

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::EngineError;
use crate::model::{AttemptResult, Question, Quiz, QuizSettings, Student, SubmittedAnswer};
use crate::parser::ensure_valid;
use crate::session::{QuizSession, SubmitOutcome};
use crate::traits::{QuizRepository, ResultStore};

/// Configuration for the quiz engine.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Allow attempts on quizzes hidden from students (instructor preview).
    pub include_hidden: bool,
}

/// Runs attempts against a quiz repository and a result store.
pub struct QuizEngine {
    quizzes: Arc<dyn QuizRepository>,
    results: Arc<dyn ResultStore>,
    sessions: Mutex<HashMap<Uuid, QuizSession>>,
    config: EngineConfig,
}

impl QuizEngine {
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        results: Arc<dyn ResultStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            quizzes,
            results,
            sessions: Mutex::new(HashMap::new()),
            config,
        }
    }

    async fn load_startable(&self, quiz_id: &str) -> Result<(Quiz, QuizSettings), EngineError> {
        let quiz = self
            .quizzes
            .load_quiz(quiz_id)
            .await?
            .ok_or_else(|| EngineError::QuizNotFound(quiz_id.to_string()))?;
        let settings = self.quizzes.load_quiz_settings(quiz_id).await?;

        if !settings.visible_to_students && !self.config.include_hidden {
            return Err(EngineError::QuizNotVisible(quiz_id.to_string()));
        }
        ensure_valid(&quiz)?;

        Ok((quiz, settings))
    }

    /// Start a new attempt and return its id.
    ///
    /// Any live attempt of the same student is discarded.
    pub async fn begin(&self, quiz_id: &str, student: Student) -> Result<Uuid, EngineError> {
        let (quiz, settings) = self.load_startable(quiz_id).await?;

        let mut session = QuizSession::new(student);
        session.start(&quiz, &settings)?;
        let attempt_id = session.attempt_id();
        let key = session.student().key();

        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, existing| existing.student().key() != key);
        sessions.insert(attempt_id, session);

        tracing::info!(attempt = %attempt_id, quiz = quiz_id, "attempt begun");
        Ok(attempt_id)
    }

    /// The question awaiting an answer, or `None` once the attempt is complete.
    pub async fn current_question(&self, attempt_id: Uuid) -> Result<Option<Question>, EngineError> {
        let sessions = self.sessions.lock().await;
        let session = sessions
            .get(&attempt_id)
            .ok_or(EngineError::UnknownAttempt(attempt_id))?;
        Ok(session.current_question().cloned())
    }

    /// A snapshot of a live or completed session.
    pub async fn session(&self, attempt_id: Uuid) -> Result<QuizSession, EngineError> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(&attempt_id)
            .cloned()
            .ok_or(EngineError::UnknownAttempt(attempt_id))
    }

    /// Submit an answer to the current question of an attempt.
    ///
    /// When this completes the attempt the result is appended to the store. If
    /// that fails the computed result is returned inside
    /// [`EngineError::Persist`].
    pub async fn submit(
        &self,
        attempt_id: Uuid,
        answer: SubmittedAnswer,
    ) -> Result<SubmitOutcome, EngineError> {
        let outcome = {
            let mut sessions = self.sessions.lock().await;
            let session = sessions
                .get_mut(&attempt_id)
                .ok_or(EngineError::UnknownAttempt(attempt_id))?;
            match session.submit_current_answer(answer) {
                Ok(outcome) => outcome,
                Err(e) => {
                    if e.is_input_rejection() {
                        tracing::debug!(attempt = %attempt_id, "answer rejected: {e}");
                    }
                    return Err(e.into());
                }
            }
        };

        if let SubmitOutcome::Completed(result) = &outcome {
            if let Err(source) = self.results.append_result(result).await {
                let record = persisted_record(result);
                tracing::error!(
                    attempt = %result.attempt_id,
                    quiz = %result.quiz_id,
                    result = %record,
                    "failed to store attempt result: {source:#}"
                );
                return Err(EngineError::Persist {
                    result: Box::new(result.clone()),
                    source,
                });
            }
            tracing::info!(
                attempt = %result.attempt_id,
                quiz = %result.quiz_id,
                score = result.score,
                max_points = result.max_points,
                percentage = result.percentage,
                grade = %result.grade,
                "attempt completed"
            );
        }

        Ok(outcome)
    }

    /// Discard an attempt and start the same quiz afresh.
    ///
    /// Enforces the quiz's retake policy and returns the new attempt id.
    pub async fn restart(&self, attempt_id: Uuid) -> Result<Uuid, EngineError> {
        let (quiz_id, student) = {
            let mut sessions = self.sessions.lock().await;
            let session = sessions
                .get_mut(&attempt_id)
                .ok_or(EngineError::UnknownAttempt(attempt_id))?;
            let quiz_id = session.quiz_id().to_string();
            session.restart()?;
            let student = session.student().clone();
            sessions.remove(&attempt_id);
            (quiz_id, student)
        };

        tracing::debug!(attempt = %attempt_id, quiz = %quiz_id, "attempt restarted");
        self.begin(&quiz_id, student).await
    }

    /// Drop an attempt. Returns whether it existed.
    pub async fn abandon(&self, attempt_id: Uuid) -> bool {
        let removed = self.sessions.lock().await.remove(&attempt_id).is_some();
        if removed {
            tracing::debug!(attempt = %attempt_id, "attempt abandoned");
        }
        removed
    }

    /// Number of sessions currently held.
    pub async fn live_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

/// The result as logged when storing it failed: JSON, or `Debug` output if
/// serialization fails too.
fn persisted_record(result: &AttemptResult) -> String {
    serde_json::to_string(result).unwrap_or_else(|_| format!("{result:?}"))
}
