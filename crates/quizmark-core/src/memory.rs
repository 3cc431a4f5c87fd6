//! In-memory collaborators for tests and embedding.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::model::{AttemptResult, Quiz, QuizSettings, QuizSummary};
use crate::traits::{QuizRepository, ResultStore};

/// A quiz repository backed by maps.
#[derive(Default)]
pub struct MemoryQuizRepository {
    quizzes: Mutex<BTreeMap<String, Quiz>>,
    settings: Mutex<HashMap<String, QuizSettings>>,
}

impl MemoryQuizRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository with a quiz and its settings.
    pub fn with_quiz(quiz: Quiz, settings: QuizSettings) -> Self {
        let id = quiz.id.clone();
        Self {
            quizzes: Mutex::new(BTreeMap::from([(id.clone(), quiz)])),
            settings: Mutex::new(HashMap::from([(id, settings)])),
        }
    }
}

#[async_trait]
impl QuizRepository for MemoryQuizRepository {
    async fn load_quiz(&self, quiz_id: &str) -> anyhow::Result<Option<Quiz>> {
        Ok(self.quizzes.lock().await.get(quiz_id).cloned())
    }

    async fn load_quiz_settings(&self, quiz_id: &str) -> anyhow::Result<QuizSettings> {
        Ok(self
            .settings
            .lock()
            .await
            .get(quiz_id)
            .copied()
            .unwrap_or_default())
    }

    async fn save_quiz(&self, quiz: &Quiz) -> anyhow::Result<()> {
        self.quizzes
            .lock()
            .await
            .insert(quiz.id.clone(), quiz.clone());
        Ok(())
    }

    async fn save_quiz_settings(
        &self,
        quiz_id: &str,
        settings: &QuizSettings,
    ) -> anyhow::Result<()> {
        self.settings
            .lock()
            .await
            .insert(quiz_id.to_string(), *settings);
        Ok(())
    }

    async fn list_quizzes(&self, for_students: bool) -> anyhow::Result<Vec<QuizSummary>> {
        let quizzes = self.quizzes.lock().await;
        let settings = self.settings.lock().await;
        Ok(quizzes
            .values()
            .map(|quiz| QuizSummary {
                id: quiz.id.clone(),
                name: quiz.name.clone(),
                question_count: quiz.questions.len(),
                visible: settings
                    .get(&quiz.id)
                    .is_some_and(|s| s.visible_to_students),
            })
            .filter(|summary| !for_students || summary.visible)
            .collect())
    }
}

/// A result store that keeps records in a vector.
///
/// Appends can be made to fail on demand to exercise persistence errors.
#[derive(Default)]
pub struct MemoryResultStore {
    results: Mutex<Vec<AttemptResult>>,
    fail_appends: AtomicBool,
    append_calls: AtomicU32,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following append fail (or succeed again).
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::Relaxed);
    }

    /// Number of append attempts, failed ones included.
    pub fn append_calls(&self) -> u32 {
        self.append_calls.load(Ordering::Relaxed)
    }

    /// Every stored result across all quizzes.
    pub async fn all(&self) -> Vec<AttemptResult> {
        self.results.lock().await.clone()
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn append_result(&self, result: &AttemptResult) -> anyhow::Result<()> {
        self.append_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_appends.load(Ordering::Relaxed) {
            anyhow::bail!("result store unavailable");
        }
        self.results.lock().await.push(result.clone());
        Ok(())
    }

    async fn load_results(&self, quiz_id: &str) -> anyhow::Result<Vec<AttemptResult>> {
        Ok(self
            .results
            .lock()
            .await
            .iter()
            .filter(|r| r.quiz_id == quiz_id)
            .cloned()
            .collect())
    }
}
