//! Append-only JSON-lines result logs, one per quiz.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use quizmark_core::model::AttemptResult;
use quizmark_core::traits::ResultStore;

use crate::quizzes::checked_id;

/// A [`ResultStore`] writing `<results_dir>/<quiz id>_results.jsonl`.
pub struct FsResultStore {
    results_dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FsResultStore {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Path of the log for a quiz.
    pub fn log_path(&self, quiz_id: &str) -> Result<PathBuf> {
        Ok(self
            .results_dir
            .join(format!("{}_results.jsonl", checked_id(quiz_id)?)))
    }

    async fn lock_for(&self, quiz_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(quiz_id.to_string()).or_default())
    }
}

#[async_trait]
impl ResultStore for FsResultStore {
    async fn append_result(&self, result: &AttemptResult) -> Result<()> {
        let path = self.log_path(&result.quiz_id)?;
        let mut line = serde_json::to_string(result).context("failed to serialize result")?;
        line.push('\n');

        let lock = self.lock_for(&result.quiz_id).await;
        let _guard = lock.lock().await;

        tokio::fs::create_dir_all(&self.results_dir)
            .await
            .with_context(|| format!("failed to create directory: {}", self.results_dir.display()))?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("failed to open result log: {}", path.display()))?;
        file.write_all(line.as_bytes())
            .await
            .with_context(|| format!("failed to append to {}", path.display()))?;
        file.flush().await?;
        file.sync_data()
            .await
            .with_context(|| format!("failed to sync {}", path.display()))?;

        tracing::debug!(
            attempt = %result.attempt_id,
            log = %path.display(),
            "result appended"
        );
        Ok(())
    }

    async fn load_results(&self, quiz_id: &str) -> Result<Vec<AttemptResult>> {
        let path = self.log_path(quiz_id)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read result log: {}", path.display()))
            }
        };

        let mut results = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AttemptResult>(line) {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::warn!("skipping line {} of {}: {e}", index + 1, path.display());
                }
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quizmark_core::grade::Grade;
    use quizmark_core::model::{
        AnswerKey, MatchPolicy, Question, ScoredAnswer, Student, SubmittedAnswer,
    };
    use uuid::Uuid;

    fn result(quiz_id: &str, email: &str, score: f64) -> AttemptResult {
        let question = Question {
            id: "q1".into(),
            text: "What is 29/5?".into(),
            key: AnswerKey::Text {
                answer: vec!["29/5".into()],
                policy: MatchPolicy::Number,
            },
            points: 4,
            image: None,
        };
        let percentage = score / 4.0 * 100.0;
        AttemptResult {
            attempt_id: Uuid::new_v4(),
            quiz_id: quiz_id.into(),
            student: Student::new("Student", email, "9.A"),
            score,
            total_questions: 1,
            max_points: 4,
            percentage,
            grade: Grade::from_percentage(percentage),
            timestamp: Utc::now(),
            answers: vec![ScoredAnswer {
                question,
                submitted: SubmittedAnswer::Text("5,8".into()),
                earned_points: score,
                max_points: 4,
                is_correct: score == 4.0,
                normalized_answer: Some("5,8".into()),
            }],
        }
    }

    #[tokio::test]
    async fn append_then_load_reproduces_results() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsResultStore::new(dir.path().join("results"));
        assert!(store.load_results("math").await.unwrap().is_empty());

        let first = result("math", "a@example.com", 4.0);
        let second = result("math", "b@example.com", 1.0);
        store.append_result(&first).await.unwrap();
        store.append_result(&second).await.unwrap();
        store.append_result(&result("other", "c@example.com", 2.0)).await.unwrap();

        let loaded = store.load_results("math").await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].attempt_id, first.attempt_id);
        assert_eq!(loaded[0].score, first.score);
        assert_eq!(loaded[0].percentage, first.percentage);
        assert_eq!(loaded[0].grade, first.grade);
        assert_eq!(loaded[1], second);
        assert!(dir.path().join("results/math_results.jsonl").exists());
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsResultStore::new(dir.path());
        store
            .append_result(&result("math", "a@example.com", 4.0))
            .await
            .unwrap();

        let path = store.log_path("math").unwrap();
        let mut content = std::fs::read_to_string(&path).unwrap();
        content.push_str("{ truncated\n\n");
        std::fs::write(&path, content).unwrap();
        store
            .append_result(&result("math", "b@example.com", 2.0))
            .await
            .unwrap();

        let loaded = store.load_results("math").await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].student.email, "b@example.com");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_lose_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FsResultStore::new(dir.path()));

        let handles: Vec<_> = (0..40)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let r = result("shared", &format!("s{i}@example.com"), (i % 5) as f64);
                    store.append_result(&r).await.map(|_| r.attempt_id)
                })
            })
            .collect();

        let mut expected = Vec::new();
        for handle in handles {
            expected.push(handle.await.unwrap().unwrap());
        }

        let loaded = store.load_results("shared").await.unwrap();
        assert_eq!(loaded.len(), 40);
        let mut got: Vec<Uuid> = loaded.iter().map(|r| r.attempt_id).collect();
        got.sort();
        expected.sort();
        assert_eq!(got, expected);
    }
}
