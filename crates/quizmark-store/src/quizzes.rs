//! Quiz definitions and settings on disk.
//!
//! Each quiz lives in `<quizzes_dir>/<id>.json`. Settings for every quiz share
//! one JSON file alongside the name of the active quiz.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use quizmark_core::model::{Quiz, QuizSettings, QuizSummary};
use quizmark_core::parser::{ensure_valid, parse_quiz_str};
use quizmark_core::traits::QuizRepository;

/// Layout of the settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub active_quiz: Option<String>,
    #[serde(default)]
    pub quiz_settings: BTreeMap<String, QuizSettings>,
}

/// A [`QuizRepository`] over a directory of JSON files.
pub struct FsQuizRepository {
    quizzes_dir: PathBuf,
    settings_file: PathBuf,
    default_settings: QuizSettings,
    settings_lock: Mutex<()>,
}

impl FsQuizRepository {
    pub fn new(
        quizzes_dir: impl Into<PathBuf>,
        settings_file: impl Into<PathBuf>,
        default_settings: QuizSettings,
    ) -> Self {
        Self {
            quizzes_dir: quizzes_dir.into(),
            settings_file: settings_file.into(),
            default_settings,
            settings_lock: Mutex::new(()),
        }
    }

    pub fn quizzes_dir(&self) -> &Path {
        &self.quizzes_dir
    }

    fn quiz_path(&self, quiz_id: &str) -> Result<PathBuf> {
        Ok(self.quizzes_dir.join(format!("{}.json", checked_id(quiz_id)?)))
    }

    async fn read_settings(&self) -> Result<SettingsFile> {
        match tokio::fs::read_to_string(&self.settings_file).await {
            Ok(content) => serde_json::from_str(&content).with_context(|| {
                format!(
                    "failed to parse settings file: {}",
                    self.settings_file.display()
                )
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(SettingsFile::default()),
            Err(e) => Err(e).with_context(|| {
                format!(
                    "failed to read settings file: {}",
                    self.settings_file.display()
                )
            }),
        }
    }

    /// Read-modify-write the settings file under the settings lock.
    async fn update_settings<F>(&self, update: F) -> Result<()>
    where
        F: FnOnce(&mut SettingsFile) + Send,
    {
        let _guard = self.settings_lock.lock().await;
        let mut file = self.read_settings().await?;
        update(&mut file);
        let json = serde_json::to_string_pretty(&file).context("failed to serialize settings")?;
        write_atomic(&self.settings_file, json.as_bytes()).await
    }

    /// The quiz marked active, if any.
    pub async fn active_quiz(&self) -> Result<Option<String>> {
        Ok(self.read_settings().await?.active_quiz)
    }

    pub async fn set_active_quiz(&self, quiz_id: Option<&str>) -> Result<()> {
        if let Some(id) = quiz_id {
            checked_id(id)?;
        }
        let active = quiz_id.map(str::to_string);
        self.update_settings(move |file| file.active_quiz = active)
            .await
    }

    /// Ids of every quiz file, sorted.
    async fn quiz_ids(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.quizzes_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to read directory: {}", self.quizzes_dir.display())
                })
            }
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem() {
                    ids.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl QuizRepository for FsQuizRepository {
    async fn load_quiz(&self, quiz_id: &str) -> Result<Option<Quiz>> {
        let path = self.quiz_path(quiz_id)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read quiz file: {}", path.display()))
            }
        };

        let mut quiz = parse_quiz_str(&content, quiz_id)
            .with_context(|| format!("failed to parse quiz: {}", path.display()))?;
        // The file name is authoritative.
        quiz.id = quiz_id.to_string();
        Ok(Some(quiz))
    }

    async fn load_quiz_settings(&self, quiz_id: &str) -> Result<QuizSettings> {
        Ok(self
            .read_settings()
            .await?
            .quiz_settings
            .get(quiz_id)
            .copied()
            .unwrap_or(self.default_settings))
    }

    async fn save_quiz(&self, quiz: &Quiz) -> Result<()> {
        ensure_valid(quiz)?;
        let path = self.quiz_path(&quiz.id)?;
        tokio::fs::create_dir_all(&self.quizzes_dir)
            .await
            .with_context(|| format!("failed to create directory: {}", self.quizzes_dir.display()))?;

        let json = serde_json::to_string_pretty(quiz).context("failed to serialize quiz")?;
        write_atomic(&path, json.as_bytes()).await?;
        tracing::info!(quiz = %quiz.id, questions = quiz.questions.len(), "quiz saved");
        Ok(())
    }

    async fn save_quiz_settings(&self, quiz_id: &str, settings: &QuizSettings) -> Result<()> {
        checked_id(quiz_id)?;
        let id = quiz_id.to_string();
        let settings = *settings;
        self.update_settings(move |file| {
            file.quiz_settings.insert(id, settings);
        })
        .await?;
        tracing::info!(quiz = quiz_id, "quiz settings saved");
        Ok(())
    }

    async fn list_quizzes(&self, for_students: bool) -> Result<Vec<QuizSummary>> {
        let ids = self.quiz_ids().await?;
        let settings = self.read_settings().await?;

        let loaded = futures::future::join_all(ids.iter().map(|id| self.load_quiz(id))).await;

        let mut summaries = Vec::with_capacity(ids.len());
        for (id, quiz) in ids.iter().zip(loaded) {
            let quiz = match quiz {
                Ok(Some(quiz)) => quiz,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!("skipping quiz {id}: {e:#}");
                    continue;
                }
            };
            let visible = settings
                .quiz_settings
                .get(id)
                .copied()
                .unwrap_or(self.default_settings)
                .visible_to_students;
            if for_students && !visible {
                continue;
            }
            summaries.push(QuizSummary {
                id: quiz.id,
                name: quiz.name,
                question_count: quiz.questions.len(),
                visible,
            });
        }
        Ok(summaries)
    }
}

/// Reject ids that would escape the quiz directory.
pub(crate) fn checked_id(quiz_id: &str) -> Result<&str> {
    let bad = quiz_id.trim().is_empty()
        || quiz_id.contains(['/', '\\'])
        || quiz_id.starts_with('.');
    if bad {
        anyhow::bail!("invalid quiz id: {quiz_id:?}");
    }
    Ok(quiz_id)
}

/// Write through a sibling temp file and rename over the target.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, contents)
        .await
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}
