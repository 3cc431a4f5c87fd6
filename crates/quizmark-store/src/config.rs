//! Store configuration and factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizmark_core::model::QuizSettings;

use crate::quizzes::FsQuizRepository;
use crate::results::FsResultStore;

/// Environment variable that overrides `data_dir`.
pub const DATA_DIR_ENV: &str = "QUIZMARK_DATA_DIR";

/// Top-level quizmark configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizmarkConfig {
    /// Root directory for quizzes, settings, and results.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Quiz files; defaults to `<data_dir>/quizzes`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quizzes_dir: Option<PathBuf>,
    /// Result logs; defaults to `<data_dir>/results`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_dir: Option<PathBuf>,
    /// Per-quiz settings file; defaults to `<data_dir>/quiz_config.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_file: Option<PathBuf>,
    /// Quiz offered when none is named.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_quiz: Option<String>,
    /// Settings for quizzes that have none stored.
    #[serde(default)]
    pub default_settings: QuizSettings,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./quizmark-data")
}

impl Default for QuizmarkConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            quizzes_dir: None,
            results_dir: None,
            settings_file: None,
            active_quiz: None,
            default_settings: QuizSettings::default(),
        }
    }
}

impl QuizmarkConfig {
    pub fn quizzes_path(&self) -> PathBuf {
        self.quizzes_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("quizzes"))
    }

    pub fn results_path(&self) -> PathBuf {
        self.results_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("results"))
    }

    pub fn settings_path(&self) -> PathBuf {
        self.settings_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("quiz_config.json"))
    }

    /// Render as TOML, for `quizmark init`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config")
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied verbatim and never rescanned.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let name = &rest[start + 2..start + len];
        result.push_str(&std::env::var(name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. the explicit path, which must exist
/// 2. `quizmark.toml` in the current directory
/// 3. `~/.config/quizmark/config.toml`
///
/// `QUIZMARK_DATA_DIR` overrides the data directory.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizmarkConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("quizmark.toml");
            if local.exists() {
                Some(local)
            } else {
                config_home()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizmarkConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizmarkConfig::default(),
    };

    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            config.data_dir = PathBuf::from(dir);
        }
    }

    config.data_dir = resolve_path(&config.data_dir);
    config.quizzes_dir = config.quizzes_dir.as_deref().map(resolve_path);
    config.results_dir = config.results_dir.as_deref().map(resolve_path);
    config.settings_file = config.settings_file.as_deref().map(resolve_path);

    tracing::debug!(
        source = ?config_path,
        data_dir = %config.data_dir.display(),
        "configuration loaded"
    );
    Ok(config)
}

fn config_home() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizmark"))
}

/// The file-backed collaborators built from one configuration.
#[derive(Clone)]
pub struct Store {
    pub quizzes: Arc<FsQuizRepository>,
    pub results: Arc<FsResultStore>,
}

/// Build the quiz repository and result store for a configuration.
pub fn open_store(config: &QuizmarkConfig) -> Store {
    Store {
        quizzes: Arc::new(FsQuizRepository::new(
            config.quizzes_path(),
            config.settings_path(),
            config.default_settings,
        )),
        results: Arc::new(FsResultStore::new(config.results_path())),
    }
}
