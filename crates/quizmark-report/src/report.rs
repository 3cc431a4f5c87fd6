//! A results report for one quiz with JSON persistence.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quizmark_core::grade::Grade;
use quizmark_core::model::AttemptResult;
use quizmark_core::statistics::{
    grade_distribution, question_stats, QuestionStats, ResultFilter, ResultsOverview,
};

use crate::markdown::{overview_markdown, question_stats_markdown};

/// Filtered results of a quiz together with their statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsReport {
    pub quiz_id: String,
    pub generated_at: DateTime<Utc>,
    pub filter: ResultFilter,
    /// `None` when no result matched.
    pub overview: Option<ResultsOverview>,
    pub grade_distribution: BTreeMap<Grade, usize>,
    pub questions: Vec<QuestionStats>,
    pub results: Vec<AttemptResult>,
}

impl ResultsReport {
    /// Apply `filter` to `results` and compute the statistics.
    pub fn build(quiz_id: &str, results: &[AttemptResult], filter: ResultFilter) -> Self {
        let selected: Vec<AttemptResult> = filter.apply(results).into_iter().cloned().collect();
        Self {
            quiz_id: quiz_id.to_string(),
            generated_at: Utc::now(),
            overview: ResultsOverview::compute(&selected),
            grade_distribution: grade_distribution(&selected),
            questions: question_stats(&selected),
            filter,
            results: selected,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = format!("# Results: {}\n\n", self.quiz_id);
        md.push_str(&overview_markdown(
            self.overview.as_ref(),
            &self.grade_distribution,
        ));
        if self.results.is_empty() {
            return md;
        }

        md.push_str("## Attempts\n\n");
        md.push_str("| Student | Email | Class | Score | Percentage | Grade | Finished |\n");
        md.push_str("|---------|-------|-------|-------|------------|-------|----------|\n");
        for r in &self.results {
            md.push_str(&format!(
                "| {} | {} | {} | {} / {} | {:.2}% | {} | {} |\n",
                r.student.name.replace('|', "\\|"),
                r.student.email,
                r.student.class_name.replace('|', "\\|"),
                crate::markdown::format_points(r.score),
                r.max_points,
                r.percentage,
                r.grade,
                r.timestamp.format("%Y-%m-%d %H:%M")
            ));
        }
        md.push('\n');

        md.push_str("## Questions\n\n");
        md.push_str(&question_stats_markdown(&self.questions));
        md
    }
}
