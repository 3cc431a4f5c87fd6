//! Markdown renderings of attempts and result overviews.

use std::collections::BTreeMap;

use quizmark_core::grade::Grade;
use quizmark_core::model::{AttemptResult, ScoredAnswer};
use quizmark_core::statistics::{QuestionStats, ResultsOverview};

/// Format points without trailing zeros: `2`, `1.5`, `0.33`.
pub fn format_points(points: f64) -> String {
    let s = format!("{points:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Escape a value for a markdown table cell.
fn cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

fn status(answer: &ScoredAnswer) -> &'static str {
    if answer.is_correct {
        "correct"
    } else if answer.is_partial() {
        "partially correct"
    } else {
        "incorrect"
    }
}

/// Review of one finished attempt, question by question.
///
/// Correct answers are only listed when `show_correct_answers` is set.
pub fn attempt_review(result: &AttemptResult, show_correct_answers: bool) -> String {
    let mut md = String::new();

    md.push_str(&format!("## Results: {}\n\n", result.quiz_id));
    md.push_str(&format!(
        "**Student:** {} ({})",
        result.student.name, result.student.email
    ));
    if !result.student.class_name.is_empty() {
        md.push_str(&format!(", class {}", result.student.class_name));
    }
    md.push_str("\n\n");
    md.push_str(&format!(
        "**Score:** {} / {} points ({:.2}%)\n\n",
        format_points(result.score),
        result.max_points,
        result.percentage
    ));
    md.push_str(&format!(
        "**Grade:** {} ({}). {}\n\n",
        result.grade,
        result.grade.label(),
        result.grade.description()
    ));
    md.push_str(&format!(
        "*Attempt {} finished {}*\n\n",
        result.attempt_id,
        result.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    for (i, answer) in result.answers.iter().enumerate() {
        let question = &answer.question;
        md.push_str(&format!("### {}. {}\n\n", i + 1, question.text));
        md.push_str(&format!("- Type: {}\n", question.kind().label()));
        md.push_str(&format!("- Status: {}\n", status(answer)));
        md.push_str(&format!("- Your answer: {}\n", answer.submitted));
        if show_correct_answers {
            md.push_str(&format!(
                "- Correct answer: {}\n",
                question.key.correct_answers().join(", ")
            ));
        }
        if let Some(policy) = question.key.policy() {
            md.push_str(&format!("- Match type: {}\n", policy.label()));
        }
        md.push_str(&format!(
            "- Points: {} / {}\n\n",
            format_points(answer.earned_points),
            answer.max_points
        ));
    }

    md
}

/// Headline numbers and the grade distribution for a set of attempts.
pub fn overview_markdown(
    overview: Option<&ResultsOverview>,
    distribution: &BTreeMap<Grade, usize>,
) -> String {
    let Some(overview) = overview else {
        return "No results recorded yet.\n".to_string();
    };

    let mut md = String::new();
    md.push_str(&format!(
        "**Summary:** {} attempts by {} students, average {:.2}%, best {:.2}%, average grade {:.2}\n\n",
        overview.attempts,
        overview.distinct_students,
        overview.average_percentage,
        overview.best_percentage,
        overview.average_grade
    ));

    md.push_str("| Grade | Label | Attempts |\n");
    md.push_str("|-------|-------|----------|\n");
    for grade in Grade::ALL.iter().rev() {
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            grade,
            grade.label(),
            distribution.get(grade).copied().unwrap_or(0)
        ));
    }
    md.push('\n');
    md
}

/// Per-question table.
pub fn question_stats_markdown(stats: &[QuestionStats]) -> String {
    let mut md = String::new();
    md.push_str("| Question | Answered | Correct | Partial | Avg points |\n");
    md.push_str("|----------|----------|---------|---------|------------|\n");
    for s in stats {
        md.push_str(&format!(
            "| {} | {} | {} ({:.1}%) | {} | {} / {} |\n",
            cell(&s.text),
            s.answered,
            s.correct,
            s.correct_rate(),
            s.partial,
            format_points(s.average_points),
            s.max_points
        ));
    }
    md.push('\n');
    md
}
