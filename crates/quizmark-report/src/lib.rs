//! Result reports for quizmark.
//!
//! CSV export for spreadsheets, per-attempt markdown reviews, and a JSON or
//! markdown results report with statistics.

pub mod csv;
pub mod markdown;
pub mod report;

pub use csv::{results_to_csv, write_csv_report};
pub use markdown::{attempt_review, overview_markdown};
pub use report::ResultsReport;
