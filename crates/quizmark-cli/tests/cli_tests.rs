//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SCENARIO_INPUT: &str = "2\n\n1\n5,8\nit is Balaton\n";

fn quizmark() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("quizmark").unwrap()
}

/// A command running inside `dir` with no user config in reach.
fn quizmark_in(dir: &Path) -> Command {
    let mut cmd = quizmark();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("QUIZMARK_DATA_DIR")
        .env_remove("RUST_LOG");
    cmd
}

/// Initialize a workspace with the sample quiz in fixed order.
fn initialized() -> TempDir {
    let dir = TempDir::new().unwrap();
    quizmark_in(dir.path()).arg("init").assert().success();
    quizmark_in(dir.path())
        .args(["settings", "--quiz-id", "sample_quiz", "--shuffle", "false"])
        .assert()
        .success();
    dir
}

fn take_scenario(dir: &Path, email: &str) -> assert_cmd::assert::Assert {
    quizmark_in(dir)
        .args(["take", "--name", "Anna Kovács", "--email", email, "--class", "9.A"])
        .write_stdin(SCENARIO_INPUT)
        .assert()
}

#[test]
fn validate_sample_quiz() {
    quizmark()
        .arg("validate")
        .arg("--quiz")
        .arg("../../sample-quizzes/geography.json")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Quiz: Central European Geography (3 questions, 7 points)",
        ))
        .stdout(predicate::str::contains("All quizzes valid."));
}

#[test]
fn validate_directory() {
    quizmark()
        .arg("validate")
        .arg("--quiz")
        .arg("../../sample-quizzes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Arithmetic (3 questions, 4 points)"))
        .stdout(predicate::str::contains("Central European Geography"));
}

#[test]
fn validate_nonexistent_file() {
    quizmark()
        .arg("validate")
        .arg("--quiz")
        .arg("nonexistent.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn validate_reports_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(
        &path,
        r#"[{"question": "Pick one", "type": "single", "options": ["A", "B"], "answer": "C"}]"#,
    )
    .unwrap();

    quizmark()
        .arg("validate")
        .arg("--quiz")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("ERROR: answer 'C' is not one of the options"))
        .stderr(predicate::str::contains("1 quiz error(s) must be fixed"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();
    quizmark_in(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created quizmark.toml"))
        .stdout(predicate::str::contains("Next steps"));

    assert!(dir.path().join("quizmark.toml").exists());
    assert!(dir
        .path()
        .join("quizmark-data/quizzes/sample_quiz.json")
        .exists());
    assert!(dir.path().join("quizmark-data/quiz_config.json").exists());
}

#[test]
fn init_skips_existing_files() {
    let dir = TempDir::new().unwrap();
    quizmark_in(dir.path()).arg("init").assert().success();
    quizmark_in(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("quizmark.toml already exists, skipping."))
        .stdout(predicate::str::contains("Created").not());
}

#[test]
fn init_sample_quiz_is_valid() {
    let dir = TempDir::new().unwrap();
    quizmark_in(dir.path()).arg("init").assert().success();
    quizmark_in(dir.path())
        .args(["validate", "--quiz", "quizmark-data/quizzes/sample_quiz.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sample Quiz (4 questions, 8 points)"));
}

#[test]
fn list_shows_sample_quiz() {
    let dir = initialized();
    quizmark_in(dir.path())
        .args(["list", "--students"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sample_quiz"))
        .stdout(predicate::str::contains("Sample Quiz"));
}

#[test]
fn list_empty_store() {
    let dir = TempDir::new().unwrap();
    quizmark_in(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No quizzes found"));
}

#[test]
fn settings_unknown_quiz() {
    let dir = TempDir::new().unwrap();
    quizmark_in(dir.path())
        .args(["settings", "--quiz-id", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no such quiz: missing"));
}

#[test]
fn settings_update_is_persisted() {
    let dir = initialized();
    quizmark_in(dir.path())
        .args(["settings", "--quiz-id", "sample_quiz", "--questions-to-show", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated settings for sample_quiz."));

    let raw = std::fs::read_to_string(dir.path().join("quizmark-data/quiz_config.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let settings = &json["quiz_settings"]["sample_quiz"];
    assert_eq!(settings["questions_to_show"], 2);
    assert_eq!(settings["shuffle_questions"], false);
    assert_eq!(settings["visible_to_students"], true);
}

#[test]
fn take_scores_the_attempt() {
    let dir = initialized();
    take_scenario(dir.path(), "anna@example.com")
        .success()
        .stdout(predicate::str::contains("select at least one option"))
        .stdout(predicate::str::contains("Score: 6.5 / 8 (81.25%), grade 4"))
        .stdout(predicate::str::contains("**Grade:** 4 (Good)"))
        .stdout(predicate::str::contains("- Status: partially correct"));

    let log = std::fs::read_to_string(
        dir.path()
            .join("quizmark-data/results/sample_quiz_results.jsonl"),
    )
    .unwrap();
    assert_eq!(log.lines().count(), 1);
    let stored: serde_json::Value = serde_json::from_str(log.trim()).unwrap();
    assert_eq!(stored["score"], 6.5);
    assert_eq!(stored["grade"], 4);
    assert_eq!(stored["student_email"], "anna@example.com");
}

#[test]
fn take_reprompts_unknown_option() {
    let dir = initialized();
    quizmark_in(dir.path())
        .args(["take", "--name", "Bela", "--email", "bela@example.com"])
        .write_stdin("9\nBudapest\nDanube, Tisza\n5.8\nBalaton\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown option: 9"))
        .stdout(predicate::str::contains("Score: 8 / 8 (100.00%), grade 5"));
}

#[test]
fn take_fails_when_input_ends() {
    let dir = initialized();
    quizmark_in(dir.path())
        .args(["take", "--name", "Bela", "--email", "bela@example.com"])
        .write_stdin("2\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("input ended before the quiz was finished"));
}

#[test]
fn take_refuses_retake_when_disabled() {
    let dir = initialized();
    quizmark_in(dir.path())
        .args(["settings", "--quiz-id", "sample_quiz", "--allow-retake", "false"])
        .assert()
        .success();

    take_scenario(dir.path(), "anna@example.com").success();
    take_scenario(dir.path(), "ANNA@example.com")
        .failure()
        .stderr(predicate::str::contains("has already taken quiz 'sample_quiz'"));
}

#[test]
fn hidden_quiz_needs_preview() {
    let dir = TempDir::new().unwrap();
    let quizzes = dir.path().join("quizmark-data/quizzes");
    std::fs::create_dir_all(&quizzes).unwrap();
    std::fs::copy("../../sample-quizzes/geography.json", quizzes.join("geography.json")).unwrap();
    quizmark_in(dir.path())
        .args(["settings", "--quiz-id", "geography", "--shuffle", "false"])
        .assert()
        .success();

    let take = |preview: bool| {
        let mut cmd = quizmark_in(dir.path());
        cmd.args(["take", "--quiz-id", "geography", "--name", "Eva", "--email", "eva@example.com"]);
        if preview {
            cmd.arg("--preview");
        }
        cmd
    };

    take(false)
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not visible to students"));

    take(true)
        .write_stdin("Budapest\nDanube,Tisza\nLake Balaton\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 7 / 7 (100.00%), grade 5"));
}

#[test]
fn results_json_and_show() {
    let dir = initialized();
    take_scenario(dir.path(), "anna@example.com").success();

    let output = quizmark_in(dir.path())
        .args(["results", "--quiz-id", "sample_quiz", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["overview"]["attempts"], 1);
    assert_eq!(report["results"][0]["percentage"], 81.25);
    let attempt = report["results"][0]["attempt_id"].as_str().unwrap().to_string();

    quizmark_in(dir.path())
        .args(["show", "--quiz-id", "sample_quiz", "--attempt", &attempt])
        .assert()
        .success()
        .stdout(predicate::str::contains("**Score:** 6.5 / 8 points (81.25%)"))
        .stdout(predicate::str::contains("- Correct answer: Danube, Tisza"));
}

#[test]
fn results_text_with_filter() {
    let dir = initialized();
    take_scenario(dir.path(), "anna@example.com").success();

    quizmark_in(dir.path())
        .args(["results", "--quiz-id", "sample_quiz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Anna Kovács"))
        .stdout(predicate::str::contains("1 attempt(s) by 1 student(s)"));

    quizmark_in(dir.path())
        .args(["results", "--quiz-id", "sample_quiz", "--class", "9.b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No results recorded yet."));
}

#[test]
fn results_rejects_unknown_format() {
    let dir = initialized();
    quizmark_in(dir.path())
        .args(["results", "--quiz-id", "sample_quiz", "--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format 'xml'"));
}

#[test]
fn show_unknown_attempt() {
    let dir = initialized();
    quizmark_in(dir.path())
        .args([
            "show",
            "--quiz-id",
            "sample_quiz",
            "--attempt",
            "00000000-0000-0000-0000-000000000000",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no attempt"));
}

#[test]
fn export_csv() {
    let dir = initialized();
    take_scenario(dir.path(), "anna@example.com").success();
    take_scenario(dir.path(), "zoltan@example.com").success();

    quizmark_in(dir.path())
        .args(["export", "--quiz-id", "sample_quiz", "--output", "out/results.csv", "--grade", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 result(s)"));

    let csv = std::fs::read_to_string(dir.path().join("out/results.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("name,email,class,score,max_points,percentage,grade,timestamp")
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with("Anna Kovács,anna@example.com,9.A,6.5,8,81.25,4,"));
    assert_eq!(csv.lines().count(), 3);
}

#[test]
fn import_saves_valid_quiz() {
    let dir = TempDir::new().unwrap();
    let file = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../sample-quizzes/geography.json");

    quizmark_in(dir.path())
        .arg("import")
        .arg("--file")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Imported Central European Geography as 'central_european_geography' (3 questions, 7 points).",
        ))
        .stdout(predicate::str::contains("--visible true"));
    assert!(dir
        .path()
        .join("quizmark-data/quizzes/central_european_geography.json")
        .exists());

    quizmark_in(dir.path())
        .arg("import")
        .arg("--file")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists, pass --replace"));

    quizmark_in(dir.path())
        .arg("import")
        .arg("--file")
        .arg(&file)
        .args(["--name", "Geo Basics"])
        .assert()
        .success()
        .stdout(predicate::str::contains("as 'geo_basics'"));

    quizmark_in(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("geo_basics"))
        .stdout(predicate::str::contains("Geo Basics"));
}

#[test]
fn import_refuses_invalid_quiz() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("broken.json");
    std::fs::write(
        &file,
        r#"[{"quiz_name": "Broken Quiz", "question": "Pick one", "type": "single", "options": ["A", "B"], "answer": "C"}]"#,
    )
    .unwrap();

    quizmark_in(dir.path())
        .args(["import", "--file", "broken.json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("answer 'C' is not one of the options"))
        .stderr(predicate::str::contains("quiz 'broken_quiz' was not saved"));

    assert!(!dir
        .path()
        .join("quizmark-data/quizzes/broken_quiz.json")
        .exists());
    quizmark_in(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No quizzes found"));
}

#[test]
fn results_saved_to_file() {
    let dir = initialized();
    take_scenario(dir.path(), "anna@example.com").success();

    quizmark_in(dir.path())
        .args(["results", "--quiz-id", "sample_quiz", "--output", "reports/sample.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved report with 1 result(s)"));

    let raw = std::fs::read_to_string(dir.path().join("reports/sample.json")).unwrap();
    let report: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(report["quiz_id"], "sample_quiz");
    assert_eq!(report["results"][0]["score"], 6.5);
}

#[test]
fn help_output() {
    quizmark()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Classroom quiz scoring engine"));
}

#[test]
fn version_output() {
    quizmark()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("quizmark"));
}
