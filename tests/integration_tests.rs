use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn testability() -> Command {
    Command::cargo_bin("testability").expect("binary exists")
}

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().expect("command runs");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

// ---------------------------------------------------------------------------
// CLI smoke tests
// ---------------------------------------------------------------------------

#[test]
fn test_help_output() {
    testability()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("testability scoring"));
}

#[test]
fn test_init_prints_default_config() {
    testability()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("[thresholds]"))
        .stdout(predicate::str::contains("acceptable = 70"));
}

#[test]
fn test_rules_toml_output() {
    testability()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("[[principles]]"))
        .stdout(predicate::str::contains("dataTestAttributeCount"));
}

#[test]
fn test_rules_json_output() {
    let value = json_stdout(testability().args(["-f", "json", "rules"]));
    assert_eq!(value["principles"].as_array().unwrap().len(), 10);
    assert_eq!(value["principles"][0]["principle"], "observability");
    assert_eq!(value["principles"][0]["rules"][0]["kind"], "linear_count");
}

// ---------------------------------------------------------------------------
// assess
// ---------------------------------------------------------------------------

#[test]
fn test_assess_json_output() {
    let value = json_stdout(testability().args([
        "-f",
        "json",
        "assess",
        &fixture("standard_user.json"),
        "--subject",
        "standard_user",
    ]));
    assert_eq!(value["subject"], "standard_user");
    assert_eq!(value["overallScore"], 62);
    assert_eq!(value["grade"], "D");
    assert_eq!(value["principleScores"]["observability"], 82);
    assert_eq!(value["principleScores"]["explainability"], 16);

    let recs = value["recommendations"].as_array().unwrap();
    let order: Vec<_> = recs
        .iter()
        .map(|r| (r["principle"].as_str().unwrap(), r["priority"].as_str().unwrap()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("explainability", "Critical"),
            ("algorithmic_simplicity", "High"),
            ("smallness", "High"),
            ("controllability", "Medium"),
            ("algorithmic_transparency", "Medium"),
            ("decomposability", "Medium"),
        ]
    );
    assert!(value.get("breakdown").is_none());
}

#[test]
fn test_assess_text_output() {
    testability()
        .args(["-f", "text", "assess", &fixture("standard_user.json")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall score: 62/100 (grade D)"))
        .stdout(predicate::str::contains("1. [Critical] Explainability:"));
}

#[test]
fn test_assess_markdown_output() {
    testability()
        .args(["-f", "markdown", "assess", &fixture("standard_user.json")])
        .assert()
        .success()
        .stdout(predicate::str::contains("| Smallness | 48 | High |"));
}

#[test]
fn test_assess_core_profile() {
    let value = json_stdout(testability().args([
        "-f",
        "json",
        "assess",
        &fixture("standard_user.json"),
        "--profile",
        "core",
    ]));
    assert_eq!(value["principleScores"].as_object().unwrap().len(), 5);
    assert_eq!(value["overallScore"], 74);
    assert_eq!(value["grade"], "C");
}

#[test]
fn test_assess_breakdown() {
    let value = json_stdout(testability().args([
        "-f",
        "json",
        "assess",
        &fixture("standard_user.json"),
        "--principles",
        "algorithmic_stability",
        "--breakdown",
    ]));
    let breakdown = value["breakdown"].as_array().unwrap();
    assert_eq!(breakdown.len(), 1);
    let load_time = &breakdown[0]["subMetrics"][1];
    assert_eq!(load_time["name"], "load_time");
    assert_eq!(load_time["points"], 22);
    assert_eq!(load_time["defaulted"], false);
}

#[test]
fn test_assess_empty_observations_all_recommended() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.json");
    std::fs::write(&path, "{}").unwrap();

    let value = json_stdout(testability().args(["-f", "json", "assess", path.to_str().unwrap()]));
    assert_eq!(value["overallScore"], 7);
    assert_eq!(value["grade"], "F");
    assert_eq!(value["recommendations"].as_array().unwrap().len(), 10);
}

#[test]
fn test_assess_from_stdin() {
    testability()
        .args(["-f", "json", "assess", "-"])
        .write_stdin(r#"{"dataTestAttributeCount": 50}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"overallScore\": 10"));
}

#[test]
fn test_assess_missing_file() {
    testability()
        .args(["assess", "/nonexistent/observations.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_assess_rejects_non_object_input() {
    testability()
        .args(["assess", "-"])
        .write_stdin("[1, 2, 3]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON object"));
}

#[test]
fn test_fail_under_violation() {
    testability()
        .args([
            "-f",
            "json",
            "assess",
            &fixture("standard_user.json"),
            "--fail-under",
            "70",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("overallScore"))
        .stderr(predicate::str::contains("Threshold violation"));
}

#[test]
fn test_fail_under_passes() {
    testability()
        .args(["assess", &fixture("standard_user.json"), "--fail-under", "60"])
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn test_custom_rules_file() {
    let value = json_stdout(testability().args([
        "-f",
        "json",
        "assess",
        &fixture("standard_user.json"),
        "--rules",
        &fixture("unbugginess_rules.toml"),
        "--principles",
        "unbugginess",
    ]));
    assert_eq!(value["principleScores"]["unbugginess"], 70);
    assert_eq!(value["grade"], "C");
    assert!(value["recommendations"].as_array().unwrap().is_empty());
}

#[test]
fn test_custom_rules_missing_principle_is_configuration_error() {
    testability()
        .args([
            "assess",
            &fixture("standard_user.json"),
            "--rules",
            &fixture("unbugginess_rules.toml"),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_config_file_thresholds_and_advice() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("testability.toml");
    std::fs::write(
        &config,
        "principles = [\"smallness\", \"similarity\"]\n\n[thresholds]\nacceptable = 80\n\n[advice]\nsimilarity = \"Reuse the product card component\"\n",
    )
    .unwrap();

    let value = json_stdout(testability().args([
        "-c",
        config.to_str().unwrap(),
        "-f",
        "json",
        "assess",
        &fixture("standard_user.json"),
    ]));
    // smallness 48, similarity 77 -> 62.5 -> 63
    assert_eq!(value["overallScore"], 63);
    let recs = value["recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0]["principle"], "smallness");
    assert_eq!(recs[1]["advice"], "Reuse the product card component");
}

#[test]
fn test_rules_file_resolved_next_to_config() {
    let config_dir = TempDir::new().unwrap();
    std::fs::copy(
        fixture("unbugginess_rules.toml"),
        config_dir.path().join("rules.toml"),
    )
    .unwrap();
    let config = config_dir.path().join("testability.toml");
    std::fs::write(
        &config,
        "principles = [\"unbugginess\"]\nrules_file = \"rules.toml\"\n",
    )
    .unwrap();

    let elsewhere = TempDir::new().unwrap();
    let value = json_stdout(
        testability()
            .current_dir(elsewhere.path())
            .args([
                "-c",
                config.to_str().unwrap(),
                "-f",
                "json",
                "assess",
                &fixture("standard_user.json"),
            ]),
    );
    assert_eq!(value["principleScores"]["unbugginess"], 70);
}

#[test]
fn test_invalid_thresholds_rejected() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("testability.toml");
    std::fs::write(&config, "[thresholds]\ncritical = 60\nhigh = 50\n").unwrap();

    testability()
        .args(["-c", config.to_str().unwrap(), "assess", &fixture("standard_user.json")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("thresholds"));
}

#[test]
fn test_missing_config_file() {
    testability()
        .args(["-c", "/nonexistent/testability.toml", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// ---------------------------------------------------------------------------
// batch
// ---------------------------------------------------------------------------

#[test]
fn test_batch_json_output() {
    let value = json_stdout(testability().args(["-f", "json", "batch", &fixture("subjects.json")]));
    let subjects: Vec<_> = value["assessments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["subject"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(subjects, vec!["guest", "problem_user", "standard_user"]);
    assert_eq!(value["assessments"][1]["overallScore"], 13);
    assert_eq!(value["assessments"][2]["overallScore"], 35);
    assert_eq!(value["summary"]["subjects"], 3);
    assert_eq!(value["summary"]["lowest"]["subject"], "guest");
    assert_eq!(value["summary"]["lowest"]["overallScore"], 7);
}

#[test]
fn test_batch_text_output() {
    testability()
        .args(["-f", "text", "batch", &fixture("subjects.json")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Batch of 3 subjects"))
        .stdout(predicate::str::contains("Testability assessment: problem_user"));
}

#[test]
fn test_batch_rejects_repeated_subject() {
    testability()
        .args(["batch", "-"])
        .write_stdin(r#"{"guest": {}, "guest": {"dataTestAttributeCount": 5}}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("appears more than once"));
}

#[test]
fn test_batch_fail_under_names_subject() {
    testability()
        .args(["batch", &fixture("subjects.json"), "--fail-under", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("guest"));
}
