//! CLI integration tests

use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};

/// Run the built binary with an isolated home directory
fn cpd(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cpd"))
        .args(args)
        .current_dir(home)
        .env("HOME", home)
        .env_remove("CPD_MODEL")
        .env_remove("CPD_API_URL")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let home = tempfile::tempdir().unwrap();
    let output = cpd(home.path(), &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("Problem Difficulty Estimator"),
        "Should show app name"
    );
    for command in ["train", "predict", "inspect", "remote"] {
        assert!(stdout.contains(command), "Should show {} command", command);
    }
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let home = tempfile::tempdir().unwrap();
    let output = cpd(home.path(), &["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("cpd"), "Should show binary name");
}

#[test]
fn test_train_help_lists_sources() {
    let home = tempfile::tempdir().unwrap();
    let output = cpd(home.path(), &["train", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("synthetic"));
    assert!(stdout.contains("archive"));
    assert!(stdout.contains("csv"));
}

#[test]
fn test_inspect_json() {
    let home = tempfile::tempdir().unwrap();
    let output = cpd(
        home.path(),
        &[
            "inspect", "-d", "add two numbers", "-i", "a b", "-o", "sum", "--format", "json",
        ],
    );
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["recipe"], "text-diversity-v1");
    assert_eq!(json["diagnostics"]["textLength"], 23);
    assert_eq!(json["diagnostics"]["detectedTags"], serde_json::json!(["simple"]));
    assert_eq!(json["features"]["simple_flag"], 1.0);
    assert_eq!(json["features"]["hard_flag"], 0.0);
}

#[test]
fn test_train_then_predict() {
    let home = tempfile::tempdir().unwrap();
    let model = home.path().join("models").join("model.json");
    let model_arg = model.to_str().unwrap();

    let output = cpd(
        home.path(),
        &[
            "train", "synthetic", "--samples", "200", "--trees", "15", "--depth", "10",
            "--model", model_arg, "--format", "json",
        ],
    );
    assert!(
        output.status.success(),
        "train failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report = stdout_json(&output);
    assert_eq!(report["recipe"], "text-diversity-v1");
    assert_eq!(report["samples"], 280);
    assert_eq!(report["probes"].as_array().unwrap().len(), 3);
    assert!(model.exists());

    let output = cpd(
        home.path(),
        &[
            "predict", "--model", model_arg, "-d", "add two numbers", "-i", "a b", "-o", "sum",
            "--format", "json",
        ],
    );
    assert!(output.status.success());
    let prediction = stdout_json(&output);
    assert_eq!(prediction["problem_class"], "Easy");
    assert!(prediction["problem_score"].is_i64());
}

#[test]
fn test_model_from_user_config() {
    let home = tempfile::tempdir().unwrap();
    let model = home.path().join("configured.json");
    let config_dir = home.path().join(".config").join("cpd");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.json"),
        serde_json::json!({ "model_path": model }).to_string(),
    )
    .unwrap();

    let output = cpd(
        home.path(),
        &["train", "synthetic", "--samples", "50", "--trees", "5", "--depth", "6", "-f", "json"],
    );
    assert!(output.status.success());
    assert!(model.exists(), "model should land at the configured path");
}

#[test]
fn test_predict_without_model_fails() {
    let home = tempfile::tempdir().unwrap();
    let missing = home.path().join("absent.json");
    let output = cpd(
        home.path(),
        &[
            "predict", "--model", missing.to_str().unwrap(), "-d", "a", "-i", "b", "-o", "c",
        ],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cpd train"), "stderr: {}", stderr);
}

#[test]
fn test_csv_with_unknown_class_fails() {
    let home = tempfile::tempdir().unwrap();
    let csv = home.path().join("problems.csv");
    std::fs::write(
        &csv,
        "title,description,input_description,output_description,problem_class,problem_score\n\
         P,add two numbers,a b,sum,Trivial,800\n",
    )
    .unwrap();

    let output = cpd(home.path(), &["train", "csv", csv.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(!home.path().join("model.json").exists());
}
