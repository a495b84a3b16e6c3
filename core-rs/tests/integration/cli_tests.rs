//! Integration tests for the canon binary
//!
//! Runs the built binary against the fixture vocabulary and checks exit
//! codes and the parts of stdout that scripts rely on.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("core-rs/tests/fixtures")
}

/// Command rooted in an empty project directory, so no canon.yaml is picked up
fn canon(project: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_canon"));
    command.current_dir(project.path()).env("NO_COLOR", "1");
    command
}

fn run_with_stdin(mut command: Command, input: &str) -> Output {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn canon");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write session input");

    child.wait_with_output().expect("Failed to wait for canon")
}

fn vocabulary_args(command: &mut Command) -> &mut Command {
    command.arg("-o").arg(fixtures().join("vocabulary.ttl")).arg("--no-cache")
}

#[test]
fn test_missing_ontology_exits_with_failure() {
    let project = TempDir::new().unwrap();
    let output = canon(&project)
        .args(["query", "-q", "ASK { ?s ?p ?o }", "-o"])
        .arg(project.path().join("absent.ttl"))
        .output()
        .expect("Failed to run canon query");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "stderr was: {}", stderr);
    assert!(output.stdout.is_empty());
}

#[test]
fn test_malformed_inline_query_exits_with_failure() {
    let project = TempDir::new().unwrap();
    let mut command = canon(&project);
    command.args(["query", "-q", "SELECT ?x WHERE { ?x"]);
    let output = vocabulary_args(&mut command).output().expect("Failed to run canon query");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("results)"), "no partial output on failure: {}", stdout);
}

#[test]
fn test_inline_query_prints_rows_and_count() {
    let project = TempDir::new().unwrap();
    let mut command = canon(&project);
    command.args(["query", "-q", "SELECT ?c WHERE { ?c a <http://www.w3.org/2002/07/owl#Class> }"]);
    let output = vocabulary_args(&mut command).output().expect("Failed to run canon query");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("(13 results)"), "stdout was: {}", stdout);
}

#[test]
fn test_unknown_catalog_query_exits_with_failure() {
    let project = TempDir::new().unwrap();
    let mut command = canon(&project);
    command.args(["query", "99", "--queries"]).arg(fixtures().join("queries"));
    let output = vocabulary_args(&mut command).output().expect("Failed to run canon query");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--list"));
}

#[test]
fn test_interactive_session_survives_bad_selections() {
    let project = TempDir::new().unwrap();
    let mut command = canon(&project);
    command.arg("query").arg("--queries").arg(fixtures().join("queries"));
    vocabulary_args(&mut command);

    let output = run_with_stdin(command, "99\nc\nSELEC\n\n1\nq\n");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(stderr.contains("Invalid selection."), "stderr was: {}", stderr);
    assert!(stderr.contains("custom query"), "stderr was: {}", stderr);
    assert!(stdout.contains("=== Running: 01-list-classes.rq ==="), "stdout was: {}", stdout);
    assert!(stdout.contains("(13 results)"));
    assert!(stdout.contains("Goodbye!"));
}

#[test]
fn test_interactive_session_refuses_switch_with_directory_override() {
    let project = TempDir::new().unwrap();
    let mut command = canon(&project);
    command.arg("query").arg("--queries").arg(fixtures().join("queries"));
    vocabulary_args(&mut command);

    let output = run_with_stdin(command, "s\n2\nq\n");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(stderr.contains("Cannot switch dialects"), "stderr was: {}", stderr);
    assert!(!stdout.contains("Switched to"));
    assert!(!stdout.contains("Switch to bounded"));
    // still the recursive engine, so the subClassOf+ query runs
    assert!(stdout.contains("=== Running: 02-sacrament-hierarchy.rq ==="), "stdout was: {}", stdout);
}

#[test]
fn test_patterns_writes_class_report_separately() {
    let project = TempDir::new().unwrap();
    fs::write(
        project.path().join("canon.yaml"),
        format!(
            "ontology: {}\n\
             namespace: https://ontology.example.org/\n\
             patterns:\n  \
               output: generated/patterns.json\n  \
               categoryPredicate: https://ontology.example.org/patternCategory\n  \
               cache: false\n\
             categories:\n  \
               sacraments:\n    \
                 label: Sacraments\n    \
                 rootClasses:\n      \
                   - id: Sacrament\n",
            fixtures().join("vocabulary.ttl").display()
        ),
    )
    .unwrap();

    let output = canon(&project)
        .args(["patterns", "-b", "--classes-output", "generated/classes.yaml"])
        .output()
        .expect("Failed to run canon patterns");

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let patterns: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(project.path().join("generated/patterns.json")).unwrap())
            .unwrap();
    assert!(patterns.as_object().unwrap().values().all(|v| v.is_string()));

    let classes: serde_yaml::Value =
        serde_yaml::from_str(&fs::read_to_string(project.path().join("generated/classes.yaml")).unwrap())
            .unwrap();
    assert_eq!(classes["sacraments"]["label"].as_str(), Some("Sacraments"));
    assert_eq!(classes["sacraments"]["class_count"].as_u64(), Some(4));
}
