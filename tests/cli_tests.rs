use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn shelf_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("shelf"))
}

const SMALL_DATASET: &str = r#"{
  "authors": [{ "id": 10, "name": "A1" }],
  "books": [{ "id": 1, "title": "T1", "authorId": 10 }]
}"#;

// =============================================================================
// Basic CLI
// =============================================================================

#[test]
fn test_help() {
    shelf_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("GraphQL"));
}

#[test]
fn test_version() {
    shelf_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("shelf"));
}

#[test]
fn test_schema_prints_sdl() {
    shelf_cmd()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("type Book"))
        .stdout(predicate::str::contains("type Author"))
        .stdout(predicate::str::contains("author: Author!"));
}

// =============================================================================
// Running operations
// =============================================================================

#[test]
fn test_run_against_builtin_catalogue() {
    shelf_cmd()
        .args(["run", "{ books { title author { name } } }"])
        .assert()
        .success()
        .stdout(predicate::str::contains("A Wizard of Earthsea"))
        .stdout(predicate::str::contains("Ursula K. Le Guin"));
}

#[test]
fn test_run_against_custom_dataset() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().join("library.json");
    fs::write(&data_path, SMALL_DATASET).unwrap();

    shelf_cmd()
        .arg("--data")
        .arg(&data_path)
        .args(["run", "{ books { title author { name } } }"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"T1\""))
        .stdout(predicate::str::contains("\"A1\""))
        .stdout(predicate::str::contains("Earthsea").not());
}

#[test]
fn test_run_with_variables_and_operation_name() {
    shelf_cmd()
        .args([
            "run",
            "query A { books { title } } query B($all: Boolean!) { authors { name books @include(if: $all) { title } } }",
            "--operation-name",
            "B",
            "--variables",
            r#"{"all": false}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Octavia E. Butler"))
        .stdout(predicate::str::contains("title").not());
}

#[test]
fn test_run_syntax_error_fails() {
    shelf_cmd()
        .args(["run", "{ books { title "])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Syntax Error"))
        .stderr(predicate::str::contains("parse failure"));
}

#[test]
fn test_run_undeclared_field_fails() {
    shelf_cmd()
        .args(["run", "{ books { isbn } }"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("errors"))
        .stderr(predicate::str::contains("validation failure"));
}

#[test]
fn test_run_rejects_non_object_variables() {
    shelf_cmd()
        .args(["run", "{ books { title } }", "--variables", "[1, 2]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--variables must be a JSON object"));
}

#[test]
fn test_run_dangling_author_warns() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().join("library.json");
    fs::write(
        &data_path,
        r#"{ "authors": [], "books": [{ "id": 3, "title": "Lost", "authorId": 42 }] }"#,
    )
    .unwrap();

    shelf_cmd()
        .arg("--data")
        .arg(&data_path)
        .args(["run", "{ books { author { name } } }"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Author 42 of book 3 does not exist"))
        .stderr(predicate::str::contains("execution error"));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_dataset_path_is_relative_to_config() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("small.json"), SMALL_DATASET).unwrap();
    let config_path = temp_dir.path().join("shelf.toml");
    fs::write(&config_path, "[data]\npath = \"small.json\"\n").unwrap();

    shelf_cmd()
        .arg("--config")
        .arg(&config_path)
        .args(["run", "{ authors { name } }"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"A1\""));
}

#[test]
fn test_invalid_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("shelf.toml");
    fs::write(&config_path, "[server\nport = 1").unwrap();

    shelf_cmd()
        .arg("--config")
        .arg(&config_path)
        .arg("schema")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TOML error"));
}

#[test]
fn test_zero_body_limit_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("shelf.toml");
    fs::write(&config_path, "[server]\nmax_body_bytes = 0\n").unwrap();

    shelf_cmd()
        .arg("--config")
        .arg(&config_path)
        .arg("schema")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_missing_dataset_fails() {
    let temp_dir = TempDir::new().unwrap();

    shelf_cmd()
        .arg("--data")
        .arg(temp_dir.path().join("nope.json"))
        .arg("schema")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Dataset error"));
}

#[test]
fn test_malformed_dataset_fails() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().join("library.json");
    fs::write(&data_path, "{ \"authors\": [").unwrap();

    shelf_cmd()
        .arg("--data")
        .arg(&data_path)
        .arg("schema")
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON error"));
}
