//! Exit codes and JSON envelopes of the `methodlens` binary.

mod common;

use common::{TestProject, fixture_path};
use std::process::{Command, Output};

fn run(project: &TestProject, args: &[&str]) -> Output {
    let config = project.add_file(".methodlens/settings.toml", "[fallback]\nenabled = false\n");
    Command::new(env!("CARGO_BIN_EXE_methodlens"))
        .current_dir(project.path())
        .arg("--config")
        .arg(config)
        .args(args)
        .env("NO_COLOR", "1")
        .env("METHODLENS_LOG", "off")
        .output()
        .expect("Failed to run methodlens")
}

fn image_arg() -> String {
    fixture_path("image.json").display().to_string()
}

#[test]
fn test_resolve_json_envelope() {
    let project = TestProject::new();
    let output = run(&project, &["resolve", &image_arg(), "Foo#map", "--json"]);

    assert_eq!(output.status.code(), Some(0));
    let response: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(response["status"], "success");
    assert_eq!(response["data"]["method"], "Foo#map");
    assert_eq!(response["data"]["aliases"], serde_json::json!(["collect"]));
    assert_eq!(response["data"]["visibility"], "public");
}

#[test]
fn test_resolve_text_output() {
    let project = TestProject::new();
    let output = run(&project, &["resolve", &image_arg(), "Foo#quux"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Foo#quux public"));
    assert!(stdout.contains("Some words."));
    assert!(stdout.contains("def quux(a, *b, &c); end"));
}

#[test]
fn test_exit_codes() {
    let project = TestProject::new();
    let code = |target: &str| {
        run(&project, &["resolve", &image_arg(), target])
            .status
            .code()
    };

    assert_eq!(code("Foo#missing"), Some(3));
    assert_eq!(code("Half#broken"), Some(4));
    assert_eq!(code("Foo#stale"), Some(7));
    assert_eq!(code("Foo#gone"), Some(7));

    let missing_image = run(&project, &["resolve", "nowhere.json", "Foo#map"]);
    assert_eq!(missing_image.status.code(), Some(5));
}

#[test]
fn test_stale_error_json_on_stderr() {
    let project = TestProject::new();
    let output = run(&project, &["resolve", &image_arg(), "Foo#stale", "--json"]);

    let response: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(response["code"], "STALE_LOCATION");
    assert_eq!(response["exit_code"], 7);
}

#[test]
fn test_malformed_doc_store_is_parse_error() {
    let project = TestProject::new();
    let store = project.add_file("docs.json", "{ \"String#gsub\": ");
    let config = project.add_file(
        "custom.toml",
        &format!("[fallback]\nenabled = true\nstore_path = '{}'\n", store.display()),
    );

    let output = Command::new(env!("CARGO_BIN_EXE_methodlens"))
        .current_dir(project.path())
        .arg("--config")
        .arg(config)
        .args(["resolve", &image_arg(), "String#gsub", "--json"])
        .env("NO_COLOR", "1")
        .env("METHODLENS_LOG", "off")
        .output()
        .expect("Failed to run methodlens");

    assert_eq!(output.status.code(), Some(4));
    let response: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(response["code"], "PARSE_ERROR");
    assert!(response["message"].as_str().unwrap().contains("docs.json"));
}

#[test]
fn test_list_single_owner() {
    let project = TestProject::new();
    let output = run(&project, &["list", &image_arg(), "--owner", "String", "--json"]);

    assert_eq!(output.status.code(), Some(0));
    let response: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let owners = response["data"].as_array().unwrap();
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[0]["kind"], "class");
    assert_eq!(owners[0]["methods"], serde_json::json!(["gsub", "compare"]));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let project = TestProject::new();
    let binary = env!("CARGO_BIN_EXE_methodlens");

    let first = Command::new(binary)
        .current_dir(project.path())
        .arg("init")
        .output()
        .unwrap();
    assert_eq!(first.status.code(), Some(0));
    assert!(project.path().join(".methodlens/settings.toml").exists());

    let second = Command::new(binary)
        .current_dir(project.path())
        .arg("init")
        .output()
        .unwrap();
    assert_eq!(second.status.code(), Some(6));

    let forced = Command::new(binary)
        .current_dir(project.path())
        .args(["init", "--force"])
        .output()
        .unwrap();
    assert_eq!(forced.status.code(), Some(0));
}
