use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn templates() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../templates")
}

fn repokit(root: &Path) -> Command {
    repokit_with(root, &templates())
}

fn repokit_with(root: &Path, templates: &Path) -> Command {
    let mut cmd = Command::cargo_bin("repokit").unwrap();
    cmd.env_remove("REPOKIT_TEMPLATES")
        .env_remove("REPOKIT_LOG")
        .arg("--root")
        .arg(root)
        .arg("--templates")
        .arg(templates);
    cmd
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
}

fn json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.arg("--json").output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn detect_reports_go_and_js() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("go.mod"), "module example.com/app\n").unwrap();
    fs::write(project.path().join("package.json"), "{}\n").unwrap();

    let value = json(repokit(project.path()).arg("detect"));
    assert_eq!(value["detected"], serde_json::json!(["go", "js"]));
}

#[test]
fn detect_empty_project() {
    let project = TempDir::new().unwrap();
    repokit(project.path())
        .arg("detect")
        .assert()
        .success()
        .stdout(predicate::str::contains("only common applies"));
}

#[test]
fn set_invalid_profile_keeps_state() {
    let project = TempDir::new().unwrap();
    repokit(project.path()).args(["set", "go"]).assert().success();
    let state = project.path().join(".repokit-profile");
    let before = fs::read_to_string(&state).unwrap();

    repokit(project.path())
        .args(["set", "bogus"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid profile 'bogus'"))
        .stderr(predicate::str::contains(
            "bash, common, go, js, pulumi, python, terraform",
        ));

    assert_eq!(fs::read_to_string(&state).unwrap(), before);
}

#[test]
fn set_then_show() {
    let project = TempDir::new().unwrap();
    repokit(project.path()).args(["set", "python"]).assert().success();

    let value = json(repokit(project.path()).arg("show"));
    assert_eq!(value["initialized"], true);
    assert_eq!(value["state"]["active_profile"], "python");
    assert_eq!(value["active"], serde_json::json!(["common", "python"]));
}

#[test]
fn show_uninitialized_defaults_to_common() {
    let project = TempDir::new().unwrap();
    let value = json(repokit(project.path()).arg("show"));
    assert_eq!(value["initialized"], false);
    assert_eq!(value["state"]["active_profile"], "common");
}

#[test]
fn install_writes_merged_config_and_files() {
    let project = TempDir::new().unwrap();
    repokit(project.path()).args(["set", "python"]).assert().success();

    let value = json(repokit(project.path()).arg("install"));
    assert_eq!(value["profiles"], serde_json::json!(["common", "python"]));
    assert_eq!(value["skipped"][0]["key"]["tool"], "yamllint");

    let output = fs::read_to_string(project.path().join(".pre-commit-config.yaml")).unwrap();
    assert!(output.starts_with("# Generated by repokit from profiles: common, python"));
    assert!(output.contains("id: black"));
    assert!(output.contains(".yamllint.yml"));
    assert!(!output.contains("relaxed"));

    for file in [".editorconfig", ".yamllint.yml", ".bandit.yml", ".flake8"] {
        assert!(project.path().join(file).exists(), "{file} should be copied");
    }
}

#[test]
fn update_is_stable() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("main.tf"), "terraform {}\n").unwrap();
    repokit(project.path()).args(["init"]).assert().success();

    let path = project.path().join(".pre-commit-config.yaml");
    let first = fs::read(&path).unwrap();
    repokit(project.path()).arg("update").assert().success();
    assert_eq!(fs::read(&path).unwrap(), first);

    let value = json(repokit(project.path()).arg("show"));
    assert_eq!(value["state"]["active_profile"], "terraform");
}

#[test]
fn disable_check_removes_hook() {
    let project = TempDir::new().unwrap();
    repokit(project.path()).args(["set", "python"]).assert().success();
    repokit(project.path()).args(["disable", "bandit"]).assert().success();
    repokit(project.path()).arg("update").assert().success();

    let output = fs::read_to_string(project.path().join(".pre-commit-config.yaml")).unwrap();
    assert!(!output.contains("id: bandit"));
    assert!(output.contains("id: black"));
}

#[test]
fn overrides_require_init() {
    let project = TempDir::new().unwrap();
    repokit(project.path())
        .args(["enable", "bandit"])
        .assert()
        .failure()
        .stderr(predicate::function(|err: &str| err.matches("repokit init").count() == 1));
}

#[test]
fn install_requires_init() {
    let project = TempDir::new().unwrap();
    repokit(project.path())
        .arg("install")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not initialized"));
    assert!(!project.path().join(".pre-commit-config.yaml").exists());
}

#[test]
fn cleanup_removes_generated_files() {
    let project = TempDir::new().unwrap();
    repokit(project.path()).args(["set", "go"]).assert().success();
    assert!(project.path().join(".golangci.yml").exists());

    repokit(project.path())
        .arg("cleanup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));

    for file in [".repokit-profile", ".pre-commit-config.yaml", ".golangci.yml", ".editorconfig"] {
        assert!(!project.path().join(file).exists(), "{file} should be removed");
    }
}

#[test]
fn cleanup_and_set_keep_user_files() {
    let project = TempDir::new().unwrap();
    let config = project.path().join(".pre-commit-config.yaml");
    let editorconfig = project.path().join(".editorconfig");
    fs::write(&config, "repos: []\n").unwrap();
    fs::write(&editorconfig, "root = true\n").unwrap();

    repokit(project.path())
        .arg("cleanup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to clean up"));
    assert_eq!(fs::read_to_string(&config).unwrap(), "repos: []\n");
    assert_eq!(fs::read_to_string(&editorconfig).unwrap(), "root = true\n");

    repokit(project.path())
        .args(["set", "python"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Refusing to overwrite"));
    assert_eq!(fs::read_to_string(&config).unwrap(), "repos: []\n");
    assert_eq!(fs::read_to_string(&editorconfig).unwrap(), "root = true\n");

    fs::rename(&config, project.path().join("old-pre-commit.yaml")).unwrap();
    repokit(project.path())
        .arg("update")
        .assert()
        .success()
        .stderr(predicate::str::contains("Kept existing 1 file: .editorconfig"));
    assert_eq!(fs::read_to_string(&editorconfig).unwrap(), "root = true\n");

    repokit(project.path()).arg("cleanup").assert().success();
    assert_eq!(fs::read_to_string(&editorconfig).unwrap(), "root = true\n");
    assert!(!config.exists());
    assert!(!project.path().join(".bandit.yml").exists());
}

#[test]
fn set_after_detection_change_removes_stale_files() {
    let project = TempDir::new().unwrap();
    let go_mod = project.path().join("go.mod");
    fs::write(&go_mod, "module example.com/app\n").unwrap();
    repokit(project.path()).args(["set", "python"]).assert().success();
    assert!(project.path().join(".golangci.yml").exists());

    fs::remove_file(&go_mod).unwrap();
    repokit(project.path()).args(["set", "python"]).assert().success();

    assert!(!project.path().join(".golangci.yml").exists());
    let output = fs::read_to_string(project.path().join(".pre-commit-config.yaml")).unwrap();
    assert!(!output.contains("golangci-lint"));
    assert!(output.contains("id: bandit"));
}

#[test]
fn update_drops_files_no_longer_produced() {
    let project = TempDir::new().unwrap();
    let go_mod = project.path().join("go.mod");
    fs::write(&go_mod, "module example.com/app\n").unwrap();
    repokit(project.path()).args(["set", "python"]).assert().success();

    fs::remove_file(&go_mod).unwrap();
    let value = json(repokit(project.path()).arg("update"));
    let removed = value["removed"].as_array().unwrap();
    assert_eq!(removed.len(), 1);
    assert!(removed[0].as_str().unwrap().ends_with(".golangci.yml"));
    assert!(!project.path().join(".golangci.yml").exists());
}

#[test]
fn update_picks_up_template_changes() {
    let templates_copy = TempDir::new().unwrap();
    copy_dir(&templates(), templates_copy.path());
    let project = TempDir::new().unwrap();
    let run = |args: &[&str]| {
        let mut cmd = repokit_with(project.path(), templates_copy.path());
        cmd.args(args);
        cmd
    };

    run(&["set", "python"]).assert().success();
    let path = project.path().join(".pre-commit-config.yaml");
    assert!(fs::read_to_string(&path).unwrap().contains("id: black"));

    fs::write(
        templates_copy.path().join("python/.pre-commit-config.yaml"),
        "repos:\n  - repo: local\n    hooks:\n      - id: ruff\n        name: ruff\n        entry: ruff check\n        language: system\n        types: [python]\n",
    )
    .unwrap();
    run(&["update"]).assert().success();

    let output = fs::read_to_string(&path).unwrap();
    assert!(output.contains("id: ruff"));
    assert!(!output.contains("id: black"));
    assert!(output.contains("id: gitleaks"));
}

#[test]
fn env_prints_path_exports() {
    let project = TempDir::new().unwrap();
    repokit(project.path()).args(["set", "python"]).assert().success();

    repokit(project.path())
        .arg("env")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("export PATH=\""))
        .stdout(predicate::str::contains(".venv/bin"));
}

#[test]
fn list_covers_every_profile() {
    let project = TempDir::new().unwrap();
    let value = json(repokit(project.path()).arg("list"));
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 7);

    let pulumi = rows.iter().find(|r| r["id"] == "pulumi").unwrap();
    assert_eq!(pulumi["has_fragment"], false);
    let python = rows.iter().find(|r| r["id"] == "python").unwrap();
    assert_eq!(python["has_fragment"], true);
}

#[test]
fn malformed_config_is_a_config_error() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join(".repokit.toml"), "[general\n").unwrap();

    repokit(project.path()).arg("show").assert().code(3);
}
