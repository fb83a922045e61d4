//! Integration tests for the csimport CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a csimport command isolated from the user's environment
fn csimport(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("csimport").unwrap();
    cmd.current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".xdg"))
        .env_remove("CSIMPORT_OPERATOR")
        .env_remove("CSIMPORT_DB")
        .env_remove("CSIMPORT_LOG");
    cmd
}

/// Helper to create a workspace with an admin operator and one department
fn setup_workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    csimport(&tmp)
        .args(["init", "--admin", "admin@uni.edu"])
        .assert()
        .success();
    csimport(&tmp)
        .args(["ref", "dept", "Computer Science"])
        .assert()
        .success();
    tmp
}

fn write_file(tmp: &TempDir, name: &str, contents: &str) {
    fs::write(tmp.path().join(name), contents).unwrap();
}

// ============================================================================
// Basic CLI
// ============================================================================

#[test]
fn test_help_lists_commands() {
    let tmp = TempDir::new().unwrap();
    csimport(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("template"))
        .stdout(predicate::str::contains("logs"));
}

#[test]
fn test_version_flag() {
    let tmp = TempDir::new().unwrap();
    csimport(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("csimport"));
}

#[test]
fn test_unknown_entity_type_is_rejected() {
    let tmp = setup_workspace();
    write_file(&tmp, "x.csv", "a\n1\n");
    csimport(&tmp)
        .args(["import", "teams", "x.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid entity type"));
}

// ============================================================================
// Init
// ============================================================================

#[test]
fn test_init_creates_workspace() {
    let tmp = TempDir::new().unwrap();
    csimport(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized import workspace"));

    assert!(tmp.path().join(".csimport").is_dir());
    assert!(tmp.path().join(".csimport/config.yaml").is_file());
    assert!(tmp.path().join(".csimport/store.db").is_file());
}

#[test]
fn test_init_twice_is_reported() {
    let tmp = TempDir::new().unwrap();
    csimport(&tmp).arg("init").assert().success();
    csimport(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_init_with_admin_sets_operator() {
    let tmp = TempDir::new().unwrap();
    csimport(&tmp)
        .args(["init", "--admin", "admin@uni.edu"])
        .assert()
        .success()
        .stdout(predicate::str::contains("operator set to admin@uni.edu"));

    let config = fs::read_to_string(tmp.path().join(".csimport/config.yaml")).unwrap();
    assert!(config.contains("operator: admin@uni.edu"));
}

// ============================================================================
// Templates
// ============================================================================

#[test]
fn test_template_to_file_has_bom_and_headers() {
    let tmp = setup_workspace();
    csimport(&tmp)
        .args(["template", "subjects", "-o", "subjects.csv"])
        .assert()
        .success();

    let bytes = fs::read(tmp.path().join("subjects.csv")).unwrap();
    assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    assert!(text.starts_with("subject_code,subject_name,credits,dept_name"));
}

#[test]
fn test_template_to_stdout() {
    let tmp = setup_workspace();
    csimport(&tmp)
        .args(["template", "users", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("email,full_name,role_name,dept_name,phone"));
}

#[test]
fn test_template_requires_importing_operator() {
    let tmp = setup_workspace();
    write_file(
        &tmp,
        "users.csv",
        "email,full_name,role_name,dept_name\nlec@uni.edu,Lena Lecturer,LECTURER,Computer Science\n",
    );
    csimport(&tmp)
        .args(["import", "users", "users.csv"])
        .assert()
        .success();

    csimport(&tmp)
        .args(["template", "subjects", "--as", "lec@uni.edu"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not allowed to import"));
}

#[test]
fn test_template_outside_workspace_fails() {
    let tmp = TempDir::new().unwrap();
    csimport(&tmp)
        .args(["template", "subjects"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an import workspace"));
}

// ============================================================================
// Reference data
// ============================================================================

#[test]
fn test_ref_list_shows_department() {
    let tmp = setup_workspace();
    csimport(&tmp)
        .args(["ref", "semester", "2024-FALL"])
        .assert()
        .success();

    csimport(&tmp)
        .args(["ref", "list", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("department\t1\tComputer Science"))
        .stdout(predicate::str::contains("semester\t1\t2024-FALL"));
}

#[test]
fn test_ref_duplicate_department_fails() {
    let tmp = setup_workspace();
    csimport(&tmp)
        .args(["ref", "dept", "Computer Science"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ============================================================================
// Import
// ============================================================================

#[test]
fn test_import_subjects_end_to_end() {
    let tmp = setup_workspace();
    write_file(
        &tmp,
        "subjects.csv",
        "subject_code,subject_name,credits,dept_name\n\
         IT101,Intro to IT,3,Computer Science\n\
         IT102,Data Structures,11,Computer Science\n\
         IT103,Networks,3,Physics\n",
    );

    let output = csimport(&tmp)
        .args(["import", "subjects", "subjects.csv", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["entity_type"], "subjects");
    assert_eq!(report["total_rows"], 3);
    assert_eq!(report["successful"], 1);
    assert_eq!(report["failed"], 2);
    assert_eq!(report["committed"], true);
    assert_eq!(report["results"][0]["status"], "success");
    assert_eq!(report["results"][0]["row_number"], 2);
    assert_eq!(report["results"][1]["status"], "error");
    assert_eq!(report["results"][2]["row_number"], 4);
    assert!(report["log_id"].is_i64());
}

#[test]
fn test_reimport_skips_existing_rows() {
    let tmp = setup_workspace();
    write_file(
        &tmp,
        "subjects.csv",
        "subject_code,subject_name,credits,dept_name\nIT101,Intro to IT,3,Computer Science\n",
    );

    csimport(&tmp)
        .args(["import", "subjects", "subjects.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Subject created successfully"));

    csimport(&tmp)
        .args(["import", "subjects", "subjects.csv", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped"))
        .stdout(predicate::str::contains("already exists in database"));
}

#[test]
fn test_import_human_summary() {
    let tmp = setup_workspace();
    write_file(
        &tmp,
        "subjects.csv",
        "subject_code,subject_name,credits,dept_name\nIT101,Intro to IT,3,Computer Science\n",
    );

    csimport(&tmp)
        .args(["import", "subjects", "subjects.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Import Summary"))
        .stdout(predicate::str::contains("Created:"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let tmp = setup_workspace();
    write_file(
        &tmp,
        "subjects.csv",
        "subject_code,subject_name,credits,dept_name\nIT101,Intro to IT,3,Computer Science\n",
    );

    csimport(&tmp)
        .args(["import", "subjects", "subjects.csv", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run complete"));

    // The real run still creates the subject
    csimport(&tmp)
        .args(["import", "subjects", "subjects.csv", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("success"));

    csimport(&tmp)
        .args(["logs", "list", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\tsubjects\t").count(1));
}

#[test]
fn test_import_missing_columns_fails() {
    let tmp = setup_workspace();
    write_file(&tmp, "subjects.csv", "subject_code,subject_name\nIT101,Intro\n");

    csimport(&tmp)
        .args(["import", "subjects", "subjects.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required columns"));
}

#[test]
fn test_import_unsupported_extension_fails() {
    let tmp = setup_workspace();
    write_file(&tmp, "subjects.txt", "subject_code\nIT101\n");

    csimport(&tmp)
        .args(["import", "subjects", "subjects.txt"])
        .assert()
        .failure();
}

#[test]
fn test_import_missing_file_fails() {
    let tmp = setup_workspace();
    csimport(&tmp)
        .args(["import", "subjects", "nope.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_import_without_operator_fails() {
    let tmp = TempDir::new().unwrap();
    csimport(&tmp).arg("init").assert().success();
    write_file(
        &tmp,
        "subjects.csv",
        "subject_code,subject_name,credits,dept_name\nIT101,Intro,3,Computer Science\n",
    );

    csimport(&tmp)
        .args(["import", "subjects", "subjects.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no operator configured"));
}

#[test]
fn test_import_unknown_operator_fails() {
    let tmp = setup_workspace();
    write_file(
        &tmp,
        "subjects.csv",
        "subject_code,subject_name,credits,dept_name\nIT101,Intro,3,Computer Science\n",
    );

    csimport(&tmp)
        .args(["import", "subjects", "subjects.csv", "--as", "ghost@uni.edu"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found in store"));
}

#[test]
fn test_lecturer_cannot_import() {
    let tmp = setup_workspace();
    write_file(
        &tmp,
        "users.csv",
        "email,full_name,role_name,dept_name\nlec@uni.edu,Lena Lecturer,LECTURER,Computer Science\n",
    );
    csimport(&tmp)
        .args(["import", "users", "users.csv"])
        .assert()
        .success();

    write_file(
        &tmp,
        "subjects.csv",
        "subject_code,subject_name,credits,dept_name\nIT101,Intro,3,Computer Science\n",
    );
    csimport(&tmp)
        .args(["import", "subjects", "subjects.csv", "--as", "lec@uni.edu"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not allowed to import"));
}

#[test]
fn test_import_classes_after_users_and_subjects() {
    let tmp = setup_workspace();
    csimport(&tmp)
        .args(["ref", "semester", "2024-FALL"])
        .assert()
        .success();

    write_file(
        &tmp,
        "users.csv",
        "email,full_name,role_name,dept_name,phone\n\
         lec@uni.edu,Lena Lecturer,LECTURER,Computer Science,0901234567\n",
    );
    write_file(
        &tmp,
        "subjects.csv",
        "subject_code,subject_name,credits,dept_name\nIT101,Intro,3,Computer Science\n",
    );
    write_file(
        &tmp,
        "classes.csv",
        "class_code,semester_code,subject_code,lecturer_email\n\
         IT101-01,2024-FALL,IT101,lec@uni.edu\n\
         IT101-02,2024-FALL,IT101,admin@uni.edu\n",
    );

    csimport(&tmp).args(["import", "users", "users.csv"]).assert().success();
    csimport(&tmp).args(["import", "subjects", "subjects.csv"]).assert().success();

    let output = csimport(&tmp)
        .args(["import", "classes", "classes.csv", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["successful"], 1);
    assert_eq!(report["failed"], 1);
    assert_eq!(report["results"][1]["status"], "error");
}

// ============================================================================
// Logs
// ============================================================================

#[test]
fn test_logs_list_and_delete() {
    let tmp = setup_workspace();
    write_file(
        &tmp,
        "subjects.csv",
        "subject_code,subject_name,credits,dept_name\nIT101,Intro,3,Computer Science\n",
    );
    csimport(&tmp)
        .args(["import", "subjects", "subjects.csv"])
        .assert()
        .success();

    csimport(&tmp)
        .args(["logs", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("subjects.csv"));

    csimport(&tmp)
        .args(["logs", "show", "1", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"import_type\": \"subjects\""));

    csimport(&tmp)
        .args(["logs", "delete", "1"])
        .assert()
        .success();

    csimport(&tmp)
        .args(["logs", "show", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_no_log_flag_skips_log() {
    let tmp = setup_workspace();
    write_file(
        &tmp,
        "subjects.csv",
        "subject_code,subject_name,credits,dept_name\nIT101,Intro,3,Computer Science\n",
    );
    csimport(&tmp)
        .args(["import", "subjects", "subjects.csv", "--no-log"])
        .assert()
        .success();

    csimport(&tmp)
        .args(["logs", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No import logs yet"));
}
