//! Invoker binary tests
//!
//! Each test runs in its own temporary directory so no stray `.env` or
//! `ops-status.toml` from the repository is picked up.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn ops_status(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ops-status").unwrap();
    cmd.current_dir(dir)
        .env_remove("TABLE_NAME")
        .env_remove("BUSINESS_CLOSING_TIME")
        .env_remove("RUST_LOG")
        .env("OPS_STATUS_OBSERVABILITY__JSON_LOGS", "false");
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_auth_from_stdin() {
        let dir = TempDir::new().unwrap();
        ops_status(dir.path())
            .arg("status")
            .write_stdin(r#"{"Details": {"Parameters": {"check_auth": "123456"}}}"#)
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"AuthCodeStatus":true}"#));
    }

    #[test]
    fn test_status_persists_between_invocations() {
        let dir = TempDir::new().unwrap();
        let change = dir.path().join("change.json");
        std::fs::write(
            &change,
            r#"{"Details": {"Parameters": {"change_status": "Activate SC Emergency Mode"}}}"#,
        )
        .unwrap();

        ops_status(dir.path())
            .args(["status", "--event"])
            .arg(&change)
            .assert()
            .success()
            .stdout(predicate::str::contains("Status updated: Activate SC Emergency Mode"));

        assert!(dir.path().join(".ops-status/ops-status.json").exists());

        ops_status(dir.path())
            .arg("status")
            .write_stdin(
                r#"{"Details": {"Parameters": {"function": "get_status", "status_type": "SC Emergency Mode"}}}"#,
            )
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"status":true}"#));
    }

    #[test]
    fn test_table_name_comes_from_deployment_variable() {
        let dir = TempDir::new().unwrap();
        ops_status(dir.path())
            .env("TABLE_NAME", "ContactCentreStatus")
            .arg("status")
            .write_stdin(r#"{"Details": {"Parameters": {"change_status": "Deactivate FES Meeting Mode"}}}"#)
            .assert()
            .success();

        assert!(dir.path().join(".ops-status/ContactCentreStatus.json").exists());
    }

    #[test]
    fn test_missing_parameters_exit_with_validation_code() {
        let dir = TempDir::new().unwrap();
        ops_status(dir.path())
            .arg("status")
            .write_stdin(r#"{"Details": {"Parameters": {}}}"#)
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Parameters must contain"));
    }

    #[test]
    fn test_clock_prints_date_and_flag() {
        let dir = TempDir::new().unwrap();
        ops_status(dir.path())
            .arg("clock")
            .assert()
            .success()
            .stdout(predicate::str::is_match(r#"^\{"date":"\d{4}-\d{2}-\d{2}","BusinessClosingTime":(true|false)\}\n$"#).unwrap());
    }

    #[test]
    fn test_clock_with_bad_cutoff_exits_with_config_code() {
        let dir = TempDir::new().unwrap();
        ops_status(dir.path())
            .env("BUSINESS_CLOSING_TIME", "bad-string")
            .arg("clock")
            .assert()
            .code(4)
            .stderr(predicate::str::contains("Invalid cutoff 'bad-string'"));
    }

    #[test]
    fn test_show_config_reflects_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("ops-status.toml"),
            "[business_hours]\nclosing_time = \"17:15\"\nutc_offset_hours = 10\n",
        )
        .unwrap();

        ops_status(dir.path())
            .arg("show-config")
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"closing_time = "17:15""#));
    }
}
