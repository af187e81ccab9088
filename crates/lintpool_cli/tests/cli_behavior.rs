//! Integration tests for CLI behavior
//!
//! Each test runs the binary in a scratch project and checks exit codes,
//! the JSON report and the suppressions file.

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::{Value, json};

const SEMI_CONFIG: &str = r#"[{ "rules": { "semi": "error" } }]"#;
const SUPPRESSIONS: &str = "lintpool-suppressions.json";

fn lintpool_cmd(temp: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lintpool"));
    cmd.current_dir(temp.path());
    cmd
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    temp.child("lintpool.config.json").write_str(SEMI_CONFIG).unwrap();
    for (name, content) in files {
        temp.child(name).write_str(content).unwrap();
    }
    temp
}

fn json_report(output: &[u8]) -> Vec<Value> {
    serde_json::from_slice(output).expect("report is JSON")
}

fn read_suppressions(temp: &TempDir) -> Value {
    let content = std::fs::read_to_string(temp.child(SUPPRESSIONS).path()).unwrap();
    serde_json::from_str(&content).unwrap()
}

mod help_command {
    use super::*;

    #[test]
    fn shows_help_with_flag() {
        let temp = TempDir::new().unwrap();
        lintpool_cmd(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage:"))
            .stdout(predicate::str::contains("--suppress-all"));
    }

    #[test]
    fn shows_version_with_flag() {
        let temp = TempDir::new().unwrap();
        lintpool_cmd(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }
}

mod parallel_linting {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reports_each_file_in_order() {
        let temp = project(&[("a.js", "var x = 1"), ("b.js", "var y = 2")]);

        let output = lintpool_cmd(&temp)
            .args(["--concurrency", "2", "-f", "json", "a.js", "b.js"])
            .assert()
            .code(1)
            .get_output()
            .stdout
            .clone();

        let report = json_report(&output);
        assert_eq!(report.len(), 2);
        for (result, name) in report.iter().zip(["a.js", "b.js"]) {
            assert!(result["filePath"].as_str().unwrap().ends_with(name));
            assert_eq!(result["errorCount"], 1);
            assert_eq!(result["messages"][0]["ruleId"], "semi");
        }
    }

    #[test]
    fn matches_sequential_output() {
        let temp = project(&[
            ("a.js", "var x = 1"),
            ("b.js", "let y = 2;\n"),
            ("src/c.js", "const z = 3\n"),
        ]);

        let sequential = lintpool_cmd(&temp).args(["-f", "json", "."]).output().unwrap();
        let parallel = lintpool_cmd(&temp)
            .args(["--concurrency", "3", "-f", "json", "."])
            .output()
            .unwrap();

        assert_eq!(json_report(&parallel.stdout), json_report(&sequential.stdout));
        assert_eq!(parallel.status.code(), Some(1));
    }

    #[test]
    fn rejects_invalid_concurrency() {
        let temp = project(&[("a.js", "let a = 1;\n")]);
        lintpool_cmd(&temp)
            .args(["--concurrency", "lots", "a.js"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("is not a valid value"));
    }

    #[test]
    fn clean_files_exit_zero_with_no_output() {
        let temp = project(&[("a.js", "let a = 1;\n")]);
        lintpool_cmd(&temp)
            .args(["--concurrency", "auto", "a.js"])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());
    }
}

mod suppressions {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn suppress_all_round_trip() {
        let files: Vec<(String, &str)> =
            (1..=4).map(|i| (format!("f{i}.js"), "var x = 1")).collect();
        let refs: Vec<(&str, &str)> = files.iter().map(|(n, c)| (n.as_str(), *c)).collect();
        let temp = project(&refs);

        lintpool_cmd(&temp)
            .args(["--suppress-all", "--concurrency", "2", "."])
            .assert()
            .success();
        let db = read_suppressions(&temp);
        assert_eq!(
            db,
            json!({
                "f1.js": { "semi": { "count": 1 } },
                "f2.js": { "semi": { "count": 1 } },
                "f3.js": { "semi": { "count": 1 } },
                "f4.js": { "semi": { "count": 1 } },
            })
        );
        let written = std::fs::read_to_string(temp.child(SUPPRESSIONS).path()).unwrap();

        let output = lintpool_cmd(&temp)
            .args(["-f", "json", "--concurrency", "2", "."])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        for result in json_report(&output) {
            assert_eq!(result["messages"], json!([]));
            assert_eq!(result["suppressedMessages"].as_array().unwrap().len(), 1);
            assert_eq!(result["suppressedMessages"][0]["suppressions"][0]["kind"], "file");
        }
        assert_eq!(std::fs::read_to_string(temp.child(SUPPRESSIONS).path()).unwrap(), written);
    }

    #[test]
    fn unused_suppressions_fail_the_run() {
        let temp = project(&[("a.js", "var x = 1")]);
        temp.child(SUPPRESSIONS)
            .write_str(r#"{ "a.js": { "semi": { "count": 2 } } }"#)
            .unwrap();

        lintpool_cmd(&temp)
            .arg("a.js")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("suppressions left"));

        lintpool_cmd(&temp)
            .args(["--pass-on-unpruned-suppressions", "a.js"])
            .assert()
            .success();
    }

    #[test]
    fn prune_shrinks_counts_idempotently() {
        let temp = project(&[("a.js", "var x = 1")]);
        temp.child(SUPPRESSIONS)
            .write_str(r#"{ "a.js": { "semi": { "count": 2 } } }"#)
            .unwrap();

        lintpool_cmd(&temp)
            .args(["--prune-suppressions", "a.js"])
            .assert()
            .success();
        assert_eq!(read_suppressions(&temp), json!({ "a.js": { "semi": { "count": 1 } } }));
        let first = std::fs::read_to_string(temp.child(SUPPRESSIONS).path()).unwrap();

        lintpool_cmd(&temp)
            .args(["--prune-suppressions", "a.js"])
            .assert()
            .success();
        let second = std::fs::read_to_string(temp.child(SUPPRESSIONS).path()).unwrap();
        assert_eq!(second, first);
    }

    #[test]
    fn invalid_database_is_an_error() {
        let temp = project(&[("a.js", "let a = 1;\n")]);
        temp.child(SUPPRESSIONS).write_str("not json").unwrap();

        lintpool_cmd(&temp)
            .arg("a.js")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Failed to parse suppressions file at"));
    }

    #[test]
    fn exclusive_modes_are_rejected() {
        let temp = project(&[("a.js", "var x = 1")]);

        lintpool_cmd(&temp)
            .args(["--suppress-all", "--suppress-rule", "semi", "a.js"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("cannot be used together"));
        temp.child(SUPPRESSIONS).assert(predicate::path::missing());
    }

    #[test]
    fn invocation_errors_print_without_logging() {
        let temp = project(&[("a.js", "var x = 1")]);

        lintpool_cmd(&temp)
            .env("RUST_LOG", "off")
            .args(["--suppress-all", "--prune-suppressions", "a.js"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("cannot be used together"));
    }

    #[test]
    fn write_modes_reject_stdin() {
        let temp = project(&[]);
        lintpool_cmd(&temp)
            .args(["--stdin", "--suppress-all"])
            .write_stdin("var x = 1")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("cannot be used with piped-in code"));
    }

    #[test]
    fn explicit_missing_location_is_an_error() {
        let temp = project(&[("a.js", "let a = 1;\n")]);
        lintpool_cmd(&temp)
            .args(["--suppressions-location", "custom.json", "a.js"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("The suppressions file does not exist"));
    }

    #[test]
    fn suppress_rule_only_records_that_rule() {
        let temp = TempDir::new().unwrap();
        temp.child("lintpool.config.json")
            .write_str(r#"[{ "rules": { "semi": "error", "eqeqeq": "error" } }]"#)
            .unwrap();
        temp.child("a.js").write_str("if (a == b) {}\nlet x = 1\n").unwrap();

        lintpool_cmd(&temp)
            .args(["--suppress-rule", "semi", "a.js"])
            .assert()
            .code(1);
        assert_eq!(read_suppressions(&temp), json!({ "a.js": { "semi": { "count": 1 } } }));
    }

    #[test]
    fn fixed_violations_leave_the_database() {
        let temp = project(&[("a.js", "var x = 1")]);
        temp.child(SUPPRESSIONS)
            .write_str(r#"{ "a.js": { "semi": { "count": 1 } } }"#)
            .unwrap();

        lintpool_cmd(&temp)
            .args(["--fix", "--suppress-all", "a.js"])
            .assert()
            .success();
        temp.child("a.js").assert("var x = 1;");
        assert_eq!(read_suppressions(&temp), json!({}));
    }
}

mod reporting {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn stylish_output_names_rule() {
        let temp = project(&[("a.js", "var x = 1")]);
        lintpool_cmd(&temp)
            .arg("a.js")
            .assert()
            .code(1)
            .stdout(predicate::str::contains("1:10  error  Missing semicolon  semi"))
            .stdout(predicate::str::contains("1 problem (1 error, 0 warnings)"));
    }

    #[test]
    fn too_many_warnings() {
        let temp = project(&[("a.js", "let a = 1;\n")]);
        lintpool_cmd(&temp)
            .args(["--rule", "no-var:warn", "--max-warnings", "0", "a.js"])
            .assert()
            .success();

        temp.child("b.js").write_str("var b = 1;\n").unwrap();
        lintpool_cmd(&temp)
            .args(["--rule", "no-var:warn", "--max-warnings", "0", "b.js"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("lintpool found too many warnings (maximum: 0)."));
    }

    #[test]
    fn output_file_receives_report() {
        let temp = project(&[("a.js", "var x = 1")]);
        lintpool_cmd(&temp)
            .args(["-f", "json", "-o", "out/report.json", "a.js"])
            .assert()
            .code(1)
            .stdout(predicate::str::is_empty());

        let content = std::fs::read_to_string(temp.child("out/report.json").path()).unwrap();
        let report: Vec<Value> = serde_json::from_str(&content).unwrap();
        assert_eq!(report[0]["errorCount"], 1);
    }

    #[test]
    fn metadata_includes_reporting_rules() {
        let temp = project(&[("a.js", "var x = 1")]);
        let output = lintpool_cmd(&temp)
            .args(["-f", "json-with-metadata", "--concurrency", "2", "a.js"])
            .assert()
            .code(1)
            .get_output()
            .stdout
            .clone();

        let value: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value["metadata"]["rulesMeta"]["semi"]["type"], "layout");
    }

    #[test]
    fn stdin_uses_text_placeholder() {
        let temp = project(&[]);
        let output = lintpool_cmd(&temp)
            .args(["--stdin", "-f", "json"])
            .write_stdin("var x = 1")
            .assert()
            .code(1)
            .get_output()
            .stdout
            .clone();

        let report = json_report(&output);
        assert_eq!(report[0]["filePath"], "<text>");
    }

    #[test]
    fn empty_config_warned_once() {
        let temp = TempDir::new().unwrap();
        temp.child("lintpool.config.json").write_str("[]").unwrap();
        for i in 0..6 {
            temp.child(format!("f{i}.js")).write_str("let a = 1;\n").unwrap();
        }

        let output = lintpool_cmd(&temp)
            .args(["--concurrency", "3", "."])
            .assert()
            .success()
            .get_output()
            .stderr
            .clone();
        let stderr = String::from_utf8(output).unwrap();
        assert_eq!(stderr.matches("Running lintpool with an empty config").count(), 1);
    }
}
