// Regression tests for the `xmlui` binary.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn xmlui() -> Command {
    let mut cmd = Command::cargo_bin("xmlui").unwrap();
    cmd.arg("--color").arg("never");
    cmd
}

#[test]
fn build_prints_the_component_definition() {
    xmlui()
        .arg("build")
        .arg("tests/fixtures/valid/Counter.xmlui")
        .assert()
        .success()
        .stdout(contains("\"Counter\"").and(contains("\"Stack\"")).and(contains("increment")));
}

#[test]
fn build_reports_shape_errors() {
    xmlui()
        .arg("build")
        .arg("tests/fixtures/invalid/two_roots.xmlui")
        .assert()
        .code(1)
        .stderr(contains("T001"));
}

#[test]
fn parse_prints_script_ast_as_json() {
    xmlui()
        .arg("parse")
        .arg("tests/fixtures/valid/main.xs")
        .assert()
        .success()
        .stdout(contains("\"Import\"").and(contains("\"Function\"")));
}

#[test]
fn parse_prints_markup_tree_as_json() {
    xmlui()
        .arg("parse")
        .arg("tests/fixtures/valid/Counter.xmlui")
        .assert()
        .success()
        .stdout(contains("\"Element\"").and(contains("\"Script\"")));
}

#[test]
fn lex_lists_tokens_with_positions() {
    xmlui()
        .arg("lex")
        .arg("tests/fixtures/valid/util.xs")
        .assert()
        .success()
        .stdout(contains("Export \"export\" @1:0").and(contains("Return")));
}

#[test]
fn resolve_follows_imports_from_disk() {
    xmlui()
        .arg("resolve")
        .arg("tests/fixtures/valid/main.xs")
        .assert()
        .success()
        .stdout(contains("tests/fixtures/valid/util.xs").and(contains("twice")));
}

#[test]
fn check_passes_on_valid_files() {
    xmlui()
        .arg("check")
        .arg("tests/fixtures/valid")
        .assert()
        .success()
        .stdout(contains("3 file(s) checked: 0 error(s)"));
}

#[test]
fn check_renders_every_error_and_fails() {
    xmlui()
        .arg("check")
        .arg("tests/fixtures/invalid")
        .assert()
        .code(1)
        .stderr(contains("T001").and(contains("W003")))
        .stdout(contains("2 file(s) checked"));
}

#[test]
fn missing_file_is_a_command_failure() {
    xmlui()
        .arg("build")
        .arg("tests/fixtures/does_not_exist.xmlui")
        .assert()
        .code(2)
        .stderr(contains("cannot read"));
}
