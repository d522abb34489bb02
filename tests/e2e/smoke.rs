use super::*;
use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_every_command() {
    Command::cargo_bin("deployer")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("analyze"))
                .and(predicate::str::contains("estimate"))
                .and(predicate::str::contains("check"))
                .and(predicate::str::contains("generate"))
                .and(predicate::str::contains("wizard")),
        );
}

#[test]
fn init_runs_without_error() {
    let ctx = TestContext::new();
    let result = ctx.run_deployer(&["init", "--yes"]);

    assert_success(&result);
    ctx.assert_file_exists("deploy.toml");
}

#[test]
fn estimate_runs_without_config() {
    let ctx = TestContext::new();
    let result = ctx.run_deployer(&["estimate"]);

    assert_success(&result);
    assert_output_contains(&result, "Total");
}
