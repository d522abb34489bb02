use super::*;

#[test]
fn init_refuses_to_overwrite_without_force() {
    let ctx = TestContext::new();
    ctx.write_file("deploy.toml", "[deployment]\napp_name = \"keep_me\"\n");

    let result = ctx.run_deployer(&["init", "--yes"]);
    assert_failure(&result);
    ctx.assert_file_contains("deploy.toml", "keep_me");

    let result = ctx.run_deployer(&["init", "--yes", "--force"]);
    assert_success(&result);
    assert_ne!(ctx.load_project_config().deployment.app_name, "keep_me");
}

#[test]
fn analyze_rejects_non_github_url() {
    let ctx = TestContext::new();
    let result = ctx.run_deployer(&["analyze", "https://gitlab.com/acme/shop"]);

    assert_failure(&result);
    assert!(
        result.stderr.contains("invalid repository reference"),
        "STDERR:\n{}",
        result.stderr
    );
}

#[test]
fn estimate_fails_for_missing_explicit_config() {
    let ctx = TestContext::new();
    let result = ctx.run_deployer(&["estimate", "--config", "missing.toml"]);

    assert_failure(&result);
}

#[test]
fn check_fails_when_artifacts_are_missing() {
    let ctx = TestContext::new();
    ctx.write_file("empty/.keep", "");

    let result = ctx.run_deployer(&["check", "--artifacts", "empty"]);

    assert_failure(&result);
}

#[test]
fn unknown_tier_is_billed_for_storage_only() {
    let ctx = TestContext::new();
    ctx.write_file(
        "deploy.toml",
        "[deployment]\ndb_tier = \"db-perf-optimized-N-2\"\nenable_secret_manager = false\n",
    );

    let result = ctx.run_deployer(&["estimate"]);

    assert_success(&result);
    assert_output_contains(&result, "db-perf-optimized-N-2 (db-perf-optimized-N-2)");
}

#[test]
fn public_database_is_flagged_in_generated_files() {
    let ctx = TestContext::new();
    ctx.write_file(
        "deploy.toml",
        "[deployment]\nuse_private_network = false\n",
    );

    assert_success(&ctx.run_deployer(&["generate", "--out", "out"]));

    let result = ctx.run_deployer(&["check", "--artifacts", "out"]);

    assert_success(&result);
    assert_output_contains(&result, "DATABASE_PUBLIC_IP");
}

#[test]
fn generate_rejects_text_that_escapes_string_literals() {
    let ctx = TestContext::new();
    ctx.write_file(
        "deploy.toml",
        "[deployment]\ncustom_domain = \"shop.example.com\\\"\\n}\\nresource \\\"google_compute_firewall\\\" \\\"open\\\" {}\"\n",
    );

    let result = ctx.run_deployer(&["generate", "--out", "out"]);

    assert_failure(&result);
    assert!(result.stderr.contains("custom_domain"), "STDERR:\n{}", result.stderr);
    assert!(!ctx.file_path("out/terraform/main.tf").exists());

    let config = ctx.read_file("deploy.toml");
    assert!(config.contains("google_compute_firewall"));
}
