use super::*;
use deployer::config::Environment;
use deployer::pricing::CostBreakdown;

const SECURE_CONFIG: &str = r#"
[deployment]
app_name = "storefront"
environment = "production"
project_id = "acme-prod"
db_tier = "db-g1-small"
use_private_network = true
enable_secret_manager = true
enable_waf = true
enable_cdn = false
tls_policy = "restricted"
custom_domain = "shop.example.com"
min_instances = 1
"#;

#[test]
fn init_writes_default_project_config() {
    let ctx = TestContext::new();
    let result = ctx.run_deployer(&["init", "--yes", "--repo", "https://github.com/acme/storefront"]);

    assert_success(&result);
    assert_output_contains(&result, "deploy.toml");

    let config = ctx.load_project_config();
    assert_eq!(
        config.repository.map(|r| r.url).as_deref(),
        Some("https://github.com/acme/storefront")
    );
    assert!(!config.deployment.app_name.is_empty());
    assert_eq!(config.deployment.environment, Environment::Production);
    assert_eq!(config.deployment.region, "us-central1");
}

#[test]
fn estimate_json_matches_components() {
    let ctx = TestContext::new();
    ctx.write_file("deploy.toml", SECURE_CONFIG);

    let result = ctx.run_deployer(&["estimate", "--json"]);
    assert_success(&result);

    let cost: CostBreakdown = serde_json::from_str(&result.stdout).expect("valid JSON");
    let sum: f64 = cost.components().map(|(_, amount)| amount).sum();

    assert_eq!(cost.currency, "USD");
    assert!(cost.cloud_armor > 0.0);
    assert_eq!(cost.cloud_cdn, 0.0);
    assert!((cost.total - sum).abs() < 0.005);
}

#[test]
fn check_reports_configuration_score() {
    let ctx = TestContext::new();
    ctx.write_file("deploy.toml", SECURE_CONFIG);

    let result = ctx.run_deployer(&["check"]);

    assert_success(&result);
    assert_output_contains(&result, "Configuration: score 100/100");
}

#[test]
fn generate_writes_all_artifacts_offline() {
    let ctx = TestContext::new();
    ctx.write_file("deploy.toml", SECURE_CONFIG);

    let result = ctx.run_deployer(&["generate", "--out", "deploy"]);
    assert_success(&result);

    ctx.assert_file_exists("deploy/Dockerfile");
    ctx.assert_file_exists("deploy/terraform/main.tf");
    ctx.assert_file_exists("deploy/terraform/variables.tf");
    ctx.assert_file_exists("deploy/terraform/outputs.tf");
    ctx.assert_file_exists("deploy/.github/workflows/deploy.yml");

    ctx.assert_file_contains("deploy/Dockerfile", "/rel/storefront ./");
    ctx.assert_file_contains("deploy/terraform/main.tf", "deletion_protection = true");
    ctx.assert_file_contains("deploy/terraform/main.tf", "google_compute_security_policy");
    ctx.assert_file_contains("deploy/terraform/main.tf", "\"shop.example.com\"");
    assert_output_contains(&result, "Security scan: score 100/100");

    let workflow = ctx.read_file("deploy/.github/workflows/deploy.yml");
    assert!(workflow.contains("PROJECT_ID: \"acme-prod\""), "{workflow}");
    assert!(workflow.contains("environment: production"), "{workflow}");
}

#[test]
fn check_scans_generated_artifacts() {
    let ctx = TestContext::new();
    ctx.write_file("deploy.toml", SECURE_CONFIG);

    assert_success(&ctx.run_deployer(&["generate", "--out", "out"]));

    let result = ctx.run_deployer(&["check", "--artifacts", "out", "--json"]);
    assert_success(&result);

    let json: serde_json::Value = serde_json::from_str(&result.stdout).expect("valid JSON");
    assert_eq!(json["configuration"]["score"], 100);
    assert_eq!(json["artifacts"]["score"], 100);
    assert_eq!(json["artifacts"]["errors"].as_array().map(Vec::len), Some(0));
}

#[test]
fn generate_zip_bundles_artifacts() {
    let ctx = TestContext::new();
    ctx.write_file("deploy.toml", SECURE_CONFIG);

    let result = ctx.run_deployer(&["generate", "--zip", "artifacts.zip"]);

    assert_success(&result);
    ctx.assert_file_exists("artifacts.zip");
    assert!(!ctx.file_path("Dockerfile").exists());
}
