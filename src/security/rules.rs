use super::{Issue, SecurityReport, Severity};
use crate::config::DeploymentConfiguration;

pub const CONFIGURATION_RULE_COUNT: usize = 6;

fn tls_policy(config: &DeploymentConfiguration) -> Issue {
    match config.tls_policy.trim().to_ascii_lowercase().as_str() {
        "modern" | "restricted" => Issue::pass(
            "TLS_POLICY_STRONG",
            format!("TLS policy `{}` only allows TLS 1.2+", config.tls_policy),
        ),
        "compatible" => Issue::new(
            Severity::Medium,
            "TLS_POLICY_COMPATIBLE",
            "TLS policy `compatible` still accepts TLS 1.0 and 1.1 clients",
            "Switch the SSL policy to `modern` unless legacy clients must be supported",
        ),
        _ => Issue::new(
            Severity::Medium,
            "TLS_POLICY_UNRECOGNIZED",
            format!("TLS policy `{}` is not recognized", config.tls_policy),
            "Use one of `modern`, `restricted` or `compatible`",
        ),
    }
}

fn secret_store(config: &DeploymentConfiguration) -> Issue {
    if config.enable_secret_manager {
        Issue::pass(
            "SECRET_MANAGER_ENABLED",
            "Runtime secrets are read from Secret Manager",
        )
    } else {
        Issue::new(
            Severity::High,
            "SECRET_MANAGER_DISABLED",
            "Secrets such as SECRET_KEY_BASE and DATABASE_URL would be passed as plain environment variables",
            "Enable Secret Manager so secrets are mounted at runtime instead of stored in the service definition",
        )
    }
}

fn waf(config: &DeploymentConfiguration) -> Issue {
    if config.enable_waf {
        Issue::pass("WAF_ENABLED", "Cloud Armor policy protects the load balancer")
    } else {
        Issue::new(
            Severity::Low,
            "WAF_DISABLED",
            "No Cloud Armor policy is attached to the service",
            "Enable Cloud Armor to filter common web attacks and rate limit abusive clients",
        )
    }
}

fn project_id(config: &DeploymentConfiguration) -> Issue {
    if !config.project_id.trim().is_empty() {
        Issue::pass(
            "PROJECT_ID_SET",
            format!("Resources are scoped to project `{}`", config.project_id.trim()),
        )
    } else {
        Issue::new(
            Severity::Medium,
            "PROJECT_ID_MISSING",
            "No Google Cloud project id is configured",
            "Set the project id so resources are not created in an unintended default project",
        )
    }
}

fn custom_domain(config: &DeploymentConfiguration) -> Issue {
    match config.custom_domain() {
        Some(domain) => Issue::pass(
            "CUSTOM_DOMAIN_SET",
            format!("Service is served from `{domain}` with a managed certificate"),
        ),
        None => Issue::new(
            Severity::Low,
            "CUSTOM_DOMAIN_MISSING",
            "Service is only reachable through its default run.app URL",
            "Map a custom domain to get a managed certificate under your own name",
        ),
    }
}

fn min_instances(config: &DeploymentConfiguration) -> Issue {
    if config.min_instances == 0 {
        Issue::new(
            Severity::Low,
            "MIN_INSTANCES_ZERO",
            "Service scales to zero, so the first request after idle hits a cold start",
            "Keep at least one warm instance if startup latency matters",
        )
    } else {
        Issue::pass(
            "MIN_INSTANCES_WARM",
            format!("{} instance(s) kept warm", config.min_instances),
        )
    }
}

/// Evaluates the six configuration rules, one issue each.
pub fn check_configuration(config: &DeploymentConfiguration) -> SecurityReport {
    let issues = vec![
        tls_policy(config),
        secret_store(config),
        waf(config),
        project_id(config),
        custom_domain(config),
        min_instances(config),
    ];

    SecurityReport::from_issues(issues, CONFIGURATION_RULE_COUNT)
}
