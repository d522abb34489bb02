use convert_case::{Case, Casing};
use serde::Serialize;

use crate::analyzer::{AnalysisResult, FALLBACK_BRANCH};
use crate::config::{DeploymentConfiguration, Environment};

pub const PLACEHOLDER_APP_NAME: &str = "my_app";
pub const DEFAULT_ELIXIR_VERSION: &str = "1.17";

/// Flat view over configuration and analysis facts. Every field is always
/// present so strict rendering can reject unknown names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderContext {
    pub app_name: String,
    pub app_module: String,
    pub service_name: String,

    pub elixir_version: String,
    pub phoenix_version: String,
    pub has_live_view: bool,
    pub has_ecto: bool,
    pub has_oban: bool,
    pub has_assets: bool,
    pub is_workspace: bool,
    pub repo_url: String,
    pub default_branch: String,

    pub environment: String,
    pub is_production: bool,
    pub project_id: String,
    pub region: String,
    pub zone: String,

    pub db_tier: String,
    pub db_version: String,
    pub db_disk_size_gb: u32,

    pub min_instances: u32,
    pub max_instances: u32,
    pub memory: String,
    pub cpu: u32,

    pub use_private_network: bool,
    pub enable_cdn: bool,
    pub enable_waf: bool,
    pub enable_secret_manager: bool,
    pub use_load_balancer: bool,
    pub tls_profile: String,
    pub min_tls_version: String,
    pub custom_domain: String,
    pub has_custom_domain: bool,
}

fn tls_settings(policy: &str) -> (&'static str, &'static str) {
    match policy.trim().to_ascii_lowercase().as_str() {
        "restricted" => ("RESTRICTED", "TLS_1_2"),
        "compatible" => ("COMPATIBLE", "TLS_1_0"),
        _ => ("MODERN", "TLS_1_2"),
    }
}

fn app_name(config: &DeploymentConfiguration, analysis: Option<&AnalysisResult>) -> String {
    analysis
        .and_then(|analysis| analysis.app_name.clone())
        .or_else(|| {
            let name = config.app_name.trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .unwrap_or_else(|| PLACEHOLDER_APP_NAME.to_string())
}

pub fn build_context(
    config: &DeploymentConfiguration,
    analysis: Option<&AnalysisResult>,
) -> RenderContext {
    let app_name = app_name(config, analysis);
    let (tls_profile, min_tls_version) = tls_settings(&config.tls_policy);
    let custom_domain = config.custom_domain().unwrap_or_default().to_string();
    let dependencies = analysis.map(|a| a.dependencies.clone()).unwrap_or_default();

    RenderContext {
        app_module: app_name.to_case(Case::Pascal),
        service_name: app_name.to_case(Case::Kebab),
        app_name,

        elixir_version: analysis
            .and_then(|a| a.elixir_version.clone())
            .unwrap_or_else(|| DEFAULT_ELIXIR_VERSION.to_string()),
        phoenix_version: analysis
            .and_then(|a| a.phoenix_version.clone())
            .unwrap_or_default(),
        has_live_view: dependencies.phoenix_live_view,
        has_ecto: dependencies.ecto_sql || dependencies.postgrex,
        has_oban: dependencies.oban,
        has_assets: dependencies.has_assets(),
        is_workspace: analysis.is_some_and(|a| a.is_workspace),
        repo_url: analysis.map(|a| a.repo_url.clone()).unwrap_or_default(),
        default_branch: analysis
            .map(|a| a.default_branch.clone())
            .unwrap_or_else(|| FALLBACK_BRANCH.to_string()),

        environment: config.environment.to_string(),
        is_production: config.environment == Environment::Production,
        project_id: config.project_id.trim().to_string(),
        region: config.region.clone(),
        zone: config.zone.clone(),

        db_tier: config.db_tier.clone(),
        db_version: config.db_version.clone(),
        db_disk_size_gb: config.db_disk_size_gb,

        min_instances: config.min_instances,
        max_instances: config.max_instances,
        memory: config.memory_limit(),
        cpu: config.cpu,

        use_private_network: config.use_private_network,
        enable_cdn: config.enable_cdn,
        enable_waf: config.enable_waf,
        enable_secret_manager: config.enable_secret_manager,
        use_load_balancer: config.enable_waf || config.enable_cdn || !custom_domain.is_empty(),
        tls_profile: tls_profile.to_string(),
        min_tls_version: min_tls_version.to_string(),
        has_custom_domain: !custom_domain.is_empty(),
        custom_domain,
    }
}
