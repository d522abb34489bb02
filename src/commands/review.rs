use askama::Template;
use termimad::MadSkin;

use crate::config::DeploymentConfiguration;
use crate::pricing::{CostBreakdown, tier_description};
use crate::security::SecurityReport;

// ============================================================================
// View Model
// ============================================================================

#[derive(Debug, Clone)]
pub struct CostLine {
    pub label: String,
    pub amount: String,
}

#[derive(Debug, Clone)]
pub struct FindingView {
    pub severity: String,
    pub code: String,
    pub message: String,
    pub recommendation: String,
}

#[derive(Debug, Clone)]
pub struct ReviewView {
    pub app_name: String,
    pub environment: String,
    pub project_id: String,
    pub region: String,
    pub database: String,
    pub compute: String,
    pub network: String,
    pub domain: String,
    pub currency: String,
    pub costs: Vec<CostLine>,
    pub total: String,
    pub score: u8,
    pub findings: Vec<FindingView>,
    pub passed: usize,
    pub generated_at: String,
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

impl ReviewView {
    pub fn build(
        config: &DeploymentConfiguration,
        cost: &CostBreakdown,
        security: &SecurityReport,
    ) -> Self {
        let findings = security
            .errors
            .iter()
            .chain(security.warnings.iter())
            .map(|issue| FindingView {
                severity: issue.severity.to_string(),
                code: issue.code.clone(),
                message: issue.message.clone(),
                recommendation: issue.recommendation.clone(),
            })
            .collect();

        Self {
            app_name: config.app_name.clone(),
            environment: config.environment.to_string(),
            project_id: if config.project_id.trim().is_empty() {
                "(not set)".to_string()
            } else {
                config.project_id.clone()
            },
            region: format!("{} ({})", config.region, config.zone),
            database: format!(
                "{} {}, {}, {} GB",
                config.db_version,
                config.db_tier,
                tier_description(&config.db_tier),
                config.db_disk_size_gb
            ),
            compute: format!(
                "{} vCPU, {}, {} to {} instances",
                config.cpu,
                config.memory_limit(),
                config.min_instances,
                config.max_instances
            ),
            network: format!(
                "private network {}, WAF {}, CDN {}, Secret Manager {}, TLS {}",
                on_off(config.use_private_network),
                on_off(config.enable_waf),
                on_off(config.enable_cdn),
                on_off(config.enable_secret_manager),
                config.tls_policy
            ),
            domain: config.custom_domain().unwrap_or("(run.app URL)").to_string(),
            currency: cost.currency.clone(),
            costs: cost
                .components()
                .map(|(label, amount)| CostLine {
                    label: label.to_string(),
                    amount: format!("{amount:.2}"),
                })
                .collect(),
            total: format!("{:.2}", cost.total),
            score: security.score,
            findings,
            passed: security.passed.len(),
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

#[derive(Template)]
#[template(path = "review/summary.md")]
struct ReviewTemplate<'a> {
    view: &'a ReviewView,
}

pub fn render_markdown(view: &ReviewView) -> miette::Result<String> {
    ReviewTemplate { view }
        .render()
        .map_err(|e| miette::miette!("failed to render review: {e}"))
}

pub fn print(view: &ReviewView) -> miette::Result<()> {
    let markdown = render_markdown(view)?;
    let skin = MadSkin::default();
    skin.print_text(&markdown);
    Ok(())
}
