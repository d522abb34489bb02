use serde::{Deserialize, Serialize};

use super::{GCP_PRICING, HOURS_PER_MONTH, PricingModel, SECONDS_PER_MONTH};
use crate::config::DeploymentConfiguration;

/// Monthly cost estimate. Every amount is rounded to cents; `total` is the
/// rounded sum of the rounded components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub cloud_run: f64,
    pub cloud_sql: f64,
    pub cloud_armor: f64,
    pub cloud_cdn: f64,
    pub secret_manager: f64,
    pub total: f64,
    pub currency: String,
}

impl CostBreakdown {
    pub fn components(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("Cloud Run", self.cloud_run),
            ("Cloud SQL", self.cloud_sql),
            ("Cloud Armor", self.cloud_armor),
            ("Cloud CDN", self.cloud_cdn),
            ("Secret Manager", self.secret_manager),
        ]
        .into_iter()
    }
}

pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy)]
pub struct CostEstimator {
    model: PricingModel,
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self::new(GCP_PRICING)
    }
}

impl CostEstimator {
    pub fn new(model: PricingModel) -> Self {
        Self { model }
    }

    fn cloud_run(&self, config: &DeploymentConfiguration) -> f64 {
        let pricing = &self.model.compute;
        let cpu = config.cpu as f64;
        let memory = config.memory_gib();
        let min_instances = config.min_instances as f64;

        let always_on = min_instances * cpu * HOURS_PER_MONTH * pricing.min_instance_vcpu_hour
            + min_instances * memory * HOURS_PER_MONTH * pricing.min_instance_gib_hour;

        let active_seconds = SECONDS_PER_MONTH * pricing.default_utilization;
        let active = active_seconds * cpu * pricing.vcpu_second
            + active_seconds * memory * pricing.gib_second;

        let requests =
            pricing.default_monthly_requests / 1_000_000.0 * pricing.per_million_requests;

        always_on + active + requests
    }

    fn cloud_sql(&self, config: &DeploymentConfiguration) -> f64 {
        let pricing = &self.model.storage;
        let disk = config.db_disk_size_gb as f64;

        let instance = self
            .model
            .tier(&config.db_tier)
            .map(|tier| tier.hourly * HOURS_PER_MONTH)
            .unwrap_or(0.0);

        let storage = disk * pricing.ssd_gb_month;
        let backups = disk * pricing.backup_fraction * pricing.backup_gb_month;

        instance + storage + backups
    }

    fn cloud_armor(&self, config: &DeploymentConfiguration) -> f64 {
        if !config.enable_waf {
            return 0.0;
        }

        let pricing = &self.model.waf;
        let requests = self.model.compute.default_monthly_requests / 1_000_000.0;

        pricing.policy_month + requests * pricing.per_million_requests
    }

    fn cloud_cdn(&self, config: &DeploymentConfiguration) -> f64 {
        if !config.enable_cdn {
            return 0.0;
        }

        let pricing = &self.model.cdn;

        pricing.egress_gb * pricing.egress_per_gb + pricing.cache_fill_gb * pricing.cache_fill_per_gb
    }

    fn secret_manager(&self, config: &DeploymentConfiguration) -> f64 {
        if !config.enable_secret_manager {
            return 0.0;
        }

        let pricing = &self.model.secrets;

        pricing.active_secrets * pricing.per_secret_month
            + pricing.monthly_accesses / 10_000.0 * pricing.per_10k_accesses
    }

    pub fn estimate(&self, config: &DeploymentConfiguration) -> CostBreakdown {
        let cloud_run = round_cents(self.cloud_run(config));
        let cloud_sql = round_cents(self.cloud_sql(config));
        let cloud_armor = round_cents(self.cloud_armor(config));
        let cloud_cdn = round_cents(self.cloud_cdn(config));
        let secret_manager = round_cents(self.secret_manager(config));

        let total = round_cents(cloud_run + cloud_sql + cloud_armor + cloud_cdn + secret_manager);

        CostBreakdown {
            cloud_run,
            cloud_sql,
            cloud_armor,
            cloud_cdn,
            secret_manager,
            total,
            currency: self.model.currency.to_string(),
        }
    }

    pub fn tier_description(&self, tier_name: &str) -> String {
        match self.model.tier(tier_name) {
            Some(tier) => match tier.vcpu {
                Some(vcpu) => format!("{} vCPU, {} GB RAM", vcpu, tier.ram_gb),
                None => format!("Shared vCPU, {} GB RAM", tier.ram_gb),
            },
            None => tier_name.to_string(),
        }
    }
}

pub fn estimate(config: &DeploymentConfiguration) -> CostBreakdown {
    CostEstimator::default().estimate(config)
}

pub fn tier_description(tier_name: &str) -> String {
    CostEstimator::default().tier_description(tier_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_amount(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn baseline() -> DeploymentConfiguration {
        DeploymentConfiguration {
            db_tier: "db-g1-small".into(),
            enable_secret_manager: true,
            enable_waf: false,
            enable_cdn: false,
            ..Default::default()
        }
    }

    fn variants() -> Vec<DeploymentConfiguration> {
        let mut configs = Vec::new();

        for tier in ["db-f1-micro", "db-custom-2-7680", "db-unknown"] {
            for min_instances in [0, 1, 3] {
                for (cpu, memory_mb) in [(1, 512), (2, 2048), (4, 8192)] {
                    for disk in [10, 100] {
                        configs.push(DeploymentConfiguration {
                            db_tier: tier.into(),
                            min_instances,
                            cpu,
                            memory_mb,
                            db_disk_size_gb: disk,
                            enable_waf: false,
                            enable_cdn: false,
                            enable_secret_manager: false,
                            ..Default::default()
                        });
                    }
                }
            }
        }

        configs
    }

    #[test]
    fn test_estimate_baseline() {
        let cost = estimate(&baseline());

        // 262_800 active seconds: 6.3072 vCPU + 0.3285 memory + 0.40 requests
        assert_amount(cost.cloud_run, 7.04);
        // 25.55 instance + 1.70 storage + 0.20 backups
        assert_amount(cost.cloud_sql, 27.45);
        assert_amount(cost.cloud_armor, 0.0);
        assert_amount(cost.cloud_cdn, 0.0);
        assert_amount(cost.secret_manager, 0.60);
        assert_amount(cost.total, 35.09);
        assert_eq!(cost.currency, "USD");
    }

    #[test]
    fn test_minimum_instances_are_billed_all_month() {
        let config = DeploymentConfiguration {
            min_instances: 1,
            ..baseline()
        };

        // 47.304 vCPU + 2.628 memory on top of the 7.0357 active charge
        assert_amount(estimate(&config).cloud_run, 56.97);
    }

    #[test]
    fn test_optional_components() {
        let config = DeploymentConfiguration {
            enable_waf: true,
            enable_cdn: true,
            ..baseline()
        };

        let cost = estimate(&config);
        assert_amount(cost.cloud_armor, 5.75);
        assert_amount(cost.cloud_cdn, 8.80);
        assert_amount(cost.total, 49.64);
    }

    #[test]
    fn test_unknown_tier_only_bills_storage() {
        let config = DeploymentConfiguration {
            db_tier: "db-perf-optimized-N-2".into(),
            ..baseline()
        };

        assert_amount(estimate(&config).cloud_sql, 1.90);
    }

    #[test]
    fn test_total_is_rounded_sum_of_components() {
        for config in variants() {
            let cost = estimate(&config);
            let sum: f64 = cost.components().map(|(_, amount)| amount).sum();

            assert_eq!(cost.total, round_cents(sum));
            assert!(cost.components().all(|(_, amount)| amount >= 0.0));
            assert!(cost.total >= 0.0);
        }
    }

    #[test]
    fn test_optional_features_never_lower_the_total() {
        type Toggle = fn(&mut DeploymentConfiguration);
        let toggles: [Toggle; 3] = [
            |c| c.enable_waf = true,
            |c| c.enable_cdn = true,
            |c| c.enable_secret_manager = true,
        ];

        for config in variants() {
            let off = estimate(&config).total;

            for toggle in toggles {
                let mut on = config.clone();
                toggle(&mut on);
                assert!(estimate(&on).total >= off);
            }
        }
    }

    #[test]
    fn test_tier_description() {
        assert_eq!(tier_description("db-custom-2-7680"), "2 vCPU, 7.5 GB RAM");
        assert_eq!(tier_description("db-custom-4-15360"), "4 vCPU, 15 GB RAM");
        assert_eq!(tier_description("db-f1-micro"), "Shared vCPU, 0.6 GB RAM");
        assert_eq!(tier_description("db-unknown"), "db-unknown");
    }
}
