//! Static Google Cloud price table used by the cost estimator (USD).

pub mod estimator;

pub use estimator::{CostBreakdown, CostEstimator, estimate, tier_description};

pub const HOURS_PER_MONTH: f64 = 730.0;
pub const SECONDS_PER_MONTH: f64 = HOURS_PER_MONTH * 3600.0;

/// Machine class for the managed database service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatabaseTier {
    pub name: &'static str,
    /// `None` for shared-core tiers.
    pub vcpu: Option<u32>,
    pub ram_gb: f64,
    pub hourly: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputePricing {
    pub min_instance_vcpu_hour: f64,
    pub min_instance_gib_hour: f64,
    pub vcpu_second: f64,
    pub gib_second: f64,
    pub per_million_requests: f64,
    pub default_utilization: f64,
    pub default_monthly_requests: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoragePricing {
    pub tiers: &'static [DatabaseTier],
    pub ssd_gb_month: f64,
    pub backup_gb_month: f64,
    pub backup_fraction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WafPricing {
    pub policy_month: f64,
    pub per_million_requests: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CdnPricing {
    pub egress_gb: f64,
    pub egress_per_gb: f64,
    pub cache_fill_gb: f64,
    pub cache_fill_per_gb: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecretStorePricing {
    pub active_secrets: f64,
    pub per_secret_month: f64,
    pub monthly_accesses: f64,
    pub per_10k_accesses: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingModel {
    pub currency: &'static str,
    pub compute: ComputePricing,
    pub storage: StoragePricing,
    pub waf: WafPricing,
    pub cdn: CdnPricing,
    pub secrets: SecretStorePricing,
}

pub const DATABASE_TIERS: &[DatabaseTier] = &[
    DatabaseTier {
        name: "db-f1-micro",
        vcpu: None,
        ram_gb: 0.6,
        hourly: 0.0105,
    },
    DatabaseTier {
        name: "db-g1-small",
        vcpu: None,
        ram_gb: 1.7,
        hourly: 0.035,
    },
    DatabaseTier {
        name: "db-custom-1-3840",
        vcpu: Some(1),
        ram_gb: 3.75,
        hourly: 0.0655,
    },
    DatabaseTier {
        name: "db-custom-2-7680",
        vcpu: Some(2),
        ram_gb: 7.5,
        hourly: 0.131,
    },
    DatabaseTier {
        name: "db-custom-4-15360",
        vcpu: Some(4),
        ram_gb: 15.0,
        hourly: 0.262,
    },
    DatabaseTier {
        name: "db-custom-8-30720",
        vcpu: Some(8),
        ram_gb: 30.0,
        hourly: 0.524,
    },
];

pub const GCP_PRICING: PricingModel = PricingModel {
    currency: "USD",
    compute: ComputePricing {
        min_instance_vcpu_hour: 0.0648,
        min_instance_gib_hour: 0.0072,
        vcpu_second: 0.000024,
        gib_second: 0.0000025,
        per_million_requests: 0.40,
        default_utilization: 0.10,
        default_monthly_requests: 1_000_000.0,
    },
    storage: StoragePricing {
        tiers: DATABASE_TIERS,
        ssd_gb_month: 0.17,
        backup_gb_month: 0.08,
        backup_fraction: 0.25,
    },
    waf: WafPricing {
        policy_month: 5.0,
        per_million_requests: 0.75,
    },
    cdn: CdnPricing {
        egress_gb: 100.0,
        egress_per_gb: 0.08,
        cache_fill_gb: 20.0,
        cache_fill_per_gb: 0.04,
    },
    secrets: SecretStorePricing {
        active_secrets: 5.0,
        per_secret_month: 0.06,
        monthly_accesses: 100_000.0,
        per_10k_accesses: 0.03,
    },
};

impl PricingModel {
    pub fn tier(&self, name: &str) -> Option<&DatabaseTier> {
        self.storage.tiers.iter().find(|tier| tier.name == name)
    }

    pub fn tier_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.storage.tiers.iter().map(|tier| tier.name)
    }
}
