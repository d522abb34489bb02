use std::collections::BTreeMap;

use tracing::debug;

use super::{DeploymentConfiguration, UpdateError};

/// A partial, form-shaped update: field name to raw submitted value.
pub type ConfigUpdate = BTreeMap<String, String>;

const TRUTHY: &str = "true";

fn parse_boolean(value: &str) -> bool {
    value.trim() == TRUTHY
}

fn parse_integer(field: &str, value: &str) -> Result<u32, UpdateError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|source| UpdateError::InvalidInteger {
            field: field.to_string(),
            value: value.to_string(),
            source,
        })
}

fn is_safe_text(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

/// Free-text values end up inside generated string literals, so they are
/// limited to identifier-like characters.
fn check_text(field: &str, value: &str) -> Result<(), UpdateError> {
    if is_safe_text(value) {
        Ok(())
    } else {
        Err(UpdateError::UnsafeValue {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

fn parse_text(field: &str, value: &str) -> Result<String, UpdateError> {
    let value = value.trim();
    check_text(field, value)?;
    Ok(value.to_string())
}

impl DeploymentConfiguration {
    fn apply_field(&mut self, field: &str, value: &str) -> Result<(), UpdateError> {
        match field {
            "app_name" => self.app_name = parse_text(field, value)?,
            "environment" => self.environment = value.parse()?,
            "project_id" => self.project_id = parse_text(field, value)?,
            "region" => self.region = parse_text(field, value)?,
            "zone" => self.zone = parse_text(field, value)?,
            "db_tier" => self.db_tier = parse_text(field, value)?,
            "db_version" => self.db_version = parse_text(field, value)?,
            "db_disk_size_gb" => self.db_disk_size_gb = parse_integer(field, value)?,
            "min_instances" => self.min_instances = parse_integer(field, value)?,
            "max_instances" => self.max_instances = parse_integer(field, value)?,
            "memory_mb" => self.memory_mb = parse_integer(field, value)?,
            "cpu" => self.cpu = parse_integer(field, value)?,
            "use_private_network" => self.use_private_network = parse_boolean(value),
            "enable_cdn" => self.enable_cdn = parse_boolean(value),
            "enable_waf" => self.enable_waf = parse_boolean(value),
            "enable_secret_manager" => self.enable_secret_manager = parse_boolean(value),
            "tls_policy" => self.tls_policy = parse_text(field, value)?,
            "custom_domain" => {
                let domain = parse_text(field, value)?;
                self.custom_domain = (!domain.is_empty()).then_some(domain);
            }
            other => debug!(field = other, "ignoring unknown configuration field"),
        }

        Ok(())
    }

    /// Checks the free-text fields of a configuration that did not come
    /// through [`merge`](Self::merge), such as one read from `deploy.toml`.
    pub fn validate(&self) -> Result<(), UpdateError> {
        let fields = [
            ("app_name", self.app_name.as_str()),
            ("project_id", self.project_id.as_str()),
            ("region", self.region.as_str()),
            ("zone", self.zone.as_str()),
            ("db_tier", self.db_tier.as_str()),
            ("db_version", self.db_version.as_str()),
            ("tls_policy", self.tls_policy.as_str()),
            ("custom_domain", self.custom_domain.as_deref().unwrap_or_default()),
        ];

        for (field, value) in fields {
            check_text(field, value.trim())?;
        }

        Ok(())
    }

    /// Applies every field of `update` or none of them.
    pub fn merge(&mut self, update: &ConfigUpdate) -> Result<(), UpdateError> {
        let mut draft = self.clone();

        for (field, value) in update {
            draft.apply_field(field, value)?;
        }

        *self = draft;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    fn update(pairs: &[(&str, &str)]) -> ConfigUpdate {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_merge_applies_typed_fields() {
        let mut config = DeploymentConfiguration::default();

        config
            .merge(&update(&[
                ("environment", "staging"),
                ("min_instances", "2"),
                ("enable_waf", "true"),
                ("enable_cdn", "on"),
                ("custom_domain", " app.example.com "),
            ]))
            .unwrap();

        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.min_instances, 2);
        assert!(config.enable_waf);
        assert!(!config.enable_cdn, "only the literal `true` token is truthy");
        assert_eq!(config.custom_domain(), Some("app.example.com"));
    }

    #[test]
    fn test_merge_is_all_or_nothing() {
        let mut config = DeploymentConfiguration::default();
        let before = config.clone();

        let result = config.merge(&update(&[
            ("project_id", "acme-prod"),
            ("max_instances", "ten"),
        ]));

        assert!(matches!(result, Err(UpdateError::InvalidInteger { .. })));
        assert_eq!(config, before);
    }

    #[test]
    fn test_merge_rejects_negative_and_unknown_environment() {
        let mut config = DeploymentConfiguration::default();

        assert!(config.merge(&update(&[("cpu", "-1")])).is_err());
        assert!(config.merge(&update(&[("environment", "qa")])).is_err());
        assert_eq!(config, DeploymentConfiguration::default());
    }

    #[test]
    fn test_merge_ignores_unknown_fields() {
        let mut config = DeploymentConfiguration::default();
        config
            .merge(&update(&[("_csrf_token", "abc"), ("region", "europe-west1")]))
            .unwrap();

        assert_eq!(config.region, "europe-west1");
    }

    #[test]
    fn test_merge_rejects_values_that_break_out_of_literals() {
        let mut config = DeploymentConfiguration::default();
        let before = config.clone();

        let result = config.merge(&update(&[
            ("region", "europe-west1"),
            (
                "custom_domain",
                "shop.example.com\"\n}\nresource \"google_compute_firewall\" \"open\" {}",
            ),
        ]));

        assert!(matches!(
            result,
            Err(UpdateError::UnsafeValue { ref field, .. }) if field == "custom_domain"
        ));
        assert_eq!(config, before);

        for hostile in ["acme\nprod", "acme-${var.x}", "acme prod", "%{if true}x%{endif}"] {
            assert!(config.merge(&update(&[("project_id", hostile)])).is_err(), "{hostile}");
        }
    }

    #[test]
    fn test_validate_checks_every_text_field() {
        assert!(DeploymentConfiguration::default().validate().is_ok());

        let config = DeploymentConfiguration {
            db_version: "POSTGRES_16\"".into(),
            ..Default::default()
        };

        assert!(matches!(
            config.validate(),
            Err(UpdateError::UnsafeValue { ref field, .. }) if field == "db_version"
        ));
    }

    #[test]
    fn test_blank_custom_domain_clears_it() {
        let mut config = DeploymentConfiguration {
            custom_domain: Some("old.example.com".into()),
            ..Default::default()
        };

        config.merge(&update(&[("custom_domain", "  ")])).unwrap();

        assert_eq!(config.custom_domain, None);
    }
}
