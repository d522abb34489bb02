//! Text scanners over generated artifacts. Each check contributes exactly one
//! issue, positive or not; scanning never stops early.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Issue, SecurityReport, Severity};
use crate::generator::{ArtifactKey, GeneratedArtifactSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanKind {
    Container,
    Infrastructure,
}

static RE_ROOT_USER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^\s*USER\s+(?:root|0)(?::\S*)?\s*$").unwrap());

static RE_ANY_USER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?mi)^\s*USER\s+\S+").unwrap());

static RE_SECRET_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?mi)^\s*(?:ARG|ENV)\s+.*(?:password|passwd|secret|api[_-]?key|token|private[_-]?key|access[_-]?key)",
    )
    .unwrap()
});

static RE_LATEST_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^\s*FROM\s+(?:--platform=\S+\s+)?\S+:latest(?:\s|$)").unwrap()
});

const PUBLIC_IP_MARKERS: &[&str] = &["ipv4_enabled = true", "ipv4_enabled=true"];
const TLS_REQUIRED_MARKER: &str = "require_ssl = true";
const TLS_MODE_MARKER: &str = "ssl_mode";

const OPEN_RANGE: &str = "0.0.0.0/0";

/// A range attribute and its value up to the end of a bracketed list, which
/// may span several lines, or to the end of the line.
static RE_RANGE_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^\s*(?:source_ranges|destination_ranges|src_ip_ranges|cidr_blocks|cidr_ranges|cidr_block)\s*=\s*(\[[^\]]*\]|.*)",
    )
    .unwrap()
});

/// Body of a Cloud SQL `authorized_networks` block.
static RE_AUTHORIZED_NETWORK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*authorized_networks\s*\{([^}]*)\}").unwrap());

static RE_NETWORK_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bvalue\s*=\s*"0\.0\.0\.0/0""#).unwrap());

fn admits_every_address(text: &str) -> bool {
    let open_attribute = RE_RANGE_ATTRIBUTE
        .captures_iter(text)
        .any(|caps| caps[1].contains(OPEN_RANGE));

    let open_network = RE_AUTHORIZED_NETWORK
        .captures_iter(text)
        .any(|caps| RE_NETWORK_VALUE.is_match(&caps[1]));

    open_attribute || open_network
}

fn container_user(text: &str) -> Issue {
    if RE_ROOT_USER.is_match(text) {
        Issue::new(
            Severity::High,
            "CONTAINER_ROOT_USER",
            "Container explicitly runs as root",
            "Switch to an unprivileged user with a `USER` directive",
        )
    } else if !RE_ANY_USER.is_match(text) {
        Issue::new(
            Severity::High,
            "CONTAINER_NO_USER",
            "Container has no USER directive and defaults to root",
            "Add a `USER` directive for an unprivileged account in the final stage",
        )
    } else {
        Issue::pass("CONTAINER_NON_ROOT", "Container runs as a non-root user")
    }
}

fn container_secrets(text: &str) -> Issue {
    if RE_SECRET_DECLARATION.is_match(text) {
        Issue::new(
            Severity::Critical,
            "CONTAINER_SECRET_EXPOSED",
            "A credential appears in an ARG or ENV declaration and is baked into the image layers",
            "Inject secrets at runtime from Secret Manager instead of the build",
        )
    } else {
        Issue::pass(
            "CONTAINER_NO_SECRETS",
            "No credentials in ARG or ENV declarations",
        )
    }
}

fn container_base_image(text: &str) -> Issue {
    if RE_LATEST_TAG.is_match(text) {
        Issue::new(
            Severity::Medium,
            "CONTAINER_LATEST_TAG",
            "Base image uses the unpinned `latest` tag",
            "Pin base images to an explicit version tag or digest",
        )
    } else {
        Issue::pass("CONTAINER_PINNED_IMAGE", "Base images are pinned")
    }
}

fn database_public_ip(text: &str) -> Issue {
    if PUBLIC_IP_MARKERS.iter().any(|marker| text.contains(marker)) {
        Issue::new(
            Severity::High,
            "DATABASE_PUBLIC_IP",
            "Cloud SQL instance has a public IPv4 address",
            "Enable the private network and set `ipv4_enabled = false`",
        )
    } else {
        Issue::pass("DATABASE_PRIVATE_IP", "Cloud SQL instance has no public address")
    }
}

fn database_tls(text: &str) -> Issue {
    if text.contains(TLS_REQUIRED_MARKER) || text.contains(TLS_MODE_MARKER) {
        Issue::pass("DATABASE_TLS_ENFORCED", "Database connections require TLS")
    } else {
        Issue::new(
            Severity::Medium,
            "DATABASE_TLS_NOT_ENFORCED",
            "Database does not require encrypted connections",
            "Set `ssl_mode = \"ENCRYPTED_ONLY\"` in the instance ip_configuration",
        )
    }
}

fn open_network_range(text: &str) -> Issue {
    if admits_every_address(text) {
        Issue::new(
            Severity::High,
            "NETWORK_OPEN_RANGE",
            "A traffic rule admits 0.0.0.0/0",
            "Restrict source ranges to the addresses that actually need access",
        )
    } else {
        Issue::pass("NETWORK_RANGES_RESTRICTED", "No traffic rule admits every address")
    }
}

pub fn scan_generated_file(kind: ScanKind, text: &str) -> Vec<Issue> {
    match kind {
        ScanKind::Container => vec![
            container_user(text),
            container_secrets(text),
            container_base_image(text),
        ],
        ScanKind::Infrastructure => vec![
            database_public_ip(text),
            database_tls(text),
            open_network_range(text),
        ],
    }
}

/// The artifacts that get scanned, paired with the scanner for each.
pub const SCANNED_ARTIFACTS: [(ArtifactKey, ScanKind); 2] = [
    (ArtifactKey::Dockerfile, ScanKind::Container),
    (ArtifactKey::MainTf, ScanKind::Infrastructure),
];

/// Scores the combined findings over the texts of [`SCANNED_ARTIFACTS`],
/// looked up through `text`.
pub fn scan_artifacts<'a, F>(mut text: F) -> SecurityReport
where
    F: FnMut(ArtifactKey) -> &'a str,
{
    let issues: Vec<Issue> = SCANNED_ARTIFACTS
        .iter()
        .flat_map(|&(key, kind)| scan_generated_file(kind, text(key)))
        .collect();

    let rule_count = issues.len();
    SecurityReport::from_issues(issues, rule_count)
}

/// Scans the container file and the primary infrastructure file of a
/// generated set and scores the combined findings.
pub fn check_artifacts(artifacts: &GeneratedArtifactSet) -> SecurityReport {
    scan_artifacts(|key| artifacts.get(key))
}
