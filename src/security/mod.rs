//! Security review of a deployment configuration and of the generated
//! artifacts. Every check is a pure function producing exactly one [`Issue`].

use std::fmt::Display;

use serde::{Deserialize, Serialize};

pub mod rules;
pub mod scanner;

pub use rules::{CONFIGURATION_RULE_COUNT, check_configuration};
pub use scanner::{SCANNED_ARTIFACTS, ScanKind, check_artifacts, scan_artifacts, scan_generated_file};

const ERROR_WEIGHT: usize = 20;
const WARNING_WEIGHT: usize = 5;

/// Ordered from least to most severe, so `Severity::Critical` is the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
            Severity::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    /// Empty only for purely positive findings.
    pub recommendation: String,
}

impl Issue {
    pub fn new(
        severity: Severity,
        code: &str,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code: code.to_string(),
            message: message.into(),
            recommendation: recommendation.into(),
        }
    }

    /// A positive finding, carrying no recommendation.
    pub fn pass(code: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, message, "")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityReport {
    pub passed: Vec<Issue>,
    pub warnings: Vec<Issue>,
    pub errors: Vec<Issue>,
    pub score: u8,
}

impl SecurityReport {
    /// Partitions issues by severity and scores them against `rule_count`.
    pub fn from_issues(issues: Vec<Issue>, rule_count: usize) -> Self {
        let mut report = SecurityReport::default();

        for issue in issues {
            match issue.severity {
                Severity::Critical | Severity::High => report.errors.push(issue),
                Severity::Medium => report.warnings.push(issue),
                Severity::Low | Severity::Info => report.passed.push(issue),
            }
        }

        report.score = score(report.errors.len(), report.warnings.len(), rule_count);
        report
    }

    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .chain(self.passed.iter())
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

fn score(errors: usize, warnings: usize, rule_count: usize) -> u8 {
    if rule_count == 0 {
        return 100;
    }

    let penalty =
        (errors * ERROR_WEIGHT + warnings * WARNING_WEIGHT) as f64 / rule_count as f64 * 10.0;

    (100.0 - penalty).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::Low > Severity::Info);
    }

    #[test]
    fn test_partitioning() {
        let report = SecurityReport::from_issues(
            vec![
                Issue::new(Severity::Critical, "A", "a", "fix a"),
                Issue::new(Severity::High, "B", "b", "fix b"),
                Issue::new(Severity::Medium, "C", "c", "fix c"),
                Issue::new(Severity::Low, "D", "d", "consider d"),
                Issue::pass("E", "e"),
            ],
            5,
        );

        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.passed.len(), 2);
        assert_eq!(report.issues().count(), 5);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_score_formula() {
        assert_eq!(score(0, 0, 6), 100);
        // 100 - 20 / 6 * 10 = 66.67
        assert_eq!(score(1, 0, 6), 67);
        // 100 - 5 / 6 * 10 = 91.67
        assert_eq!(score(0, 1, 6), 92);
        // 100 - 30 / 6 * 10 = 50
        assert_eq!(score(1, 2, 6), 50);
        assert_eq!(score(6, 0, 6), 0);
        assert_eq!(score(0, 0, 0), 100);
    }
}
