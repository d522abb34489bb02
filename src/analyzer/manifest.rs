//! Best-effort fact extraction from a `mix.exs` manifest.
//!
//! Limitations:
//! - Dependency presence is a substring test on `:<name>`, so a dependency whose
//!   name is a prefix of another (e.g. `:phoenix` and `:phoenix_live_view`) is
//!   reported as present whenever the longer one is declared.
//! - Versions are taken from the first quoted requirement and stripped of their
//!   operator (`"~> 1.7.0"` becomes `1.7.0`).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const MANIFEST_PATH: &str = "mix.exs";

pub const FRAMEWORK: &str = "phoenix";
pub const FRAMEWORK_MODULE: &str = "phoenix_live_view";

const WORKSPACE_MARKERS: &[&str] = &["apps_path:", "in_umbrella:"];

static RE_APP_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"app:\s*:([A-Za-z_][A-Za-z0-9_]*)").unwrap());

static RE_RUNTIME_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"elixir:\s*"[~>=<\s]*(\d+(?:\.\d+)*)""#).unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyFlags {
    pub phoenix: bool,
    pub phoenix_live_view: bool,
    pub ecto_sql: bool,
    pub postgrex: bool,
    pub oban: bool,
    pub swoosh: bool,
    pub tailwind: bool,
    pub esbuild: bool,
}

impl DependencyFlags {
    fn detect(text: &str) -> Self {
        Self {
            phoenix: has_dependency(text, "phoenix"),
            phoenix_live_view: has_dependency(text, "phoenix_live_view"),
            ecto_sql: has_dependency(text, "ecto_sql"),
            postgrex: has_dependency(text, "postgrex"),
            oban: has_dependency(text, "oban"),
            swoosh: has_dependency(text, "swoosh"),
            tailwind: has_dependency(text, "tailwind"),
            esbuild: has_dependency(text, "esbuild"),
        }
    }

    pub fn has_assets(&self) -> bool {
        self.tailwind || self.esbuild
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFacts {
    pub app_name: Option<String>,
    pub elixir_version: Option<String>,
    pub phoenix_version: Option<String>,
    pub live_view_version: Option<String>,
    pub dependencies: DependencyFlags,
}

fn has_dependency(text: &str, name: &str) -> bool {
    text.contains(&format!(":{name}"))
}

fn dependency_pattern(name: &str) -> Regex {
    let pattern = format!(
        r#"\{{\s*:{}\s*,\s*"[~>=<\s]*(\d[0-9A-Za-z.\-]*)""#,
        regex::escape(name)
    );

    Regex::new(&pattern).unwrap()
}

static RE_FRAMEWORK_VERSION: Lazy<Regex> = Lazy::new(|| dependency_pattern(FRAMEWORK));

static RE_FRAMEWORK_MODULE_VERSION: Lazy<Regex> =
    Lazy::new(|| dependency_pattern(FRAMEWORK_MODULE));

fn capture(regex: &Regex, text: &str) -> Option<String> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn parse_manifest(text: &str) -> ManifestFacts {
    ManifestFacts {
        app_name: capture(&RE_APP_NAME, text),
        elixir_version: capture(&RE_RUNTIME_VERSION, text),
        phoenix_version: capture(&RE_FRAMEWORK_VERSION, text),
        live_view_version: capture(&RE_FRAMEWORK_MODULE_VERSION, text),
        dependencies: DependencyFlags::detect(text),
    }
}

pub fn is_workspace(text: &str) -> bool {
    WORKSPACE_MARKERS.iter().any(|marker| text.contains(marker))
}
