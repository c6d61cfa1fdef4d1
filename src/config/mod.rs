//! Configuration management for `ci_flakes`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`CI_FLAKES_*`)
//! 3. Config file (`--config`, else `./.ci-flakes.yaml`)
//! 4. Defaults
//!
//! Every source is flattened into a string [`ConfigLayer`]; the merged
//! layer is then validated once into a typed [`ReportConfig`].

use crate::error::{CiFlakesError, Result};
use crate::fetch::DashboardQuery;
use crate::report::SummaryOptions;
use crate::util::parse_window;
use chrono::Duration;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;
use tracing::debug;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = ".ci-flakes.yaml";

/// Prefix of recognised environment variables.
const ENV_PREFIX: &str = "CI_FLAKES_";

/// Keys understood by [`ReportConfig::from_layer`].
pub const KNOWN_KEYS: &[&str] = &[
    "url",
    "filter",
    "filter-prop",
    "fail-list",
    "target",
    "window",
    "top",
    "output-dir",
    "timeout",
];

const DEFAULT_URL: &str = "http://ci.aztec-labs.com/";
const DEFAULT_FILTER: &str = "^next";
const DEFAULT_FILTER_PROP: &str = "name";
const DEFAULT_FAIL_LIST: &str = "failed_tests_next";
const DEFAULT_TARGET: &str = "next";
const DEFAULT_OUTPUT_DIR: &str = ".";

/// A flat layer of configuration values keyed by normalized name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Set a value, normalizing the key (`filter_prop` == `filter-prop`).
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(normalize_key(key), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_key(key)).map(String::as_str)
    }

    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from `CI_FLAKES_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    /// Build a layer from arbitrary `(name, value)` pairs, keeping only
    /// `CI_FLAKES_*` names.
    #[must_use]
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layer.set(stripped, value);
            }
        }
        layer
    }
}

/// Values supplied on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub url: Option<String>,
    pub filter: Option<String>,
    pub filter_prop: Option<String>,
    pub fail_list: Option<String>,
    pub target: Option<String>,
    pub window: Option<String>,
    pub top: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub timeout: Option<u64>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();
        let strings = [
            ("url", &self.url),
            ("filter", &self.filter),
            ("filter-prop", &self.filter_prop),
            ("fail-list", &self.fail_list),
            ("target", &self.target),
            ("window", &self.window),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                layer.set(key, value.clone());
            }
        }
        if let Some(top) = self.top {
            layer.set("top", top.to_string());
        }
        if let Some(dir) = &self.output_dir {
            layer.set("output-dir", dir.display().to_string());
        }
        if let Some(timeout) = self.timeout {
            layer.set("timeout", timeout.to_string());
        }
        layer
    }
}

/// Fully validated settings for one report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub url: String,
    pub query: DashboardQuery,
    /// Target environment; selects lines ending in `(target: <target>)`.
    pub target: String,
    pub window: Duration,
    pub top: usize,
    pub output_dir: PathBuf,
    /// HTTP timeout; `None` waits indefinitely.
    pub timeout: Option<StdDuration>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            query: DashboardQuery {
                filter: DEFAULT_FILTER.to_string(),
                filter_prop: DEFAULT_FILTER_PROP.to_string(),
                fail_list: DEFAULT_FAIL_LIST.to_string(),
            },
            target: DEFAULT_TARGET.to_string(),
            window: SummaryOptions::default().window,
            top: SummaryOptions::default().top,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            timeout: None,
        }
    }
}

impl ReportConfig {
    /// Validate a merged layer into typed settings.
    ///
    /// # Errors
    ///
    /// Returns a config error for unknown keys and a validation error for
    /// values that do not parse.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        let mut unknown: Vec<&str> = layer
            .values
            .keys()
            .map(String::as_str)
            .filter(|key| !KNOWN_KEYS.contains(key))
            .collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            return Err(CiFlakesError::Config(format!(
                "unknown key(s): {}",
                unknown.join(", ")
            )));
        }

        let text = |key: &str, fallback: &str| -> Result<String> {
            let value = layer.get(key).unwrap_or(fallback).trim().to_string();
            if value.is_empty() {
                return Err(CiFlakesError::validation(key, "must not be empty"));
            }
            Ok(value)
        };

        let defaults = SummaryOptions::default();

        let window = layer
            .get("window")
            .map_or(Ok(defaults.window), |text| parse_window(text, "window"))?;

        let top = layer.get("top").map_or(Ok(defaults.top), |text| {
            let text = text.trim();
            text.parse::<usize>()
                .ok()
                .filter(|top| *top > 0)
                .ok_or_else(|| {
                    CiFlakesError::validation("top", format!("expected a positive integer, got '{text}'"))
                })
        })?;

        let timeout = layer
            .get("timeout")
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                value
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .map(StdDuration::from_secs)
                    .ok_or_else(|| {
                        CiFlakesError::validation(
                            "timeout",
                            format!("expected whole seconds, got '{value}'"),
                        )
                    })
            })
            .transpose()?;

        let config = Self {
            url: text("url", DEFAULT_URL)?,
            query: DashboardQuery {
                filter: text("filter", DEFAULT_FILTER)?,
                filter_prop: text("filter-prop", DEFAULT_FILTER_PROP)?,
                fail_list: text("fail-list", DEFAULT_FAIL_LIST)?,
            },
            target: text("target", DEFAULT_TARGET)?,
            window,
            top,
            output_dir: PathBuf::from(text("output-dir", DEFAULT_OUTPUT_DIR)?),
            timeout,
        };
        debug!(?config, "Resolved report configuration");
        Ok(config)
    }

    #[must_use]
    pub const fn summary_options(&self) -> SummaryOptions {
        SummaryOptions {
            window: self.window,
            top: self.top,
        }
    }
}

/// Load the config file layer: an explicit path must exist, the default
/// file is optional.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_file_config(explicit: Option<&Path>) -> Result<ConfigLayer> {
    match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(CiFlakesError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            ConfigLayer::from_yaml(path)
        }
        None => ConfigLayer::from_yaml(Path::new(DEFAULT_CONFIG_FILE)),
    }
}

/// Load configuration with the full precedence order.
///
/// # Errors
///
/// Returns an error if the config file is unreadable or a value is invalid.
pub fn load_config(config_path: Option<&Path>, cli: &CliOverrides) -> Result<ReportConfig> {
    let file_layer = load_file_config(config_path)?;
    let env_layer = ConfigLayer::from_env();
    let merged = ConfigLayer::merge_layers(&[file_layer, env_layer, cli.as_layer()]);
    ReportConfig::from_layer(&merged)
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    let mut flat = HashMap::new();
    flatten_yaml(value, "", &mut flat);

    for (key, value) in flat {
        layer.set(&key, value);
    }

    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
