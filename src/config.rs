use std::path::Path;

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::analysis::AnalysisConfig;
use crate::error::ConfigError;
use crate::model::{AnalysisRequest, Interval};

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_base_url() -> String {
    "https://query1.finance.yahoo.com".into()
}

fn default_requests_per_second() -> u32 {
    2
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_every_secs() -> u64 {
    900
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub pairs: Vec<PairConfig>,
    #[serde(default)]
    pub watch: WatchConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            requests_per_second: default_requests_per_second(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PairConfig {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_every_secs")]
    pub every_secs: u64,
    #[serde(default)]
    pub requests: Vec<WatchRequestConfig>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            every_secs: default_every_secs(),
            requests: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WatchRequestConfig {
    pub symbol: String,
    pub interval: String,
}

impl WatchConfig {
    /// Requests with valid intervals; `validate` has already rejected the rest.
    pub fn analysis_requests(&self) -> Vec<AnalysisRequest> {
        self.requests
            .iter()
            .filter_map(|r| {
                Interval::from_str(&r.interval).map(|interval| AnalysisRequest {
                    symbol: r.symbol.clone(),
                    interval,
                })
            })
            .collect()
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

const VALID_LOG_FORMATS: &[&str] = &["text", "json"];

pub fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_general(config)?;
    validate_analysis_windows(config)?;
    validate_provider(config)?;
    validate_pairs(config)?;
    validate_watch(config)?;
    Ok(())
}

fn validation(field: String) -> Report<ConfigError> {
    Report::new(ConfigError::Validation { field })
}

fn validate_general(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if !VALID_LOG_FORMATS.contains(&config.general.log_format.as_str()) {
        return Err(validation(format!(
            "general.log_format \"{}\" is not one of {VALID_LOG_FORMATS:?}",
            config.general.log_format
        )));
    }
    Ok(())
}

fn validate_analysis_windows(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let a = &config.analysis;
    let windows = [
        ("sma_short_window", a.sma_short_window),
        ("sma_long_window", a.sma_long_window),
        ("rsi_window", a.rsi_window),
        ("macd_fast", a.macd_fast),
        ("macd_slow", a.macd_slow),
        ("macd_signal", a.macd_signal),
    ];
    for (name, value) in windows {
        if value == 0 {
            return Err(validation(format!("analysis.{name} must be > 0")));
        }
    }
    Ok(())
}

fn validate_provider(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if config.provider.requests_per_second == 0 {
        return Err(validation("provider.requests_per_second must be > 0".into()));
    }
    if config.provider.timeout_secs == 0 {
        return Err(validation("provider.timeout_secs must be > 0".into()));
    }
    Ok(())
}

fn validate_pairs(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let mut seen = std::collections::HashSet::new();
    for pair in &config.pairs {
        if pair.code.trim().is_empty() {
            return Err(validation(format!(
                "pairs[name={}].code must not be empty",
                pair.name
            )));
        }
        if !seen.insert(pair.code.as_str()) {
            return Err(validation(format!("pairs: duplicate code \"{}\"", pair.code)));
        }
    }
    Ok(())
}

fn validate_watch(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if config.watch.every_secs == 0 {
        return Err(validation("watch.every_secs must be > 0".into()));
    }
    for request in &config.watch.requests {
        if Interval::from_str(&request.interval).is_none() {
            return Err(validation(format!(
                "watch.requests[symbol={}].interval: unknown interval \"{}\"",
                request.symbol, request.interval
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> AppConfig {
        toml::from_str(toml).expect("parse failed")
    }

    #[test]
    fn valid_full_config_parses() {
        let toml = r#"
[general]
log_level = "debug"
log_format = "json"

[analysis]
sma_short_window = 10
sma_long_window = 30

[provider]
base_url = "http://localhost:8080"
requests_per_second = 5
timeout_secs = 3

[[pairs]]
code = "EURUSD=X"
name = "EUR/USD"

[watch]
every_secs = 60

[[watch.requests]]
symbol = "EURUSD=X"
interval = "1h"
"#;
        let config = parse(toml);
        assert!(validate(&config).is_ok());
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.analysis.sma_short_window, 10);
        assert_eq!(config.analysis.rsi_window, 14);
        assert_eq!(config.provider.requests_per_second, 5);
        assert_eq!(config.pairs.len(), 1);
        assert_eq!(
            config.watch.analysis_requests(),
            vec![AnalysisRequest {
                symbol: "EURUSD=X".into(),
                interval: Interval::Hour1,
            }]
        );
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse("");
        assert!(validate(&config).is_ok());
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "text");
        assert_eq!(config.analysis, AnalysisConfig::default());
        assert_eq!(config.provider.base_url, "https://query1.finance.yahoo.com");
        assert_eq!(config.provider.requests_per_second, 2);
        assert_eq!(config.watch.every_secs, 900);
        assert!(config.pairs.is_empty());
        assert!(config.watch.requests.is_empty());
    }

    #[test]
    fn default_matches_empty_file() {
        let config = AppConfig::default();
        assert_eq!(config.general.log_format, "text");
        assert_eq!(config.provider.timeout_secs, 10);
        assert_eq!(config.watch.every_secs, 900);
    }

    #[test]
    fn zero_window_rejected() {
        let config = parse("[analysis]\nmacd_signal = 0\n");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn unknown_log_format_rejected() {
        let config = parse("[general]\nlog_format = \"xml\"\n");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_rate_rejected() {
        let config = parse("[provider]\nrequests_per_second = 0\n");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn duplicate_pair_codes_rejected() {
        let toml = r#"
[[pairs]]
code = "GC=F"
name = "Gold"

[[pairs]]
code = "GC=F"
name = "Gold again"
"#;
        assert!(validate(&parse(toml)).is_err());
    }

    #[test]
    fn unknown_watch_interval_rejected() {
        let toml = r#"
[[watch.requests]]
symbol = "EURUSD=X"
interval = "4h"
"#;
        assert!(validate(&parse(toml)).is_err());
    }

    #[test]
    fn missing_file_is_read_error() {
        let result = load(Path::new("/nonexistent/forex-analyst.toml"));
        assert!(matches!(
            result.unwrap_err().current_context(),
            ConfigError::ReadFile
        ));
    }
}
