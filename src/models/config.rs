//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Source page settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Reference URL canonicalization settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Snapshot output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Log settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.source.url)?;
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        if self.source.array_key.trim().is_empty() {
            return Err(AppError::validation("source.array_key is empty"));
        }
        if self.resolver.user_agent.trim().is_empty() {
            return Err(AppError::validation("resolver.user_agent is empty"));
        }
        if self.resolver.timeout_secs == 0 {
            return Err(AppError::validation("resolver.timeout_secs must be > 0"));
        }
        if self.resolver.attempts == 0 {
            return Err(AppError::validation("resolver.attempts must be > 0"));
        }
        if self.resolver.pool_size == 0 {
            return Err(AppError::validation("resolver.pool_size must be > 0"));
        }
        if self.resolver.progress_interval == 0 {
            return Err(AppError::validation(
                "resolver.progress_interval must be > 0",
            ));
        }
        if let Some(rule) = self
            .resolver
            .host_rewrites
            .iter()
            .find(|r| r.from.is_empty() || r.to.is_empty())
        {
            return Err(AppError::validation(format!(
                "resolver.host_rewrites has an empty side: {:?} -> {:?}",
                rule.from, rule.to
            )));
        }
        if self.output.path.as_os_str().is_empty() {
            return Err(AppError::validation("output.path is empty"));
        }
        self.output.timezone()?;
        Ok(())
    }
}

/// Source page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Page that carries the embedded array
    #[serde(default = "defaults::source_url")]
    pub url: String,

    /// Desktop User-Agent header for the page fetch
    #[serde(default = "defaults::desktop_user_agent")]
    pub user_agent: String,

    /// Page fetch timeout in seconds
    #[serde(default = "defaults::source_timeout")]
    pub timeout_secs: u64,

    /// Key whose array value is extracted
    #[serde(default = "defaults::array_key")]
    pub array_key: String,
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: defaults::source_url(),
            user_agent: defaults::desktop_user_agent(),
            timeout_secs: defaults::source_timeout(),
            array_key: defaults::array_key(),
        }
    }
}

/// Reference URL canonicalization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Mobile User-Agent header for short-link resolution
    #[serde(default = "defaults::mobile_user_agent")]
    pub user_agent: String,

    /// Timeout per resolution attempt in seconds
    #[serde(default = "defaults::resolver_timeout")]
    pub timeout_secs: u64,

    /// Attempts per short link before keeping the original URL
    #[serde(default = "defaults::attempts")]
    pub attempts: u32,

    /// Maximum concurrent resolutions
    #[serde(default = "defaults::pool_size")]
    pub pool_size: usize,

    /// Log progress every N completed records
    #[serde(default = "defaults::progress_interval")]
    pub progress_interval: usize,

    /// Hosts that are already in canonical mobile form
    #[serde(default = "defaults::mobile_hosts")]
    pub mobile_hosts: Vec<String>,

    /// Desktop host to mobile host substitutions
    #[serde(default = "defaults::host_rewrites")]
    pub host_rewrites: Vec<HostRewrite>,

    /// Hosts whose URLs must be resolved over the network
    #[serde(default = "defaults::short_link_hosts")]
    pub short_link_hosts: Vec<String>,
}

impl ResolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::mobile_user_agent(),
            timeout_secs: defaults::resolver_timeout(),
            attempts: defaults::attempts(),
            pool_size: defaults::pool_size(),
            progress_interval: defaults::progress_interval(),
            mobile_hosts: defaults::mobile_hosts(),
            host_rewrites: defaults::host_rewrites(),
            short_link_hosts: defaults::short_link_hosts(),
        }
    }
}

/// A desktop to mobile host substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRewrite {
    pub from: String,
    pub to: String,
}

impl HostRewrite {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Snapshot output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Snapshot file path
    #[serde(default = "defaults::output_path")]
    pub path: PathBuf,

    /// UTC offset used for the snapshot timestamp
    #[serde(default = "defaults::utc_offset_hours")]
    pub utc_offset_hours: i32,
}

impl OutputConfig {
    /// Fixed time zone for the snapshot timestamp.
    pub fn timezone(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).ok_or_else(|| {
            AppError::validation(format!(
                "output.utc_offset_hours out of range: {}",
                self.utc_offset_hours
            ))
        })
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: defaults::output_path(),
            utc_offset_hours: defaults::utc_offset_hours(),
        }
    }
}

/// Log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    use super::HostRewrite;

    // Source defaults
    pub fn source_url() -> String {
        "https://www.dubaicookiemap.com".into()
    }
    pub fn desktop_user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into()
    }
    pub fn source_timeout() -> u64 {
        30
    }
    pub fn array_key() -> String {
        "cafes".into()
    }

    // Resolver defaults
    pub fn mobile_user_agent() -> String {
        "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X) AppleWebKit/605.1.15 \
         (KHTML, like Gecko) Version/16.0 Mobile/15E148 Safari/604.1"
            .into()
    }
    pub fn resolver_timeout() -> u64 {
        8
    }
    pub fn attempts() -> u32 {
        2
    }
    pub fn pool_size() -> usize {
        20
    }
    pub fn progress_interval() -> usize {
        100
    }
    pub fn mobile_hosts() -> Vec<String> {
        vec!["m.place.naver.com".into(), "m.map.naver.com".into()]
    }
    pub fn host_rewrites() -> Vec<HostRewrite> {
        vec![
            HostRewrite::new("place.naver.com", "m.place.naver.com"),
            HostRewrite::new("map.naver.com", "m.map.naver.com"),
        ]
    }
    pub fn short_link_hosts() -> Vec<String> {
        vec!["naver.me".into()]
    }

    // Output defaults
    pub fn output_path() -> PathBuf {
        PathBuf::from("public/stores.json")
    }
    pub fn utc_offset_hours() -> i32 {
        9
    }

    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.resolver.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_pool_size() {
        let mut config = Config::default();
        config.resolver.pool_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_source_url() {
        let mut config = Config::default();
        config.source.url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(AppError::Url(_))));
    }

    #[test]
    fn validate_rejects_out_of_range_offset() {
        let mut config = Config::default();
        config.output.utc_offset_hours = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [source]
            timeout_secs = 5

            [output]
            path = "out/stores.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.source.timeout_secs, 5);
        assert_eq!(config.source.array_key, "cafes");
        assert_eq!(config.output.path, PathBuf::from("out/stores.json"));
        assert_eq!(config.output.utc_offset_hours, 9);
        assert_eq!(config.resolver.attempts, 2);
        assert_eq!(config.resolver.host_rewrites.len(), 2);
    }

    #[test]
    fn load_or_default_falls_back_on_missing_file() {
        let config = Config::load_or_default("/nonexistent/cafemap.toml");
        assert_eq!(config.resolver.pool_size, 20);
    }
}
